//! Token counting - budget research task lists in LLM tokens
//!
//! Uses tiktoken encodings (cl100k_base by default) with a fast heuristic
//! fallback when no encoding is wanted or available.

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};
use tracing::warn;

/// Supported token encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// cl100k_base encoding (GPT-4, GPT-3.5-turbo; approximation for Claude)
    #[default]
    Cl100k,
    /// o200k_base encoding (GPT-4o)
    O200k,
    /// Fast heuristic estimation (no BPE encoding)
    Heuristic,
}

impl TokenModel {
    fn get_bpe(&self) -> Option<&'static CoreBPE> {
        match self {
            TokenModel::Cl100k => CL100K_BPE.as_ref(),
            TokenModel::O200k => O200K_BPE.as_ref(),
            TokenModel::Heuristic => None,
        }
    }

    /// Names accepted on the command line
    pub fn available_models() -> &'static [&'static str] {
        &["cl100k", "o200k", "gpt4", "gpt4o", "claude", "heuristic"]
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
            TokenModel::Heuristic => "heuristic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "default" | "gpt4" | "gpt-4" | "gpt-3.5-turbo"
            | "claude" | "claude3" => Ok(TokenModel::Cl100k),
            "o200k" | "o200k_base" | "gpt4o" | "gpt-4o" => Ok(TokenModel::O200k),
            "heuristic" | "fast" | "estimate" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

// Loaded once on first use; a failed load is reported here, not per call
static CL100K_BPE: Lazy<Option<CoreBPE>> = Lazy::new(|| load_bpe("cl100k_base", cl100k_base));

static O200K_BPE: Lazy<Option<CoreBPE>> = Lazy::new(|| load_bpe("o200k_base", o200k_base));

fn load_bpe<E, F>(name: &str, loader: F) -> Option<CoreBPE>
where
    E: fmt::Display,
    F: FnOnce() -> Result<CoreBPE, E>,
{
    match loader() {
        Ok(bpe) => Some(bpe),
        Err(e) => {
            warn!(
                "Failed to load {}: {}; falling back to heuristic token estimate",
                name, e
            );
            None
        }
    }
}

/// Count tokens in text using the specified model
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model.get_bpe() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_tokens_heuristic(text),
    }
}

/// Estimate tokens without BPE encoding.
///
/// Roughly 4 ASCII characters per token, 2 per code symbol, 1.5 per CJK
/// character and 2 per other Unicode character.
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let mut ascii_chars = 0usize;
    let mut cjk_chars = 0usize;
    let mut other_unicode = 0usize;
    let mut whitespace = 0usize;
    let mut code_symbols = 0usize;

    for c in text.chars() {
        if c.is_ascii_whitespace() {
            whitespace += 1;
        } else if c.is_ascii() {
            if is_code_symbol(c) {
                code_symbols += 1;
            } else {
                ascii_chars += 1;
            }
        } else if is_cjk_char(c) {
            cjk_chars += 1;
        } else {
            other_unicode += 1;
        }
    }

    let ascii_tokens = (ascii_chars + whitespace).div_ceil(4);
    let symbol_tokens = code_symbols.div_ceil(2);
    let cjk_tokens = (cjk_chars * 2).div_ceil(3);
    let other_tokens = other_unicode.div_ceil(2);

    ascii_tokens + symbol_tokens + cjk_tokens + other_tokens
}

#[inline]
fn is_code_symbol(c: char) -> bool {
    matches!(
        c,
        '(' | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '<'
            | '>'
            | '='
            | '+'
            | '-'
            | '*'
            | '/'
            | '%'
            | '&'
            | '|'
            | '^'
            | '!'
            | '~'
            | '?'
            | ':'
            | ';'
            | ','
            | '.'
            | '@'
            | '#'
            | '$'
            | '\\'
            | '"'
            | '\''
            | '`'
    )
}

/// Check if a character is CJK (Chinese/Japanese/Korean)
#[inline]
fn is_cjk_char(c: char) -> bool {
    let cp = c as u32;
    (0x4E00..=0x9FFF).contains(&cp)      // CJK Unified Ideographs
        || (0x3400..=0x4DBF).contains(&cp)  // CJK Extension A
        || (0x3000..=0x303F).contains(&cp)  // CJK Symbols and Punctuation
        || (0x3040..=0x309F).contains(&cp)  // Hiragana
        || (0x30A0..=0x30FF).contains(&cp)  // Katakana
        || (0xAC00..=0xD7AF).contains(&cp)  // Hangul Syllables
        || (0xFF00..=0xFFEF).contains(&cp) // Fullwidth Forms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_empty() {
        assert_eq!(count_tokens("", TokenModel::default()), 0);
        assert_eq!(count_tokens("", TokenModel::Heuristic), 0);
    }

    #[test]
    fn test_count_tokens_title() {
        let tokens = count_tokens("Introduction to AI", TokenModel::Cl100k);
        assert!(tokens > 0 && tokens < 10);
    }

    #[test]
    fn test_count_tokens_cjk() {
        assert!(count_tokens("深度学习", TokenModel::O200k) > 0);
    }

    #[test]
    fn test_heuristic_ascii() {
        // 13 chars / 4
        assert_eq!(estimate_tokens_heuristic("Deep Learning"), 4);
        assert_eq!(estimate_tokens_heuristic("CNN"), 1);
    }

    #[test]
    fn test_heuristic_cjk() {
        let tokens = estimate_tokens_heuristic("这是一个测试文档");
        assert!((4..=8).contains(&tokens));
    }

    #[test]
    fn test_load_bpe_failure_falls_back() {
        let loaded = load_bpe("missing_base", || Err::<CoreBPE, _>("no such encoding"));
        assert!(loaded.is_none());
    }

    #[test]
    fn test_bpe_is_loaded_once() {
        let first = TokenModel::Cl100k.get_bpe().map(|b| b as *const CoreBPE);
        let second = TokenModel::Cl100k.get_bpe().map(|b| b as *const CoreBPE);
        assert_eq!(first, second);
        assert!(TokenModel::Heuristic.get_bpe().is_none());
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("cl100k".parse::<TokenModel>().unwrap(), TokenModel::Cl100k);
        assert_eq!("gpt4".parse::<TokenModel>().unwrap(), TokenModel::Cl100k);
        assert_eq!("gpt-4o".parse::<TokenModel>().unwrap(), TokenModel::O200k);
        assert_eq!(
            "FAST".parse::<TokenModel>().unwrap(),
            TokenModel::Heuristic
        );
        let err = "unknown".parse::<TokenModel>().unwrap_err();
        assert!(err.contains("Available"));
    }

    #[test]
    fn test_model_display() {
        assert_eq!(TokenModel::Cl100k.to_string(), "cl100k");
        assert_eq!(TokenModel::O200k.to_string(), "o200k");
        assert_eq!(TokenModel::Heuristic.to_string(), "heuristic");
    }

    #[test]
    fn test_is_cjk_char() {
        assert!(is_cjk_char('中'));
        assert!(is_cjk_char('あ'));
        assert!(is_cjk_char('한'));
        assert!(!is_cjk_char('a'));
    }

    #[test]
    fn test_heuristic_vs_tiktoken_approximation() {
        let titles = [
            "Introduction to AI",
            "Supervised Learning",
            "Privacy Concerns: Data Collection",
            "这是中文测试",
        ];

        for title in titles {
            let tiktoken_count = count_tokens(title, TokenModel::Cl100k);
            let heuristic_count = estimate_tokens_heuristic(title);
            let ratio = heuristic_count as f64 / tiktoken_count.max(1) as f64;
            assert!(
                (0.4..=2.5).contains(&ratio),
                "Heuristic too far from tiktoken for '{}': {} vs {}",
                title,
                heuristic_count,
                tiktoken_count
            );
        }
    }
}
