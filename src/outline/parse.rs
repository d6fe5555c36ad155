//! Outline parsing - JSON documents, JSON embedded in model output, Markdown
//!
//! Markdown outlines are built from ATX headings and list items:
//!
//! ```text
//! ## Deep Learning
//! - Neural Networks
//!   - Perceptrons
//! - CNN
//! ```
//!
//! Headings always rank above list items; list nesting follows indentation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use super::error::OutlineError;
use super::node::{Outline, Subtopic, TopicNode, WRAPPER_KEYS};

/// Fenced code block, capturing the body
static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").expect("Invalid FENCE_RE regex")
});

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+?)(?:\s+#+)?\s*$").expect("Invalid HEADING_RE regex"));

static LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)(?:[-*+]|\d+[.)])\s+(.+?)\s*$").expect("Invalid LIST_RE regex")
});

/// List items rank below every heading level
const LIST_BASE_LEVEL: usize = 7;

/// Input format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Detect from content (and file extension when loading)
    #[default]
    Auto,
    Json,
    Markdown,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(InputFormat::Auto),
            "json" => Ok(InputFormat::Json),
            "md" | "markdown" => Ok(InputFormat::Markdown),
            _ => Err(format!("Unknown input format: {}", s)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Auto => "auto",
            InputFormat::Json => "json",
            InputFormat::Markdown => "markdown",
        };
        write!(f, "{}", name)
    }
}

/// Parse a strict JSON outline document
pub fn parse_json(text: &str) -> Result<Outline, OutlineError> {
    let value: Value = serde_json::from_str(text)?;
    Outline::from_value(value)
}

/// Locate a JSON outline inside free text such as a model response.
///
/// Tries fenced code blocks first, then the first `{` or `[` in the text at
/// which a complete JSON value starts. Only outline-shaped values count, so
/// citations like `[1]` or stray config objects are passed over.
pub fn extract_json(text: &str) -> Option<&str> {
    for caps in FENCE_RE.captures_iter(text) {
        if let Some(body) = caps.get(1) {
            let body = body.as_str().trim();
            if looks_like_json(body) && json_value_at(body) == Some(body) {
                return Some(body);
            }
        }
    }

    text.char_indices()
        .filter(|&(_, c)| c == '[' || c == '{')
        .find_map(|(start, _)| json_value_at(&text[start..]))
}

/// The outline-shaped JSON value at the start of `text`, if there is one
fn json_value_at(text: &str) -> Option<&str> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) if is_outline_shaped(&value) => Some(&text[..stream.byte_offset()]),
        _ => None,
    }
}

/// An array holding at least one object, or an object with a `topic` field
/// or a wrapper array
fn is_outline_shaped(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(Value::is_object),
        Value::Object(map) => {
            map.contains_key("topic")
                || WRAPPER_KEYS
                    .iter()
                    .any(|key| matches!(map.get(*key), Some(Value::Array(_))))
        }
        _ => false,
    }
}

/// Parse a Markdown outline. Never fails; text without headings or list
/// items yields an empty outline.
pub fn parse_markdown(text: &str) -> Outline {
    let mut entries: Vec<(usize, String)> = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            entries.push((caps[1].len(), clean_title(&caps[2])));
        } else if let Some(caps) = LIST_RE.captures(line) {
            let level = LIST_BASE_LEVEL + indent_width(&caps[1]);
            entries.push((level, clean_title(&caps[2])));
        }
    }

    let mut cursor = 0;
    let drafts = build_drafts(&entries, &mut cursor, None);
    drafts.into_iter().map(Draft::into_node).collect()
}

/// Parse text in the given format
pub fn parse(text: &str, format: InputFormat) -> Result<Outline, OutlineError> {
    match format {
        InputFormat::Markdown => Ok(parse_markdown(text)),
        InputFormat::Json => match parse_json(text) {
            Ok(outline) => Ok(outline),
            Err(err) => match extract_json(text) {
                Some(span) => parse_json(span),
                None => Err(err),
            },
        },
        InputFormat::Auto => {
            let json_err = if looks_like_json(text.trim_start()) {
                match parse_json(text) {
                    Ok(outline) => return Ok(outline),
                    Err(err) => {
                        debug!("input is not a JSON outline, trying other forms: {}", err);
                        Some(err)
                    }
                }
            } else {
                None
            };

            if let Some(span) = extract_json(text) {
                match parse_json(span) {
                    Ok(outline) => {
                        debug!(len = span.len(), "using JSON embedded in text");
                        return Ok(outline);
                    }
                    Err(err) => debug!("embedded JSON is not an outline: {}", err),
                }
            }

            let outline = parse_markdown(text);
            match json_err {
                // Broken JSON that is not Markdown either
                Some(err) if outline.is_empty() => Err(err),
                _ => Ok(outline),
            }
        }
    }
}

/// Load an outline from a file, or from stdin when `path` is `-`
pub fn load(path: &Path, format: InputFormat) -> Result<Outline, OutlineError> {
    let text = read_source(path)?;

    let format = match format {
        InputFormat::Auto => format_from_extension(path).unwrap_or(InputFormat::Auto),
        explicit => explicit,
    };
    debug!(path = %path.display(), %format, "parsing outline");

    parse(&text, format)
}

/// Read the raw outline text from a file or stdin
pub fn read_source(path: &Path) -> Result<String, OutlineError> {
    let io_err = |source| OutlineError::Io {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(io_err)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(io_err)
    }
}

/// Format implied by a file extension, if any
pub fn format_from_extension(path: &Path) -> Option<InputFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "json" => Some(InputFormat::Json),
        "md" | "markdown" => Some(InputFormat::Markdown),
        _ => None,
    }
}

fn looks_like_json(s: &str) -> bool {
    s.starts_with('[') || s.starts_with('{')
}

fn indent_width(indent: &str) -> usize {
    indent
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    for marker in ["**", "__"] {
        if let Some(inner) = trimmed
            .strip_prefix(marker)
            .and_then(|s| s.strip_suffix(marker))
        {
            if !inner.is_empty() {
                return inner.trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Intermediate tree built from leveled Markdown entries
struct Draft {
    title: String,
    children: Vec<Draft>,
}

impl Draft {
    fn into_node(self) -> TopicNode {
        TopicNode {
            topic: self.title,
            subtopics: self.children.into_iter().map(Draft::into_subtopic).collect(),
        }
    }

    fn into_subtopic(self) -> Subtopic {
        if self.children.is_empty() {
            Subtopic::Title(self.title)
        } else {
            Subtopic::Node(self.into_node())
        }
    }
}

/// Consume entries deeper than `parent_level` as siblings, each taking its
/// own deeper run as children
fn build_drafts(
    entries: &[(usize, String)],
    cursor: &mut usize,
    parent_level: Option<usize>,
) -> Vec<Draft> {
    let mut drafts = Vec::new();

    while let Some((level, title)) = entries.get(*cursor) {
        if parent_level.is_some_and(|p| *level <= p) {
            break;
        }
        *cursor += 1;
        let children = build_drafts(entries, cursor, Some(*level));
        drafts.push(Draft {
            title: title.clone(),
            children,
        });
    }

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::flatten;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_input_format_parse() {
        assert_eq!("auto".parse::<InputFormat>().unwrap(), InputFormat::Auto);
        assert_eq!("JSON".parse::<InputFormat>().unwrap(), InputFormat::Json);
        assert_eq!("md".parse::<InputFormat>().unwrap(), InputFormat::Markdown);
        assert!("yaml".parse::<InputFormat>().is_err());
        assert_eq!(InputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_parse_json_wrapper() {
        let outline = parse_json(r#"{"outline": [{"topic": "A", "subtopics": ["a1"]}]}"#).unwrap();
        assert_eq!(flatten(&outline), vec!["A", "a1"]);
    }

    #[test]
    fn test_parse_json_invalid() {
        let err = parse_json("[{").unwrap_err();
        assert!(matches!(err, OutlineError::Json(_)));
    }

    #[test]
    fn test_extract_json_from_fence() {
        let text = "Here is the outline:\n```json\n[{\"topic\": \"A\"}]\n```\nDone.";
        assert_eq!(extract_json(text), Some("[{\"topic\": \"A\"}]"));
    }

    #[test]
    fn test_extract_json_skips_non_json_fence() {
        let text = "```\nnot json\n```\nthen {\"outline\": []} trailing";
        assert_eq!(extract_json(text), Some("{\"outline\": []}"));
    }

    #[test]
    fn test_extract_json_bare_span() {
        let text = "Sure! [{\"topic\": \"A\", \"subtopics\": [\"x\"]}] Hope this helps.";
        let span = extract_json(text).unwrap();
        assert!(span.starts_with('['));
        assert!(span.ends_with(']'));
    }

    #[test]
    fn test_extract_json_after_citation_brackets() {
        let text = "Outline (see [1]): [{\"topic\": \"A\"}, {\"topic\": \"B\"}] and {1}.";
        assert_eq!(
            extract_json(text),
            Some("[{\"topic\": \"A\"}, {\"topic\": \"B\"}]")
        );

        let outline = parse(text, InputFormat::Auto).unwrap();
        assert_eq!(flatten(&outline), vec!["A", "B"]);
    }

    #[test]
    fn test_extract_json_skips_non_outline_values() {
        let text = "Scores [1, 2] and {\"x\": 1} then {\"topic\": \"T\"}";
        assert_eq!(extract_json(text), Some("{\"topic\": \"T\"}"));
    }

    #[test]
    fn test_extract_json_none() {
        assert_eq!(extract_json("no structured data here"), None);
        assert_eq!(extract_json("broken { json"), None);
    }

    #[test]
    fn test_parse_markdown_lists() {
        let md = "\
- Deep Learning
  - Neural Networks
    - Perceptrons
    - Backpropagation
  - CNN
- Ethics
";
        let outline = parse_markdown(md);
        assert_eq!(outline.len(), 2);
        assert_eq!(
            outline.topics[0],
            TopicNode::new("Deep Learning")
                .with_node(
                    TopicNode::new("Neural Networks").with_titles(["Perceptrons", "Backpropagation"])
                )
                .with_title("CNN")
        );
        assert_eq!(
            flatten(&outline),
            vec![
                "Deep Learning",
                "Neural Networks",
                "Perceptrons",
                "Backpropagation",
                "CNN",
                "Ethics"
            ]
        );
    }

    #[test]
    fn test_parse_markdown_headings_and_lists() {
        let md = "\
# Research Plan

Some intro text that is ignored.

## **Introduction to AI**
1. History of AI
2. Basic Concepts

## Machine Learning
* Supervised Learning
";
        let outline = parse_markdown(md);
        assert_eq!(outline.len(), 1);
        assert_eq!(
            flatten(&outline),
            vec![
                "Research Plan",
                "Introduction to AI",
                "History of AI",
                "Basic Concepts",
                "Machine Learning",
                "Supervised Learning"
            ]
        );
    }

    #[test]
    fn test_parse_markdown_ignores_code_fences() {
        let md = "- A\n```\n- not an item\n```\n- B\n";
        assert_eq!(flatten(&parse_markdown(md)), vec!["A", "B"]);
    }

    #[test]
    fn test_parse_markdown_tabs() {
        let md = "- A\n\t- a1\n- B\n";
        let outline = parse_markdown(md);
        assert_eq!(outline.topics[0], TopicNode::new("A").with_title("a1"));
    }

    #[test]
    fn test_parse_markdown_empty() {
        assert!(parse_markdown("").is_empty());
        assert!(parse_markdown("just prose\nand more prose").is_empty());
    }

    #[test]
    fn test_parse_auto() {
        let json = parse(r#"[{"topic": "A"}]"#, InputFormat::Auto).unwrap();
        assert_eq!(flatten(&json), vec!["A"]);

        let embedded = parse(
            "The plan:\n```json\n{\"outline\": [{\"topic\": \"B\"}]}\n```",
            InputFormat::Auto,
        )
        .unwrap();
        assert_eq!(flatten(&embedded), vec!["B"]);

        let md = parse("- C\n  - c1\n", InputFormat::Auto).unwrap();
        assert_eq!(flatten(&md), vec!["C", "c1"]);
    }

    #[test]
    fn test_parse_auto_falls_back_when_embedded_json_is_not_outline() {
        let text = "Config {\"x\": 1}\n- Real Topic\n";
        let outline = parse(text, InputFormat::Auto).unwrap();
        assert_eq!(flatten(&outline), vec!["Real Topic"]);
    }

    #[test]
    fn test_parse_auto_markdown_starting_with_link() {
        let text = "[Overview](#overview)\n- Solar\n  - PV\n";
        let outline = parse(text, InputFormat::Auto).unwrap();
        assert_eq!(flatten(&outline), vec!["Solar", "PV"]);
    }

    #[test]
    fn test_parse_auto_broken_json_still_errors() {
        let err = parse("[{\"topic\": \"Broken\", \"subtopics\": [", InputFormat::Auto)
            .unwrap_err();
        assert!(matches!(err, OutlineError::Json(_)));
    }

    #[test]
    fn test_parse_json_mode_errors_without_json() {
        assert!(parse("- only markdown", InputFormat::Json).is_err());
        assert!(parse("42", InputFormat::Json).is_err());
    }

    #[test]
    fn test_load_uses_extension() {
        let temp = tempdir().unwrap();
        let md_path = temp.path().join("plan.md");
        fs::write(&md_path, "- [not json]\n").unwrap();
        let outline = load(&md_path, InputFormat::Auto).unwrap();
        assert_eq!(flatten(&outline), vec!["[not json]"]);

        let json_path = temp.path().join("plan.json");
        fs::write(&json_path, r#"[{"topic": "J"}]"#).unwrap();
        assert_eq!(flatten(&load(&json_path, InputFormat::Auto).unwrap()), vec!["J"]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().unwrap();
        let err = load(&temp.path().join("absent.json"), InputFormat::Auto).unwrap_err();
        assert!(matches!(err, OutlineError::Io { .. }));
    }
}
