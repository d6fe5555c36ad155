//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md, text

use crate::core::model::{Kind, ResultItem, ResultSet};
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    /// Plain titles, one per line
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "text" | "txt" | "raw" => Ok(OutputFormat::Text),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
    /// Indent topics by depth in text output
    pub indent: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self {
            format,
            pretty,
            indent: false,
        }
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Text => self.render_text(result_set),
        }
    }

    /// Render to a writer, newline-terminated
    pub fn render_to<W: Write>(&self, result_set: &ResultSet, mut writer: W) -> std::io::Result<()> {
        let output = self.render(result_set);
        writer.write_all(output.as_bytes())?;
        if !output.is_empty() && !output.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let mut topics = Vec::new();
        let mut outlines = Vec::new();
        let mut summaries = Vec::new();
        let mut errors = Vec::new();

        for item in &result_set.items {
            match item.kind {
                Kind::Topic => topics.push(item),
                Kind::Outline => outlines.push(item),
                Kind::Summary => summaries.push(item),
                Kind::Error => errors.push(item),
            }
        }

        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for error in &item.errors {
                    output.push_str(&format!("- **{}**: {}", error.code, error.message));
                    if let Some(source) = &item.source {
                        output.push_str(&format!(" (`{}`)", source));
                    }
                    output.push('\n');
                }
            }
            output.push('\n');
        }

        if !topics.is_empty() {
            output.push_str("## Topics\n\n");
            for item in topics {
                let depth = item.position.map(|p| p.depth).unwrap_or(0);
                output.push_str(&"  ".repeat(depth));
                output.push_str("- ");
                output.push_str(item.title.as_deref().unwrap_or(""));
                output.push('\n');
            }
            output.push('\n');
        }

        if !outlines.is_empty() {
            output.push_str("## Outlines\n\n");
            for item in outlines {
                self.render_item_md(&mut output, item);
            }
            output.push('\n');
        }

        if !summaries.is_empty() {
            output.push_str("## Summary\n\n");
            for item in summaries {
                self.render_item_md(&mut output, item);
            }
        }

        output
    }

    fn render_item_md(&self, output: &mut String, item: &ResultItem) {
        output.push_str("- ");
        if let Some(source) = &item.source {
            output.push_str(&format!("`{}`", source));
        }
        if let Some(excerpt) = &item.excerpt {
            if item.source.is_some() {
                output.push_str(": ");
            }
            output.push_str(excerpt);
        }
        if item.meta.truncated {
            output.push_str(" ⚠️ truncated");
        }
        output.push('\n');
    }

    /// Topics as bare titles; other items as their excerpt
    fn render_text(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| match item.kind {
                Kind::Topic => {
                    let title = item.title.as_deref().unwrap_or("");
                    let depth = item.position.map(|p| p.depth).unwrap_or(0);
                    if self.config.indent {
                        Some(format!("{}{}", "  ".repeat(depth), title))
                    } else {
                        Some(title.to_string())
                    }
                }
                Kind::Error => item
                    .errors
                    .first()
                    .map(|e| format!("error: {}: {}", e.code, e.message)),
                _ => item.excerpt.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
