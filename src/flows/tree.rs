//! Tree view of an outline

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::core::paths::resolve;
use crate::outline::parse::load;
use crate::outline::{InputFormat, Outline, Subtopic, TopicNode};

/// Tree output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeFormat {
    /// Box-drawing tree
    #[default]
    Text,
    /// The normalized outline as JSON
    Json,
}

impl std::str::FromStr for TreeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "tree" => Ok(TreeFormat::Text),
            "json" => Ok(TreeFormat::Json),
            _ => Err(format!("Unknown tree format: {}", s)),
        }
    }
}

const UNTITLED: &str = "(untitled)";

/// Render an outline as a box-drawing tree. Topic nodes are bold when
/// `color` is set.
pub fn render_tree(outline: &Outline, color: bool) -> String {
    let mut output = String::new();
    for root in outline {
        output.push_str(&label(&root.topic, true, color));
        output.push('\n');
        render_children(root, "", color, &mut output);
    }
    output
}

fn render_children(node: &TopicNode, prefix: &str, color: bool, output: &mut String) {
    let count = node.subtopics.len();
    for (idx, sub) in node.subtopics.iter().enumerate() {
        let is_last = idx + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };

        output.push_str(prefix);
        output.push_str(connector);
        match sub {
            Subtopic::Title(title) => {
                output.push_str(&label(title, false, color));
                output.push('\n');
            }
            Subtopic::Node(child) => {
                output.push_str(&label(&child.topic, true, color));
                output.push('\n');
                let next = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                render_children(child, &next, color, output);
            }
        }
    }
}

fn label(title: &str, is_node: bool, color: bool) -> String {
    let text = if title.trim().is_empty() { UNTITLED } else { title };
    match (color, is_node) {
        (true, true) => text.bold().to_string(),
        (true, false) if text == UNTITLED => text.dimmed().to_string(),
        _ => text.to_string(),
    }
}

/// Run the tree command
pub fn run_tree(
    root: &Path,
    input: &Path,
    input_format: InputFormat,
    tree_format: TreeFormat,
    pretty: bool,
    color: bool,
) -> Result<()> {
    let path = resolve(input, root);
    let outline = load(&path, input_format)
        .with_context(|| format!("Failed to load outline from {}", path.display()))?;

    match tree_format {
        TreeFormat::Text => print!("{}", render_tree(&outline, color)),
        TreeFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(&outline)?
            } else {
                serde_json::to_string(&outline)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
