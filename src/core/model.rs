//! Unified Result Model
//!
//! Every command maps its output to this model before rendering.

use serde::{Deserialize, Serialize};

use crate::outline::ResearchTask;

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// One flattened topic
    Topic,
    /// One outline document (batch scans)
    Outline,
    /// Aggregate information about a run
    Summary,
    Error,
}

/// Where a topic sits in the flattened sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub index: usize,
    pub depth: usize,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Token count under the configured model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<usize>,

    /// Content hash (XXH3 for titles, SHA1 for files)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Whether the output was cut short
    #[serde(default)]
    pub truncated: bool,
}

/// Error information for a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemError {
    pub code: String,
    pub message: String,
}

impl ItemError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands must produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    pub kind: Kind,

    /// Input the item came from, relative to root, `-` for stdin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Title of the enclosing topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Human-readable text for md/text rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured payload (stats, counts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ItemError>,
}

impl ResultItem {
    fn empty(kind: Kind) -> Self {
        Self {
            kind,
            source: None,
            title: None,
            position: None,
            parent: None,
            excerpt: None,
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a topic result from a research task
    pub fn topic(source: impl Into<String>, task: &ResearchTask) -> Self {
        Self {
            source: Some(source.into()),
            title: Some(task.topic.title.clone()),
            position: Some(Position {
                index: task.topic.index,
                depth: task.topic.depth,
            }),
            parent: task.topic.parent.clone(),
            meta: Meta {
                tokens: Some(task.tokens),
                hash: Some(task.hash.clone()),
                ..Default::default()
            },
            ..Self::empty(Kind::Topic)
        }
    }

    /// Create an outline-document result
    pub fn outline(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::empty(Kind::Outline)
        }
    }

    /// Create a summary result
    pub fn summary(source: Option<String>, data: serde_json::Value) -> Self {
        Self {
            source,
            data: Some(data),
            ..Self::empty(Kind::Summary)
        }
    }

    /// Create a new error result
    pub fn error(error: ItemError) -> Self {
        Self {
            errors: vec![error],
            ..Self::empty(Kind::Error)
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    /// Sort items by source, then position, for stable batch output.
    /// Items without a source go last.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| match (&a.source, &b.source) {
            (Some(sa), Some(sb)) => sa.cmp(sb).then_with(|| {
                let ia = a.position.map(|p| p.index);
                let ib = b.position.map(|p| p.index);
                ia.cmp(&ib)
            }),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
