//! Outline data model
//!
//! Outlines usually arrive as loosely shaped JSON written by a language model.
//! Conversion into these types is total: every field gets a default and every
//! odd element is either stringified or dropped here, so nothing downstream
//! has to probe shapes again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::error::OutlineError;

/// Keys under which a wrapper object may carry the outline array
pub(crate) const WRAPPER_KEYS: [&str; 3] = ["outline", "topics", "sections"];

/// A titled topic with an ordered list of subtopics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct TopicNode {
    /// Title, empty when the source had none
    pub topic: String,
    /// Subtopics in source order
    pub subtopics: Vec<Subtopic>,
}

/// One element of a subtopic list.
///
/// Not deserializable on its own: a lone element may be dropped, so lists
/// are read through [`TopicNode`], which skips what cannot be a subtopic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Subtopic {
    Title(String),
    Node(TopicNode),
}

/// Ordered sequence of root topics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub topics: Vec<TopicNode>,
}

impl TopicNode {
    /// Create a node with no subtopics
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            subtopics: Vec::new(),
        }
    }

    /// Append a plain title subtopic
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.subtopics.push(Subtopic::Title(title.into()));
        self
    }

    /// Append a nested node subtopic
    pub fn with_node(mut self, node: TopicNode) -> Self {
        self.subtopics.push(Subtopic::Node(node));
        self
    }

    /// Append several plain title subtopics
    pub fn with_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtopics
            .extend(titles.into_iter().map(|t| Subtopic::Title(t.into())));
        self
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let topic = map.remove("topic").map(coerce_title).unwrap_or_default();

        let subtopics = match map.remove("subtopics") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(Subtopic::from_value)
                .collect(),
            Some(Value::String(s)) => vec![Subtopic::Title(s)],
            Some(other) => {
                debug!(topic = %topic, "ignoring non-list subtopics: {}", other);
                Vec::new()
            }
            None => Vec::new(),
        };

        Self { topic, subtopics }
    }
}

impl From<Value> for TopicNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => TopicNode::from_map(map),
            Value::String(s) => TopicNode::new(s),
            other => TopicNode::new(coerce_title(other)),
        }
    }
}

impl Subtopic {
    /// Convert one raw subtopic element; `None` means the element is dropped
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Subtopic::Title(s)),
            Value::Object(map) => Some(Subtopic::Node(TopicNode::from_map(map))),
            Value::Number(n) => Some(Subtopic::Title(n.to_string())),
            Value::Bool(b) => Some(Subtopic::Title(b.to_string())),
            Value::Null => None,
            Value::Array(items) => {
                debug!(len = items.len(), "skipping nested array in subtopics");
                None
            }
        }
    }

    /// Title of this element, whichever variant it is
    pub fn title(&self) -> &str {
        match self {
            Subtopic::Title(t) => t,
            Subtopic::Node(n) => &n.topic,
        }
    }
}

impl From<&str> for Subtopic {
    fn from(s: &str) -> Self {
        Subtopic::Title(s.to_string())
    }
}

impl From<TopicNode> for Subtopic {
    fn from(node: TopicNode) -> Self {
        Subtopic::Node(node)
    }
}

impl Outline {
    pub fn new(topics: Vec<TopicNode>) -> Self {
        Self { topics }
    }

    /// Number of root topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TopicNode> {
        self.topics.iter()
    }

    /// True when no subtopic anywhere is a nested node
    pub fn is_flat(&self) -> bool {
        self.topics.iter().all(|t| {
            t.subtopics
                .iter()
                .all(|s| matches!(s, Subtopic::Title(_)))
        })
    }

    /// Build an outline from an arbitrary JSON document.
    ///
    /// Accepts a bare array of topics, a wrapper object holding the array
    /// under `outline`, `topics` or `sections`, or a single topic object.
    pub fn from_value(value: Value) -> Result<Self, OutlineError> {
        match value {
            Value::Array(items) => Ok(Self::new(roots_from_items(items))),
            Value::Object(mut map) => {
                for key in WRAPPER_KEYS {
                    if matches!(map.get(key), Some(Value::Array(_))) {
                        if let Some(Value::Array(items)) = map.remove(key) {
                            return Ok(Self::new(roots_from_items(items)));
                        }
                    }
                }
                if map.contains_key("topic") {
                    return Ok(Self::new(vec![TopicNode::from_map(map)]));
                }
                Err(OutlineError::NotAnOutline(
                    "object has no `outline` array or `topic` field".to_string(),
                ))
            }
            other => Err(OutlineError::NotAnOutline(format!(
                "expected an array or object, found {}",
                value_kind(&other)
            ))),
        }
    }
}

impl TryFrom<Value> for Outline {
    type Error = OutlineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Outline::from_value(value)
    }
}

impl FromIterator<TopicNode> for Outline {
    fn from_iter<T: IntoIterator<Item = TopicNode>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a TopicNode;
    type IntoIter = std::slice::Iter<'a, TopicNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.topics.iter()
    }
}

fn roots_from_items(items: Vec<Value>) -> Vec<TopicNode> {
    items
        .into_iter()
        .filter_map(|item| match item {
            skipped @ (Value::Null | Value::Array(_)) => {
                debug!("skipping {} at outline root", value_kind(&skipped));
                None
            }
            other => Some(TopicNode::from(other)),
        })
        .collect()
}

impl Serialize for Outline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.topics.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Outline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = Value::deserialize(deserializer)?;
        Outline::from_value(value).map_err(D::Error::custom)
    }
}

fn coerce_title(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
