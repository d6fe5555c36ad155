//! Outline flattening
//!
//! Turns a nested outline into the ordered list of titles a research loop
//! works through: depth-first, each parent before its own subtopics, and
//! every nested node fully expanded before its next sibling.

use serde::{Deserialize, Serialize};

use super::node::{Outline, Subtopic, TopicNode};

/// One flattened entry with its position in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatTopic {
    /// Zero-based position in the flattened sequence
    pub index: usize,
    pub title: String,
    /// 0 for outline roots
    pub depth: usize,
    /// Title of the enclosing node, `None` for roots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Shape summary of an outline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineStats {
    /// Root topics
    pub roots: usize,
    /// Topic nodes at any depth, roots included
    pub nodes: usize,
    /// Plain string subtopics
    pub titles: usize,
    /// Length of the flattened sequence
    pub entries: usize,
    pub max_depth: usize,
    /// Entries whose title is blank
    pub empty_titles: usize,
}

/// Flatten an outline into its titles, depth-first, parents first.
///
/// Total for any [`Outline`]: the result holds exactly one string per node
/// and per plain subtopic, and the input is left untouched.
pub fn flatten(outline: &Outline) -> Vec<String> {
    let mut out = Vec::new();
    for topic in outline {
        topic.flatten_into(&mut out);
    }
    out
}

/// Same traversal as [`flatten`], keeping depth and parent for each entry
pub fn flatten_entries(outline: &Outline) -> Vec<FlatTopic> {
    let mut out = Vec::new();
    for topic in outline {
        walk(topic, 0, None, &mut |title, depth, parent, _| {
            out.push(FlatTopic {
                index: out.len(),
                title: title.to_string(),
                depth,
                parent: parent.map(str::to_string),
            });
        });
    }
    out
}

impl TopicNode {
    /// Append this node's title and then all of its descendants to `out`
    pub fn flatten_into(&self, out: &mut Vec<String>) {
        out.push(self.topic.clone());
        for sub in &self.subtopics {
            match sub {
                Subtopic::Title(title) => out.push(title.clone()),
                Subtopic::Node(node) => node.flatten_into(out),
            }
        }
    }
}

impl Outline {
    /// Count nodes, titles and depth in one pass
    pub fn stats(&self) -> OutlineStats {
        let mut stats = OutlineStats {
            roots: self.len(),
            ..Default::default()
        };

        for topic in self {
            walk(topic, 0, None, &mut |title, depth, _, is_node| {
                stats.entries += 1;
                if is_node {
                    stats.nodes += 1;
                } else {
                    stats.titles += 1;
                }
                if title.trim().is_empty() {
                    stats.empty_titles += 1;
                }
                stats.max_depth = stats.max_depth.max(depth);
            });
        }

        stats
    }
}

/// Depth-first visit: `visit(title, depth, parent_title, is_node)`
fn walk<'a, F>(node: &'a TopicNode, depth: usize, parent: Option<&'a str>, visit: &mut F)
where
    F: FnMut(&'a str, usize, Option<&'a str>, bool),
{
    visit(&node.topic, depth, parent, true);
    for sub in &node.subtopics {
        match sub {
            Subtopic::Title(title) => visit(title, depth + 1, Some(&node.topic), false),
            Subtopic::Node(child) => walk(child, depth + 1, Some(&node.topic), visit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outline(value: serde_json::Value) -> Outline {
        Outline::from_value(value).unwrap()
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&Outline::default()).is_empty());
        assert!(flatten_entries(&Outline::default()).is_empty());
    }

    #[test]
    fn test_flatten_single_topic() {
        let o = outline(json!([{"topic": "Single Topic", "subtopics": []}]));
        assert_eq!(flatten(&o), vec!["Single Topic"]);
    }

    #[test]
    fn test_flatten_string_subtopics() {
        let o = outline(json!([
            {
                "topic": "Introduction to AI",
                "subtopics": ["History of AI", "Basic Concepts", "Current Applications"]
            },
            {
                "topic": "Machine Learning",
                "subtopics": ["Supervised Learning", "Unsupervised Learning"]
            }
        ]));
        let flat = flatten(&o);
        assert_eq!(flat.len(), 7);
        assert_eq!(
            flat,
            vec![
                "Introduction to AI",
                "History of AI",
                "Basic Concepts",
                "Current Applications",
                "Machine Learning",
                "Supervised Learning",
                "Unsupervised Learning",
            ]
        );
    }

    #[test]
    fn test_flatten_nested_nodes() {
        let o = outline(json!([
            {
                "topic": "Deep Learning",
                "subtopics": [
                    {"topic": "Neural Networks", "subtopics": ["Perceptrons", "Backpropagation"]},
                    {"topic": "CNN", "subtopics": ["Convolution", "Pooling"]}
                ]
            }
        ]));
        assert_eq!(
            flatten(&o),
            vec![
                "Deep Learning",
                "Neural Networks",
                "Perceptrons",
                "Backpropagation",
                "CNN",
                "Convolution",
                "Pooling",
            ]
        );
    }

    #[test]
    fn test_flatten_mixed_keeps_position() {
        let o = outline(json!([
            {
                "topic": "AI Ethics",
                "subtopics": [
                    "Bias in AI",
                    {"topic": "Privacy Concerns", "subtopics": ["Data Collection", "User Consent"]},
                    "Transparency"
                ]
            }
        ]));
        assert_eq!(
            flatten(&o),
            vec![
                "AI Ethics",
                "Bias in AI",
                "Privacy Concerns",
                "Data Collection",
                "User Consent",
                "Transparency",
            ]
        );
    }

    #[test]
    fn test_nested_node_expanded_before_next_sibling() {
        // A node subtopic followed by a plain string used to leak the raw node.
        let o = outline(json!([
            {
                "topic": "Main Topic",
                "subtopics": [
                    {"topic": "Subtopic 1", "subtopics": ["Sub-sub 1", "Sub-sub 2"]},
                    "String Subtopic"
                ]
            }
        ]));
        assert_eq!(
            flatten(&o),
            vec![
                "Main Topic",
                "Subtopic 1",
                "Sub-sub 1",
                "Sub-sub 2",
                "String Subtopic"
            ]
        );
    }

    #[test]
    fn test_flat_outline_matches_one_level_concat() {
        let o = Outline::new(vec![
            TopicNode::new("A").with_titles(["a1", "a2"]),
            TopicNode::new("B"),
            TopicNode::new("C").with_titles(["c1"]),
        ]);
        assert!(o.is_flat());

        let naive: Vec<String> = o
            .iter()
            .flat_map(|t| {
                std::iter::once(t.topic.clone())
                    .chain(t.subtopics.iter().map(|s| s.title().to_string()))
            })
            .collect();
        assert_eq!(flatten(&o), naive);
    }

    #[test]
    fn test_missing_fields_yield_empty_titles() {
        let o = outline(json!([{"subtopics": ["x"]}, {"topic": "y"}]));
        assert_eq!(flatten(&o), vec!["", "x", "y"]);
    }

    #[test]
    fn test_deep_nesting() {
        let mut node = TopicNode::new("leaf");
        for i in (0..200).rev() {
            node = TopicNode::new(format!("level {}", i)).with_node(node);
        }
        let o = Outline::new(vec![node]);
        let flat = flatten(&o);
        assert_eq!(flat.len(), 201);
        assert_eq!(flat[0], "level 0");
        assert_eq!(flat[200], "leaf");
        assert_eq!(o.stats().max_depth, 200);
    }

    #[test]
    fn test_flatten_does_not_mutate() {
        let o = outline(json!([{"topic": "A", "subtopics": [{"topic": "B"}]}]));
        let before = o.clone();
        let _ = flatten(&o);
        let _ = flatten_entries(&o);
        assert_eq!(o, before);
    }

    #[test]
    fn test_entries_track_depth_and_parent() {
        let o = Outline::new(vec![TopicNode::new("Deep Learning")
            .with_node(TopicNode::new("CNN").with_title("Pooling"))
            .with_title("RNN")]);
        let entries = flatten_entries(&o);

        let shape: Vec<(usize, &str, usize, Option<&str>)> = entries
            .iter()
            .map(|e| (e.index, e.title.as_str(), e.depth, e.parent.as_deref()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (0, "Deep Learning", 0, None),
                (1, "CNN", 1, Some("Deep Learning")),
                (2, "Pooling", 2, Some("CNN")),
                (3, "RNN", 1, Some("Deep Learning")),
            ]
        );

        let titles: Vec<String> = entries.into_iter().map(|e| e.title).collect();
        assert_eq!(titles, flatten(&o));
    }

    #[test]
    fn test_stats() {
        let o = Outline::new(vec![
            TopicNode::new("A")
                .with_node(TopicNode::new("B").with_titles(["b1", " "]))
                .with_title("a1"),
            TopicNode::new("C"),
        ]);
        let stats = o.stats();
        assert_eq!(stats.roots, 2);
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.titles, 3);
        assert_eq!(stats.entries, flatten(&o).len());
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.empty_titles, 1);
    }
}
