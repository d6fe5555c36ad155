//! topicflat - Flatten nested research outlines into ordered topic lists
//!
//! topicflat provides:
//! - A typed outline tree that accepts loosely shaped JSON
//! - Depth-first, parent-first flattening
//! - Outline parsing from JSON, LLM responses and Markdown
//! - Research task lists with dedupe and token budgets
//! - Unified output format (jsonl/json/md/text)
//!
//! ```
//! use topicflat::{flatten, Outline, TopicNode};
//!
//! let outline: Outline = vec![TopicNode::new("AI Ethics")
//!     .with_title("Bias in AI")
//!     .with_node(TopicNode::new("Privacy Concerns").with_title("User Consent"))]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(
//!     flatten(&outline),
//!     vec!["AI Ethics", "Bias in AI", "Privacy Concerns", "User Consent"]
//! );
//! ```

pub mod cli;
pub mod core;
pub mod flows;
pub mod logging;
pub mod outline;

pub use outline::{
    build_tasks, flatten, flatten_entries, FlatTopic, InputFormat, Outline, OutlineError,
    OutlineStats, Subtopic, TaskList, TaskOptions, TopicNode,
};
