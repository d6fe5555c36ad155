//! Outline module - Nested research outlines and their flattening
//!
//! Provides:
//! - node: typed outline tree built from loosely shaped JSON
//! - flatten: depth-first flattening into plain titles
//! - parse: JSON / embedded JSON / Markdown loaders
//! - tasks: research task list built from a flattened outline

pub mod error;
pub mod flatten;
pub mod node;
pub mod parse;
pub mod tasks;

pub use error::OutlineError;
pub use flatten::{flatten, flatten_entries, FlatTopic, OutlineStats};
pub use node::{Outline, Subtopic, TopicNode};
pub use parse::InputFormat;
pub use tasks::{build_tasks, ResearchTask, TaskList, TaskOptions};
