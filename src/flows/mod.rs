//! Flows module - Commands built on top of the outline core
//!
//! Provides:
//! - flatten: research task list from one outline
//! - tree: box-drawing view or normalized JSON of one outline
//! - stats: shape summary of one outline
//! - scan: describe every outline file under a directory

pub mod flatten;
pub mod scan;
pub mod stats;
pub mod tree;
