//! Outline loading errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning raw input into an [`Outline`](super::Outline).
///
/// Flattening itself never fails; only reading and recognising the
/// document can.
#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("invalid outline JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document is not an outline: {0}")]
    NotAnOutline(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OutlineError {
    /// Stable machine-readable code used in error result items
    pub fn code(&self) -> &'static str {
        match self {
            OutlineError::Json(_) => "PARSE_ERROR",
            OutlineError::NotAnOutline(_) => "NOT_AN_OUTLINE",
            OutlineError::Io { .. } => "IO_ERROR",
        }
    }
}
