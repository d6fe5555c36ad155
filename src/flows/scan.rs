//! Scan flow - Flatten every outline file under a directory
//!
//! Uses the ignore crate for traversal so .gitignore rules apply. A file that
//! fails to load becomes an `error` item; the scan itself keeps going.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::model::{ItemError, Meta, ResultItem, ResultSet};
use crate::core::paths::{make_relative, source_label};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::util::{get_file_size, hash_file, HashAlgorithm};
use crate::outline::parse::load;
use crate::outline::{build_tasks, InputFormat, TaskOptions};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Extensions scanned when none are given
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["json", "md", "markdown"];

/// Traversal settings for a scan
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Subdirectory under root to scan
    pub scope: Option<PathBuf>,
    /// File extensions to consider (lowercase, no dot)
    pub extensions: Vec<String>,
    pub max_depth: Option<usize>,
    pub hidden: bool,
    /// Respect .gitignore and friends
    pub ignore: bool,
}

/// Find candidate outline files, sorted by path
pub fn find_outline_files(root: &Path, options: &ScanOptions) -> Vec<PathBuf> {
    let scan_path = options
        .scope
        .as_ref()
        .map(|s| root.join(s))
        .unwrap_or_else(|| root.to_path_buf());

    let mut builder = WalkBuilder::new(&scan_path);
    builder
        .hidden(!options.hidden)
        .git_ignore(options.ignore)
        .git_global(options.ignore)
        .git_exclude(options.ignore)
        .ignore(options.ignore);

    if let Some(depth) = options.max_depth {
        builder.max_depth(Some(depth));
    }

    let mut files: Vec<PathBuf> = builder
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, &options.extensions))
        .collect();

    files.sort();
    debug!(count = files.len(), path = %scan_path.display(), "found outline files");
    files
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Load one file and describe it as an outline item, or an error item
fn describe_file(root: &Path, path: &Path, task_options: &TaskOptions) -> ResultItem {
    let source = make_relative(path, root).unwrap_or_else(|| source_label(path, root));

    let outline = match load(path, InputFormat::Auto) {
        Ok(outline) => outline,
        Err(err) => {
            warn!(source = %source, "skipping outline: {}", err);
            return ResultItem::error(ItemError::new(err.code(), err.to_string()))
                .with_source(source);
        }
    };

    let stats = outline.stats();
    let tasks = build_tasks(&outline, task_options);

    let meta = Meta {
        tokens: Some(tasks.total_tokens),
        hash: hash_file(path, HashAlgorithm::Sha1).ok(),
        size: get_file_size(path).ok(),
        truncated: tasks.truncated,
    };

    ResultItem::outline(source)
        .with_excerpt(format!(
            "{} entries, {} root topics, max depth {}",
            stats.entries, stats.roots, stats.max_depth
        ))
        .with_data(json!({
            "roots": stats.roots,
            "nodes": stats.nodes,
            "titles": stats.titles,
            "entries": stats.entries,
            "max_depth": stats.max_depth,
            "empty_titles": stats.empty_titles,
            "tasks": tasks.tasks.len(),
        }))
        .with_meta(meta)
}

/// Scan a directory for outline files and describe each one
pub fn scan_outlines(
    root: &Path,
    options: &ScanOptions,
    task_options: &TaskOptions,
) -> ResultSet {
    let files = find_outline_files(root, options);

    #[cfg(feature = "parallel")]
    let items: Vec<ResultItem> = files
        .par_iter()
        .map(|path| describe_file(root, path, task_options))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let items: Vec<ResultItem> = files
        .iter()
        .map(|path| describe_file(root, path, task_options))
        .collect();

    let mut result_set: ResultSet = items.into_iter().collect();
    result_set.sort();
    result_set
}

/// Run the scan command
pub fn run_scan(
    root: &Path,
    options: ScanOptions,
    task_options: TaskOptions,
    config: RenderConfig,
) -> Result<()> {
    let result_set = scan_outlines(root, &options, &task_options);

    let renderer = Renderer::with_config(config);
    renderer
        .render_to(&result_set, std::io::stdout().lock())
        .context("Failed to write output")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Kind;
    use crate::core::tokenizer::TokenModel;
    use std::fs;
    use tempfile::tempdir;

    fn scan_options() -> ScanOptions {
        ScanOptions {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            ignore: true,
            ..Default::default()
        }
    }

    fn task_options() -> TaskOptions {
        TaskOptions {
            token_model: TokenModel::Heuristic,
            ..Default::default()
        }
    }

    #[test]
    fn test_scan_empty_dir() {
        let temp = tempdir().unwrap();
        let set = scan_outlines(temp.path(), &scan_options(), &task_options());
        assert!(set.is_empty());
    }

    #[test]
    fn test_scan_describes_and_reports_errors() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("b.json"),
            r#"[{"topic": "A", "subtopics": ["a1", {"topic": "B"}]}]"#,
        )
        .unwrap();
        fs::write(temp.path().join("a.json"), "[{ not json").unwrap();
        fs::create_dir(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("docs/plan.md"), "- X\n  - x1\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "- ignored\n").unwrap();

        let set = scan_outlines(temp.path(), &scan_options(), &task_options());
        let sources: Vec<&str> = set.items.iter().filter_map(|i| i.source.as_deref()).collect();
        assert_eq!(sources, vec!["a.json", "b.json", "docs/plan.md"]);

        assert_eq!(set.items[0].kind, Kind::Error);
        assert_eq!(set.items[0].errors[0].code, "PARSE_ERROR");

        let b = &set.items[1];
        assert_eq!(b.kind, Kind::Outline);
        assert_eq!(b.data.as_ref().unwrap()["entries"], 3);
        assert_eq!(b.meta.hash.as_ref().map(|h| h.len()), Some(40));
        assert!(b.meta.size.is_some());

        assert_eq!(set.items[2].data.as_ref().unwrap()["max_depth"], 1);
    }

    #[test]
    fn test_scan_custom_extension_and_scope() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("responses")).unwrap();
        fs::write(
            temp.path().join("responses/r1.txt"),
            "Here you go:\n```json\n[{\"topic\": \"T\"}]\n```\n",
        )
        .unwrap();
        fs::write(temp.path().join("top.txt"), "- outside scope\n").unwrap();

        let options = ScanOptions {
            scope: Some(PathBuf::from("responses")),
            extensions: vec!["txt".to_string()],
            ..scan_options()
        };
        let set = scan_outlines(temp.path(), &options, &task_options());
        assert_eq!(set.len(), 1);
        assert_eq!(set.items[0].source.as_deref(), Some("responses/r1.txt"));
        assert_eq!(set.items[0].data.as_ref().unwrap()["entries"], 1);
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["json".to_string()];
        assert!(has_extension(Path::new("a.JSON"), &exts));
        assert!(!has_extension(Path::new("a.md"), &exts));
        assert!(!has_extension(Path::new("Makefile"), &exts));
    }
}
