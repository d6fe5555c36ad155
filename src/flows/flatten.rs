//! Flatten flow - Turn an outline into a research task list
//!
//! Emits one `topic` item per task, in depth-first order, followed by a
//! `summary` item describing the outline and the list built from it.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use tracing::info;

use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::paths::{resolve, source_label};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::util::now_rfc3339;
use crate::outline::parse::load;
use crate::outline::{build_tasks, InputFormat, Outline, OutlineStats, TaskList, TaskOptions};

/// Build the summary item shared by `flatten` and `stats`
pub fn summary_item(
    source: &str,
    stats: &OutlineStats,
    tasks: Option<&TaskList>,
    options: &TaskOptions,
) -> ResultItem {
    let mut data = json!({
        "roots": stats.roots,
        "nodes": stats.nodes,
        "titles": stats.titles,
        "entries": stats.entries,
        "max_depth": stats.max_depth,
        "empty_titles": stats.empty_titles,
        "token_model": options.token_model.to_string(),
        "generated_at": now_rfc3339(),
    });

    let mut excerpt = format!(
        "{} entries from {} root topics (max depth {})",
        stats.entries, stats.roots, stats.max_depth
    );
    let mut meta = Meta::default();

    if let Some(list) = tasks {
        data["tasks"] = json!(list.tasks.len());
        data["total_tokens"] = json!(list.total_tokens);
        data["duplicates_dropped"] = json!(list.duplicates_dropped);
        data["empty_dropped"] = json!(list.empty_dropped);
        if let Some(budget) = options.max_tokens {
            data["max_tokens"] = json!(budget);
        }

        excerpt = format!(
            "{} tasks, ~{} tokens; {}",
            list.tasks.len(),
            list.total_tokens,
            excerpt
        );
        meta.tokens = Some(list.total_tokens);
        meta.truncated = list.truncated;
    }

    ResultItem::summary(Some(source.to_string()), data)
        .with_excerpt(excerpt)
        .with_meta(meta)
}

/// Map an outline to topic items plus an optional summary
pub fn tasks_result_set(
    source: &str,
    outline: &Outline,
    options: &TaskOptions,
    with_summary: bool,
) -> ResultSet {
    let list = build_tasks(outline, options);
    info!(
        source,
        tasks = list.tasks.len(),
        tokens = list.total_tokens,
        "flattened outline"
    );

    let mut result_set: ResultSet = list
        .tasks
        .iter()
        .map(|task| ResultItem::topic(source, task))
        .collect();

    if with_summary {
        result_set.push(summary_item(source, &outline.stats(), Some(&list), options));
    }

    result_set
}

/// Load an outline and flatten it into a result set
pub fn flatten_input(
    root: &Path,
    input: &Path,
    input_format: InputFormat,
    options: &TaskOptions,
    with_summary: bool,
) -> Result<ResultSet> {
    let path = resolve(input, root);
    let outline = load(&path, input_format)
        .with_context(|| format!("Failed to load outline from {}", path.display()))?;

    let source = source_label(&path, root);
    Ok(tasks_result_set(&source, &outline, options, with_summary))
}

/// Run the flatten command
pub fn run_flatten(
    root: &Path,
    input: &Path,
    input_format: InputFormat,
    options: TaskOptions,
    with_summary: bool,
    config: RenderConfig,
) -> Result<()> {
    let result_set = flatten_input(root, input, input_format, &options, with_summary)?;

    let renderer = Renderer::with_config(config);
    renderer
        .render_to(&result_set, std::io::stdout().lock())
        .context("Failed to write output")?;

    Ok(())
}
