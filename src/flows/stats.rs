//! Stats flow - Shape summary of a single outline

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::model::ResultSet;
use crate::core::paths::{resolve, source_label};
use crate::core::render::{RenderConfig, Renderer};
use crate::flows::flatten::summary_item;
use crate::outline::parse::load;
use crate::outline::{build_tasks, InputFormat, TaskOptions};

/// Load an outline and describe it in a single summary item
pub fn outline_stats(
    root: &Path,
    input: &Path,
    input_format: InputFormat,
    options: &TaskOptions,
) -> Result<ResultSet> {
    let path = resolve(input, root);
    let outline = load(&path, input_format)
        .with_context(|| format!("Failed to load outline from {}", path.display()))?;

    let source = source_label(&path, root);
    let tasks = build_tasks(&outline, options);

    let mut result_set = ResultSet::new();
    result_set.push(summary_item(&source, &outline.stats(), Some(&tasks), options));
    Ok(result_set)
}

/// Run the stats command
pub fn run_stats(
    root: &Path,
    input: &Path,
    input_format: InputFormat,
    options: TaskOptions,
    config: RenderConfig,
) -> Result<()> {
    let result_set = outline_stats(root, input, input_format, &options)?;

    let renderer = Renderer::with_config(config);
    renderer
        .render_to(&result_set, std::io::stdout().lock())
        .context("Failed to write output")?;

    Ok(())
}
