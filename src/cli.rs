//! CLI module - Command-line interface definitions and handlers

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::warn;

use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::tokenizer::TokenModel;
use crate::flows::scan::{ScanOptions, DEFAULT_EXTENSIONS};
use crate::flows::tree::TreeFormat;
use crate::outline::{InputFormat, TaskOptions};

/// topicflat - flatten nested research outlines into ordered topic lists.
#[derive(Parser, Debug)]
#[command(name = "topicflat")]
#[command(
    author,
    version,
    about,
    long_about = r#"topicflat turns a nested research outline into the flat, ordered list of
topics a research loop works through: depth-first, every parent before its
own subtopics.

Outlines may be JSON (an array of {"topic", "subtopics"} records, or an
object wrapping one under "outline"), JSON embedded in a model response, or
a Markdown list/heading outline.

Output formats:
- jsonl: one JSON object per line (best for piping into tools/LLMs)
- json: a single JSON array
- md: human-friendly Markdown
- text: titles only, one per line

Examples:
    topicflat flatten plan.json
    cat response.txt | topicflat flatten - --format text
    topicflat flatten plan.md --dedupe --max-tokens 400
    topicflat tree plan.json
    topicflat scan --ext json,md,txt
"#
)]
pub struct Cli {
    /// Root directory that relative inputs resolve against.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory for all operations (defaults to the current directory).\n\n\
Relative input paths are resolved against it, and source paths in results are\n\
reported relative to it."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md/text).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        env = "TOPICFLAT_FORMAT",
        long_help = "Select the output format for results.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- text"
    )]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug diagnostics on stderr. RUST_LOG overrides this when set."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten an outline into an ordered research task list.
    #[command(
        long_about = "Load an outline and emit one topic item per entry, depth-first with each\n\
parent before its subtopics, followed by a summary item.\n\n\
Examples:\n\
  topicflat flatten plan.json\n\
  topicflat flatten - --input-format json < outline.json\n\
  topicflat flatten plan.md --format text --indent\n\
  topicflat flatten plan.json --dedupe --skip-empty --max-tokens 500\n"
    )]
    Flatten {
        /// Outline file, or - for stdin.
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,

        /// Input format (auto/json/md).
        #[arg(
            long,
            default_value = "auto",
            value_name = "FORMAT",
            long_help = "How to read the input.\n\n\
Supported values:\n\
- auto (default): by file extension, then by content\n\
- json: a JSON document, or JSON embedded in surrounding text\n\
- md: Markdown headings and list items"
        )]
        input_format: String,

        /// Drop repeated titles (case-insensitive).
        #[arg(long)]
        dedupe: bool,

        /// Drop blank titles.
        #[arg(long)]
        skip_empty: bool,

        /// Stop adding tasks once this many tokens are used.
        #[arg(
            long,
            value_name = "N",
            long_help = "Token budget for the task list. Tasks are kept in order until the next\n\
one would exceed the budget; the summary is then marked truncated."
        )]
        max_tokens: Option<usize>,

        /// Token model (cl100k/o200k/heuristic).
        #[arg(
            long,
            default_value = "cl100k",
            value_name = "MODEL",
            env = "TOPICFLAT_TOKEN_MODEL"
        )]
        token_model: String,

        /// Omit the trailing summary item.
        #[arg(long)]
        no_summary: bool,

        /// Indent topics by depth in text output.
        #[arg(long)]
        indent: bool,
    },

    /// Show an outline as a tree.
    #[command(
        long_about = "Print the outline as a box-drawing tree, or with --tree-format json as\n\
the normalized outline (every topic with explicit topic/subtopics fields).\n\n\
Examples:\n\
  topicflat tree plan.json\n\
  topicflat tree response.txt --tree-format json --pretty\n"
    )]
    Tree {
        /// Outline file, or - for stdin.
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,

        /// Input format (auto/json/md).
        #[arg(long, default_value = "auto", value_name = "FORMAT")]
        input_format: String,

        /// Tree output format (text/json).
        #[arg(long = "tree-format", default_value = "text", value_name = "FORMAT")]
        tree_format: String,
    },

    /// Summarize the shape of an outline.
    #[command(
        long_about = "Emit a single summary item: root topics, nodes, plain titles, flattened\n\
entries, maximum depth, blank titles and token total.\n\n\
Example:\n\
  topicflat stats plan.json\n"
    )]
    Stats {
        /// Outline file, or - for stdin.
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,

        /// Input format (auto/json/md).
        #[arg(long, default_value = "auto", value_name = "FORMAT")]
        input_format: String,

        /// Token model (cl100k/o200k/heuristic).
        #[arg(
            long,
            default_value = "cl100k",
            value_name = "MODEL",
            env = "TOPICFLAT_TOKEN_MODEL"
        )]
        token_model: String,
    },

    /// Describe every outline file under ROOT.
    #[command(
        long_about = "Walk ROOT (or --scope), respecting ignore files, and emit one outline item\n\
per matching file. Files that cannot be read as outlines produce error items;\n\
the scan still succeeds.\n\n\
Examples:\n\
  topicflat scan\n\
  topicflat scan --scope plans --ext json,txt\n"
    )]
    Scan {
        /// Limit scanning to a subdirectory under ROOT.
        #[arg(long, value_name = "PATH")]
        scope: Option<PathBuf>,

        /// File extensions to read (comma-separated).
        #[arg(
            long,
            value_name = "EXTS",
            value_delimiter = ',',
            default_values_t = DEFAULT_EXTENSIONS.map(String::from)
        )]
        ext: Vec<String>,

        /// Maximum directory depth from the scan start.
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Include hidden files/directories (dotfiles).
        #[arg(long)]
        hidden: bool,

        /// Disable .gitignore and other ignore rules.
        #[arg(long)]
        no_ignore: bool,

        /// Token model (cl100k/o200k/heuristic).
        #[arg(
            long,
            default_value = "cl100k",
            value_name = "MODEL",
            env = "TOPICFLAT_TOKEN_MODEL"
        )]
        token_model: String,
    },
}

fn parse_input_format(s: &str) -> Result<InputFormat> {
    s.parse().map_err(|e: String| anyhow!(e))
}

fn parse_token_model(s: &str) -> Result<TokenModel> {
    s.parse().map_err(|e: String| anyhow!(e))
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_else(|e| {
        warn!("{}; using jsonl", e);
        OutputFormat::default()
    });
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let color = !cli.no_color && std::io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }

    // Get absolute root path
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    match cli.command {
        Commands::Flatten {
            input,
            input_format,
            dedupe,
            skip_empty,
            max_tokens,
            token_model,
            no_summary,
            indent,
        } => {
            let options = TaskOptions {
                dedupe,
                skip_empty,
                max_tokens,
                token_model: parse_token_model(&token_model)?,
            };
            crate::flows::flatten::run_flatten(
                &root,
                &input,
                parse_input_format(&input_format)?,
                options,
                !no_summary,
                render_config.with_indent(indent),
            )
        }

        Commands::Tree {
            input,
            input_format,
            tree_format,
        } => {
            let tree_fmt: TreeFormat = tree_format.parse().map_err(|e: String| anyhow!(e))?;
            crate::flows::tree::run_tree(
                &root,
                &input,
                parse_input_format(&input_format)?,
                tree_fmt,
                cli.pretty,
                color,
            )
        }

        Commands::Stats {
            input,
            input_format,
            token_model,
        } => {
            let options = TaskOptions {
                token_model: parse_token_model(&token_model)?,
                ..Default::default()
            };
            crate::flows::stats::run_stats(
                &root,
                &input,
                parse_input_format(&input_format)?,
                options,
                render_config,
            )
        }

        Commands::Scan {
            scope,
            ext,
            max_depth,
            hidden,
            no_ignore,
            token_model,
        } => {
            let options = ScanOptions {
                scope,
                extensions: ext
                    .iter()
                    .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect(),
                max_depth,
                hidden,
                ignore: !no_ignore,
            };
            let task_options = TaskOptions {
                token_model: parse_token_model(&token_model)?,
                ..Default::default()
            };
            crate::flows::scan::run_scan(&root, options, task_options, render_config)
        }
    }
}
