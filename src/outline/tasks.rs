//! Research task list built from a flattened outline

use std::collections::HashSet;
use tracing::{debug, info};

use super::flatten::{flatten_entries, FlatTopic};
use super::node::Outline;
use crate::core::tokenizer::{count_tokens, TokenModel};
use crate::core::util::{hash_bytes, HashAlgorithm};

/// Options controlling how the task list is built
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskOptions {
    /// Drop titles already seen (case-insensitive, whitespace-trimmed)
    pub dedupe: bool,
    /// Drop blank titles
    pub skip_empty: bool,
    /// Stop before the cumulative token count would exceed this budget
    pub max_tokens: Option<usize>,
    pub token_model: TokenModel,
}

/// One research task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchTask {
    pub topic: FlatTopic,
    /// Tokens in the title under the configured model
    pub tokens: usize,
    /// xxh3 of the normalized title
    pub hash: String,
}

/// Ordered task list plus what was dropped building it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    pub tasks: Vec<ResearchTask>,
    pub total_tokens: usize,
    pub duplicates_dropped: usize,
    pub empty_dropped: usize,
    /// True when the token budget cut the list short
    pub truncated: bool,
}

impl TaskList {
    /// Task titles in order
    pub fn titles(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.topic.title.as_str()).collect()
    }
}

/// Normalized form used for duplicate detection and hashing
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Build the research task list for an outline
pub fn build_tasks(outline: &Outline, options: &TaskOptions) -> TaskList {
    let mut list = TaskList::default();
    let mut seen: HashSet<String> = HashSet::new();

    for topic in flatten_entries(outline) {
        if options.skip_empty && topic.title.trim().is_empty() {
            list.empty_dropped += 1;
            continue;
        }

        let normalized = normalize_title(&topic.title);
        if options.dedupe && !seen.insert(normalized.clone()) {
            debug!(title = %topic.title, "dropping duplicate topic");
            list.duplicates_dropped += 1;
            continue;
        }

        let tokens = count_tokens(&topic.title, options.token_model);
        if let Some(budget) = options.max_tokens {
            if list.total_tokens + tokens > budget {
                info!(
                    budget,
                    kept = list.tasks.len(),
                    "token budget reached, truncating task list"
                );
                list.truncated = true;
                break;
            }
        }

        list.total_tokens += tokens;
        list.tasks.push(ResearchTask {
            topic: FlatTopic {
                index: list.tasks.len(),
                ..topic
            },
            tokens,
            hash: hash_bytes(normalized.as_bytes(), HashAlgorithm::Xxh3),
        });
    }

    list
}
