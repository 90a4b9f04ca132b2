//! Normalization applied before predicted and gold items are compared as sets.

use adra_core::evidence::title_prefix;
use std::collections::HashSet;

/// Lowercase, trim, strip trailing `.!?` and collapse internal whitespace.
pub fn normalize_subtask(task: &str) -> String {
    task.to_lowercase()
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_subtasks<S: AsRef<str>>(subtasks: &[S]) -> HashSet<String> {
    subtasks
        .iter()
        .map(|task| normalize_subtask(task.as_ref()))
        .collect()
}

/// Reduce titles to their citation prefixes, the same rule retrieval uses to match
/// citations.
pub fn normalize_titles<S: AsRef<str>>(titles: &[S], prefix_chars: usize) -> HashSet<String> {
    titles
        .iter()
        .map(|title| title_prefix(title.as_ref(), prefix_chars))
        .collect()
}
