//! Validated research plans.
//!
//! A [`Plan`] is an ordered list of high-level sub-tasks. Order encodes execution
//! priority. Every constructor validates the structural contract, so a `Plan` value is
//! always well-formed and never mutated after construction.

use crate::error::PlanValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Default lower bound on the number of sub-tasks.
pub const DEFAULT_MIN_SUBTASKS: usize = 5;
/// Default upper bound on the number of sub-tasks.
pub const DEFAULT_MAX_SUBTASKS: usize = 10;
/// Minimum whitespace-delimited words per sub-task.
pub const MIN_WORDS: usize = 8;
/// Maximum whitespace-delimited words per sub-task.
pub const MAX_WORDS: usize = 20;

/// Citation brackets, dataset/figure/table references.
static LOW_LEVEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\[\d+\]",
        r"(?i)dataset\s+\d+",
        r"(?i)figure\s+\d+",
        r"(?i)table\s+\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// An ordered, validated list of research sub-tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    ordered_subtasks: Vec<String>,
}

impl Plan {
    /// Validate `subtasks` against the default 5–10 bounds.
    pub fn new(subtasks: Vec<String>) -> Result<Self, PlanValidationError> {
        Self::with_bounds(subtasks, DEFAULT_MIN_SUBTASKS, DEFAULT_MAX_SUBTASKS)
    }

    /// Validate `subtasks` against explicit list-length bounds.
    ///
    /// Sub-tasks are stored with surrounding whitespace stripped.
    pub fn with_bounds(
        subtasks: Vec<String>,
        min_subtasks: usize,
        max_subtasks: usize,
    ) -> Result<Self, PlanValidationError> {
        let ordered_subtasks = validate_subtasks(&subtasks, min_subtasks, max_subtasks)?;
        Ok(Self { ordered_subtasks })
    }

    /// Sub-tasks in execution order.
    pub fn subtasks(&self) -> &[String] {
        &self.ordered_subtasks
    }

    pub fn len(&self) -> usize {
        self.ordered_subtasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_subtasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered_subtasks.iter().map(String::as_str)
    }

    pub fn into_subtasks(self) -> Vec<String> {
        self.ordered_subtasks
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, task) in self.ordered_subtasks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. {task}", i + 1)?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Plan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Record { ordered_subtasks: Vec<String> },
        }

        let subtasks = match Raw::deserialize(deserializer)? {
            Raw::List(list) => list,
            Raw::Record { ordered_subtasks } => ordered_subtasks,
        };
        Plan::new(subtasks).map_err(serde::de::Error::custom)
    }
}

/// Check a single sub-task, returning its stripped form.
///
/// `index` is 1-based and only used for error reporting.
pub fn validate_subtask(index: usize, task: &str) -> Result<String, PlanValidationError> {
    let task = task.trim();

    if !task.ends_with(['.', '!', '?']) {
        return Err(PlanValidationError::MissingTerminalPunctuation {
            index,
            text: task.to_string(),
        });
    }

    let words = task.split_whitespace().count();
    if words < MIN_WORDS {
        return Err(PlanValidationError::TooFewWords {
            index,
            words,
            min: MIN_WORDS,
            text: task.to_string(),
        });
    }
    if words > MAX_WORDS {
        return Err(PlanValidationError::TooManyWords {
            index,
            words,
            max: MAX_WORDS,
            text: task.to_string(),
        });
    }

    if let Some(pattern) = LOW_LEVEL_PATTERNS.iter().find(|re| re.is_match(task)) {
        return Err(PlanValidationError::LowLevelDetail {
            index,
            pattern: pattern.as_str().trim_start_matches("(?i)").to_string(),
            text: task.to_string(),
        });
    }

    Ok(task.to_string())
}

/// Validate every sub-task in order, then the list length.
pub fn validate_subtasks<S: AsRef<str>>(
    subtasks: &[S],
    min_subtasks: usize,
    max_subtasks: usize,
) -> Result<Vec<String>, PlanValidationError> {
    let validated = subtasks
        .iter()
        .enumerate()
        .map(|(i, task)| validate_subtask(i + 1, task.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if validated.len() < min_subtasks {
        return Err(PlanValidationError::TooFewSubtasks {
            count: validated.len(),
            min: min_subtasks,
        });
    }
    if validated.len() > max_subtasks {
        return Err(PlanValidationError::TooManySubtasks {
            count: validated.len(),
            max: max_subtasks,
        });
    }

    Ok(validated)
}
