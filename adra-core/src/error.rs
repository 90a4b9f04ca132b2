//! Error types for the ADRA pipeline core.
//!
//! Uses `thiserror` for public API error types with structured variants covering
//! plan validation, orchestration modes and configuration. Exhausting a retrieval
//! budget is not an error: over-budget tool calls return empty results.

use std::path::PathBuf;

/// Top-level error type for the ADRA core library.
#[derive(Debug, thiserror::Error)]
pub enum AdraError {
    #[error("Plan validation error: {0}")]
    Validation(#[from] PlanValidationError),

    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Structural violations of the plan contract.
///
/// Subtask indices are 1-based, matching the numbered rendering of a plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanValidationError {
    #[error("Plan has {count} sub-tasks, should have at least {min} items")]
    TooFewSubtasks { count: usize, min: usize },

    #[error("Plan has {count} sub-tasks, should have at most {max} items")]
    TooManySubtasks { count: usize, max: usize },

    #[error("Sub-task {index} must be a complete sentence ending with punctuation: '{text}'")]
    MissingTerminalPunctuation { index: usize, text: String },

    #[error("Sub-task {index} has {words} words, minimum is {min}: '{text}'")]
    TooFewWords {
        index: usize,
        words: usize,
        min: usize,
        text: String,
    },

    #[error("Sub-task {index} has {words} words, maximum is {max}: '{text}'")]
    TooManyWords {
        index: usize,
        words: usize,
        max: usize,
        text: String,
    },

    #[error(
        "Sub-task {index} contains low-level details (citations/dataset numbers) matching '{pattern}': '{text}'"
    )]
    LowLevelDetail {
        index: usize,
        pattern: String,
        text: String,
    },
}

impl PlanValidationError {
    /// 1-based index of the offending sub-task, if the violation is per sub-task.
    pub fn subtask_index(&self) -> Option<usize> {
        match self {
            Self::TooFewSubtasks { .. } | Self::TooManySubtasks { .. } => None,
            Self::MissingTerminalPunctuation { index, .. }
            | Self::TooFewWords { index, .. }
            | Self::TooManyWords { index, .. }
            | Self::LowLevelDetail { index, .. } => Some(*index),
        }
    }
}

/// Errors from pipeline mode selection and dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Invalid mode: {mode}. Must be one of {valid:?}")]
    InvalidMode { mode: String, valid: Vec<String> },

    #[error("{mode} mode requires {missing}")]
    MissingGoldInput { mode: String, missing: String },
}

/// Failures of a text-generation backend behind a planner or reasoner seam.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation backend unavailable: {0}")]
    Unavailable(String),

    #[error("Generation backend returned malformed output: {0}")]
    Malformed(String),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {0}")]
    Parse(#[from] Box<figment::Error>),
}

/// A type alias for results using the top-level `AdraError`.
pub type Result<T> = std::result::Result<T, AdraError>;
