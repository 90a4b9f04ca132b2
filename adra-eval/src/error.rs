//! Error types for evaluation, gold-case loading and result export.

use std::path::PathBuf;

use adra_core::AdraError;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] AdraError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Gold case file has no recognised extension: {path}")]
    UnknownCaseFile { path: PathBuf },
}
