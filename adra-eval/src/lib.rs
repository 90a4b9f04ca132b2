//! # ADRA Eval
//!
//! Scores ADRA pipeline stages against expert-authored gold data: Jaccard overlap for
//! plans and citations, F1 for diagnostic answers. Includes the evaluation log with
//! Markdown and JSON export, gold case loading, and a harness that scores each stage in
//! isolation.

pub mod error;
pub mod evaluator;
pub mod gold;
pub mod harness;
pub mod metrics;
pub mod normalize;

pub use error::EvalError;
pub use evaluator::{EvaluationResult, Evaluator, ExportFormat, ModuleKind, Summary};
pub use gold::GoldCase;
pub use harness::{IsolationHarness, StageScores};
pub use metrics::{JaccardScore, ReasoningScore, calculate_jaccard, calculate_reasoning_f1};
