//! # ADRA Core
//!
//! Core library for the ADRA research pipeline.
//! Provides the planner, retriever and reasoner stages, the mode-switchable
//! orchestrator that composes them, grounding and safety checks, configuration,
//! and logging setup.

pub mod config;
pub mod error;
pub mod evidence;
pub mod grounding;
pub mod logging;
pub mod orchestrator;
pub mod plan;
pub mod planner;
pub mod reasoner;
pub mod retriever;
pub mod safety;

// Re-export commonly used types at the crate root.
pub use config::{AdraConfig, load_config};
pub use error::{
    AdraError, ConfigError, GenerationError, OrchestratorError, PlanValidationError, Result,
};
pub use evidence::{Citation, CorpusDocument, EvidenceItem, verify_citation_match};
pub use grounding::{FabricationReport, RiskLevel};
pub use orchestrator::{
    PipelineMode, ResearchOrchestrator, ResearchRequest, ResearchResult, ResultMetadata,
    StageInputs,
};
pub use plan::Plan;
pub use planner::{Planner, SubtaskGenerator, TemplateSubtaskGenerator};
pub use reasoner::{DiagnosticAspect, Reasoner, ReportWriter, SynthesisResult, TemplateReportWriter};
pub use retriever::{Domain, RetrievalStats, RetrievalStrategy, Retriever, ToolBudget};
