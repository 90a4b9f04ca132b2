//! Report synthesis: evidence in, cited and diagnosed report out.
//!
//! The report has five sections in fixed order (Background, Problem, Methodology,
//! Results, Future). Each synthesis also answers the diagnostic bank and runs the
//! grounding checks.

pub mod diagnostics;
pub mod engine;
pub mod report;

pub use diagnostics::{DiagnosticAspect, diagnostic_bank, evaluate_diagnostics};
pub use engine::{Reasoner, SynthesisResult};
pub use report::{ReportSections, ReportWriter, TemplateReportWriter, format_report};
