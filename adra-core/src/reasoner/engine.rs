//! The reasoner: synthesizes a cited, diagnosed report from evidence.

use super::diagnostics;
use super::report::{self, ReportWriter, TemplateReportWriter};
use crate::config::{GroundingConfig, ReasoningConfig};
use crate::error::AdraError;
use crate::evidence::{self, Citation, EvidenceItem};
use crate::grounding::{self, FabricationReport, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Output of one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub report: String,
    pub citations: Vec<Citation>,
    /// Answer to every diagnostic question, keyed by question text.
    pub diagnostic_responses: BTreeMap<String, bool>,
    pub ungrounded_claims: Vec<String>,
    /// Report length in characters, divided by four.
    pub token_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabrication: Option<FabricationReport>,
}

/// Synthesizes reports via a [`ReportWriter`] and checks them against the evidence.
#[derive(Clone)]
pub struct Reasoner {
    config: ReasoningConfig,
    grounding: GroundingConfig,
    writer: Arc<dyn ReportWriter>,
}

impl std::fmt::Debug for Reasoner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reasoner")
            .field("config", &self.config)
            .field("grounding", &self.grounding)
            .field("writer", &self.writer.name())
            .finish()
    }
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new(ReasoningConfig::default(), GroundingConfig::default())
    }
}

impl Reasoner {
    pub fn new(config: ReasoningConfig, grounding: GroundingConfig) -> Self {
        Self {
            config,
            grounding,
            writer: Arc::new(TemplateReportWriter::new()),
        }
    }

    /// Replace the section writer.
    pub fn with_writer(mut self, writer: Arc<dyn ReportWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    /// Write, cite, diagnose and grounding-check a report.
    ///
    /// Deterministic for a deterministic writer: identical inputs give an identical report.
    pub async fn synthesize_report(
        &self,
        query: &str,
        subtasks: &[String],
        evidence: &[EvidenceItem],
    ) -> Result<SynthesisResult, AdraError> {
        let sections = self.writer.write_sections(query, subtasks, evidence).await?;
        let report = report::format_report(query, &sections);

        let citations: Vec<Citation> = evidence.iter().map(Citation::from_evidence).collect();
        let ungrounded_claims = grounding::identify_ungrounded_claims(
            &report,
            evidence,
            self.grounding.ungrounded_report_chars,
        );
        let diagnostic_responses = diagnostics::evaluate_diagnostics(&report);
        let fabrication = grounding::check_fabrication_risk(&report, evidence, &self.grounding);
        let token_count = evidence::estimate_tokens(&report);

        if fabrication.risk_level == RiskLevel::High && !evidence.is_empty() {
            tracing::warn!(
                grounded = fabrication.grounded_sentences,
                total = fabrication.total_sentences,
                "Report has high fabrication risk"
            );
        }
        tracing::info!(
            writer = self.writer.name(),
            citations = citations.len(),
            token_count,
            target_tokens = self.config.target_token_output,
            "Report synthesized"
        );

        Ok(SynthesisResult {
            report,
            citations,
            diagnostic_responses,
            ungrounded_claims,
            token_count,
            fabrication: Some(fabrication),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::reasoner::report::ReportSections;
    use async_trait::async_trait;

    fn subtasks() -> Vec<String> {
        vec![
            "Review fundamental concepts of language modeling and neural networks.".into(),
            "Identify key architectural components of transformer based models.".into(),
            "Examine training methodologies for large scale language models.".into(),
        ]
    }

    fn evidence() -> Vec<EvidenceItem> {
        vec![EvidenceItem::new(
            "gold1",
            "Language Models Are Few-Shot Learners",
            "Large language models demonstrate strong few-shot learning capabilities.",
            1.0,
        )]
    }

    #[tokio::test]
    async fn test_synthesize_report_with_evidence() {
        let reasoner = Reasoner::default();
        let result = reasoner
            .synthesize_report("How do large language models work?", &subtasks(), &evidence())
            .await
            .unwrap();

        assert!(result.report.starts_with("# Research Report: How do large language models work?"));
        assert_eq!(result.citations.len(), 1);
        assert_eq!(result.citations[0].doc_id, "gold1");
        assert!(result.ungrounded_claims.is_empty());
        assert_eq!(result.token_count, result.report.chars().count() / 4);
        assert_eq!(result.diagnostic_responses.len(), 20);
        assert!(result.fabrication.is_some());
    }

    #[tokio::test]
    async fn test_synthesize_report_without_evidence_flags_claims() {
        let reasoner = Reasoner::default();
        let result = reasoner
            .synthesize_report("How do large language models work?", &subtasks(), &[])
            .await
            .unwrap();
        assert!(result.report.chars().count() > 1000);
        assert_eq!(
            result.ungrounded_claims,
            vec![grounding::UNSUPPORTED_REPORT_CLAIM.to_string()]
        );
        assert!(result.citations.is_empty());
        let fabrication = result.fabrication.unwrap();
        assert_eq!(fabrication.grounded_sentences, 0);
        assert_eq!(fabrication.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_template_report_answers_every_aspect() {
        let result = Reasoner::default()
            .synthesize_report("Q", &subtasks(), &evidence())
            .await
            .unwrap();
        assert!(result.diagnostic_responses.values().all(|v| *v));
    }

    #[tokio::test]
    async fn test_synthesis_is_deterministic() {
        let reasoner = Reasoner::default();
        let a = reasoner.synthesize_report("Q", &subtasks(), &evidence()).await.unwrap();
        let b = reasoner.synthesize_report("Q", &subtasks(), &evidence()).await.unwrap();
        assert_eq!(a, b);
    }

    struct BrokenWriter;

    #[async_trait]
    impl ReportWriter for BrokenWriter {
        async fn write_sections(
            &self,
            _: &str,
            _: &[String],
            _: &[EvidenceItem],
        ) -> Result<ReportSections, GenerationError> {
            Err(GenerationError::Malformed("no sections".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_writer_failure_propagates() {
        let reasoner = Reasoner::default().with_writer(Arc::new(BrokenWriter));
        let err = reasoner.synthesize_report("Q", &[], &[]).await.unwrap_err();
        assert!(matches!(err, AdraError::Generation(GenerationError::Malformed(_))));
    }
}
