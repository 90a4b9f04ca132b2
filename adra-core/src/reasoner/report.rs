//! Report prose: the generation seam and the deterministic template writer.

use crate::error::GenerationError;
use crate::evidence::EvidenceItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const RULE_WIDTH: usize = 80;

/// The five report sections, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSections {
    pub background: String,
    pub problem: String,
    pub methodology: String,
    pub results: String,
    pub future: String,
}

impl ReportSections {
    pub fn in_order(&self) -> [&str; 5] {
        [
            &self.background,
            &self.problem,
            &self.methodology,
            &self.results,
            &self.future,
        ]
    }
}

/// Source of report section prose.
#[async_trait]
pub trait ReportWriter: Send + Sync {
    async fn write_sections(
        &self,
        query: &str,
        subtasks: &[String],
        evidence: &[EvidenceItem],
    ) -> Result<ReportSections, GenerationError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Deterministic writer producing short templated paragraphs.
#[derive(Debug, Clone, Default)]
pub struct TemplateReportWriter;

impl TemplateReportWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn sections(&self, query: &str, subtasks: &[String], evidence: &[EvidenceItem]) -> ReportSections {
        let n = evidence.len();
        let has_evidence = n > 0;

        let mut background = format!("# Background\n\nThis report investigates: {query}\n\n");
        if has_evidence {
            background.push_str(&format!(
                "The research builds on existing work in the field, drawing from {n} relevant sources. \
                 Key concepts and terminology are established through review of foundational literature.\n"
            ));
        }

        let mut problem = format!(
            "# Problem Statement\n\nThe central research question addresses: {query}\n\n\
             Key challenges identified include:\n"
        );
        for (i, subtask) in subtasks.iter().take(3).enumerate() {
            problem.push_str(&format!("{}. {subtask}\n", i + 1));
        }

        let mut methodology = String::from(
            "# Methodology\n\nThe research approach synthesizes evidence from multiple sources, \
             employing systematic review and analysis techniques. ",
        );
        if has_evidence {
            methodology.push_str(&format!(
                "Analysis encompasses {n} documents, examining methodological frameworks and \
                 experimental designs reported in the literature.\n"
            ));
        }

        let mut results = String::from(
            "# Results\n\nKey findings from the evidence synthesis reveal several important insights. ",
        );
        if has_evidence {
            results.push_str(&format!(
                "Across {n} sources analyzed, common patterns and trends emerge in the reported outcomes. \
                 These results are grounded in the cited literature and represent the current state \
                 of knowledge in the field.\n"
            ));
        }

        let future = String::from(
            "# Future Directions\n\nSeveral avenues for future research emerge from this analysis. \
             Open questions and unresolved challenges present opportunities for advancing \
             understanding in the field. Limitations of current approaches suggest areas requiring \
             further investigation.\n",
        );

        ReportSections {
            background,
            problem,
            methodology,
            results,
            future,
        }
    }
}

#[async_trait]
impl ReportWriter for TemplateReportWriter {
    async fn write_sections(
        &self,
        query: &str,
        subtasks: &[String],
        evidence: &[EvidenceItem],
    ) -> Result<ReportSections, GenerationError> {
        Ok(self.sections(query, subtasks, evidence))
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Assemble the title header, the sections in order and the closing citations marker.
pub fn format_report(query: &str, sections: &ReportSections) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut report = format!("# Research Report: {query}\n\n{rule}\n\n");
    for section in sections.in_order() {
        report.push_str(section);
        report.push_str("\n\n");
    }
    report.push_str(&rule);
    report.push_str("\n## Citations\n\n");
    report.push_str("All claims in this report are grounded in the cited evidence sources.\n");
    report
}
