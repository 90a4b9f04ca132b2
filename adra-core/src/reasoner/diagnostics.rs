//! Boolean diagnostic bank used to probe report coverage.
//!
//! Twenty yes/no questions, four per aspect. A question is answered `true` when any
//! keyword of its aspect appears (case-insensitively) anywhere in the report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Report aspect a diagnostic question probes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticAspect {
    Background,
    Problem,
    Methodology,
    Results,
    Future,
}

impl DiagnosticAspect {
    pub const ALL: [DiagnosticAspect; 5] = [
        Self::Background,
        Self::Problem,
        Self::Methodology,
        Self::Results,
        Self::Future,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Problem => "Problem",
            Self::Methodology => "Methodology",
            Self::Results => "Results",
            Self::Future => "Future",
        }
    }

    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Self::Background => &[
                "Does the report provide relevant historical context?",
                "Are fundamental concepts clearly explained?",
                "Is the problem domain adequately introduced?",
                "Are key terminology and definitions provided?",
            ],
            Self::Problem => &[
                "Is the research problem clearly stated?",
                "Are research gaps identified?",
                "Is the motivation for the research explained?",
                "Are limitations of existing approaches discussed?",
            ],
            Self::Methodology => &[
                "Are research methods described?",
                "Is the approach clearly explained?",
                "Are experimental designs or frameworks outlined?",
                "Are data sources and collection methods mentioned?",
            ],
            Self::Results => &[
                "Are key findings presented?",
                "Are results supported by evidence?",
                "Are quantitative or qualitative outcomes reported?",
                "Are comparisons with baselines or prior work included?",
            ],
            Self::Future => &[
                "Are future research directions identified?",
                "Are limitations of current work acknowledged?",
                "Are potential applications discussed?",
                "Are open questions or challenges highlighted?",
            ],
        }
    }

    /// Lowercase keywords whose presence answers this aspect's questions.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Background => &["background", "context", "history"],
            Self::Problem => &["problem", "challenge", "gap"],
            Self::Methodology => &["method", "approach", "technique"],
            Self::Results => &["result", "finding", "outcome"],
            Self::Future => &["future", "direction", "limitation"],
        }
    }

    /// Whether the lowercased report mentions any keyword of this aspect.
    fn covered_by(&self, report_lower: &str) -> bool {
        self.keywords().iter().any(|k| report_lower.contains(k))
    }
}

impl fmt::Display for DiagnosticAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every `(aspect, question)` pair in bank order.
pub fn diagnostic_bank() -> impl Iterator<Item = (DiagnosticAspect, &'static str)> {
    DiagnosticAspect::ALL
        .into_iter()
        .flat_map(|aspect| aspect.questions().iter().map(move |q| (aspect, *q)))
}

/// Answer the full bank against `report`.
pub fn evaluate_diagnostics(report: &str) -> BTreeMap<String, bool> {
    let report_lower = report.to_lowercase();
    diagnostic_bank()
        .map(|(aspect, question)| (question.to_string(), aspect.covered_by(&report_lower)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bank_size() {
        assert_eq!(diagnostic_bank().count(), 20);
        for aspect in DiagnosticAspect::ALL {
            assert_eq!(aspect.questions().len(), 4);
            assert_eq!(aspect.keywords().len(), 3);
        }
        let unique: HashSet<&str> = diagnostic_bank().map(|(_, q)| q).collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn test_evaluate_diagnostics_covers_bank() {
        let answers = evaluate_diagnostics("");
        assert_eq!(answers.len(), 20);
        assert!(answers.values().all(|v| !v));
    }

    #[test]
    fn test_aspect_keyword_answers_all_its_questions() {
        let answers = evaluate_diagnostics("A short HISTORY of the field.");
        for question in DiagnosticAspect::Background.questions() {
            assert!(answers[*question], "{question}");
        }
        for question in DiagnosticAspect::Future.questions() {
            assert!(!answers[*question], "{question}");
        }
    }

    #[test]
    fn test_substring_match() {
        let answers = evaluate_diagnostics("Our methodology and limitations.");
        assert!(answers["Are research methods described?"]);
        assert!(answers["Are potential applications discussed?"]);
        assert!(!answers["Are key findings presented?"]);
    }
}
