//! Groundedness checks: does report text trace back to evidence?
//!
//! Two levels:
//! - a coarse flag for substantial reports written against no evidence at all;
//! - a per-sentence term-overlap check that yields a fabrication risk level.

use crate::config::GroundingConfig;
use crate::evidence::EvidenceItem;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());
static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Message recorded when a report has substance but no evidence behind it.
pub const UNSUPPORTED_REPORT_CLAIM: &str =
    "Report contains substantial content without evidence support";

/// Aggregate fabrication risk of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Per-sentence groundedness summary of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricationReport {
    pub risk_level: RiskLevel,
    pub grounded_sentences: usize,
    pub total_sentences: usize,
    pub grounded_ratio: f64,
    pub meets_threshold: bool,
    /// Sentences that matched no evidence document.
    pub ungrounded_sentences: Vec<String>,
}

fn word_terms(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Term sets of each evidence document (`title content`), empty documents skipped.
struct EvidenceTerms(Vec<HashSet<String>>);

impl EvidenceTerms {
    fn new(evidence: &[EvidenceItem]) -> Self {
        Self(
            evidence
                .iter()
                .map(|doc| word_terms(&format!("{} {}", doc.title, doc.content)))
                .filter(|terms| !terms.is_empty())
                .collect(),
        )
    }

    fn supports(&self, claim: &str, similarity_threshold: f64) -> bool {
        let claim_terms = word_terms(claim);
        if claim_terms.is_empty() {
            return false;
        }
        self.0.iter().any(|doc_terms| {
            let overlap = claim_terms.intersection(doc_terms).count();
            overlap as f64 / claim_terms.len() as f64 >= similarity_threshold
        })
    }
}

/// Whether `claim` shares at least `similarity_threshold` of its terms with any one
/// evidence document.
pub fn validate_groundedness(claim: &str, evidence: &[EvidenceItem], similarity_threshold: f64) -> bool {
    if evidence.is_empty() {
        return false;
    }
    EvidenceTerms::new(evidence).supports(claim, similarity_threshold)
}

/// Split on runs of `.`, `!`, `?`, dropping blank fragments.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Grade a report by the share of its sentences grounded in `evidence`.
///
/// At or above `min_evidence_ratio` is `low` risk, at or above 0.7 of it `medium`,
/// otherwise `high`. A report without sentences is `high`.
pub fn check_fabrication_risk(
    report: &str,
    evidence: &[EvidenceItem],
    config: &GroundingConfig,
) -> FabricationReport {
    let sentences = split_sentences(report);
    if sentences.is_empty() {
        return FabricationReport {
            risk_level: RiskLevel::High,
            grounded_sentences: 0,
            total_sentences: 0,
            grounded_ratio: 0.0,
            meets_threshold: false,
            ungrounded_sentences: Vec::new(),
        };
    }

    let index = EvidenceTerms::new(evidence);
    let ungrounded_sentences: Vec<String> = sentences
        .iter()
        .filter(|s| !index.supports(s, config.similarity_threshold))
        .map(|s| s.to_string())
        .collect();
    let grounded = sentences.len() - ungrounded_sentences.len();
    let ratio = grounded as f64 / sentences.len() as f64;

    let risk_level = if ratio >= config.min_evidence_ratio {
        RiskLevel::Low
    } else if ratio >= config.min_evidence_ratio * 0.7 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    FabricationReport {
        risk_level,
        grounded_sentences: grounded,
        total_sentences: sentences.len(),
        grounded_ratio: ratio,
        meets_threshold: ratio >= config.min_evidence_ratio,
        ungrounded_sentences,
    }
}

/// Coarse flag: a report longer than `max_unsupported_chars` with no evidence.
pub fn identify_ungrounded_claims(
    report: &str,
    evidence: &[EvidenceItem],
    max_unsupported_chars: usize,
) -> Vec<String> {
    if evidence.is_empty() && report.chars().count() > max_unsupported_chars {
        vec![UNSUPPORTED_REPORT_CLAIM.to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence() -> Vec<EvidenceItem> {
        vec![EvidenceItem::new(
            "e1",
            "Deep Learning Survey",
            "Neural networks learn hierarchical representations from data.",
            1.0,
        )]
    }

    #[test]
    fn test_groundedness_overlap() {
        assert!(validate_groundedness("Neural networks are powerful", &evidence(), 0.3));
        assert!(!validate_groundedness("Tomatoes need sunlight", &evidence(), 0.3));
        assert!(!validate_groundedness("Neural networks", &[], 0.3));
        assert!(!validate_groundedness("...", &evidence(), 0.3));
    }

    #[test]
    fn test_groundedness_threshold_boundary() {
        // 1 of 2 terms shared
        assert!(validate_groundedness("neural cooking", &evidence(), 0.5));
        assert!(!validate_groundedness("neural cooking", &evidence(), 0.51));
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("One. Two!! Three?  ... "),
            vec!["One", "Two", "Three"]
        );
        assert!(split_sentences("  ").is_empty());
    }

    #[test]
    fn test_fabrication_empty_report() {
        let report = check_fabrication_risk("", &evidence(), &GroundingConfig::default());
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.total_sentences, 0);
        assert_eq!(report.grounded_ratio, 0.0);
    }

    #[test]
    fn test_fabrication_levels() {
        let config = GroundingConfig::default();
        let low = check_fabrication_risk(
            "Neural networks learn representations. Deep learning survey results.",
            &evidence(),
            &config,
        );
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert!(low.meets_threshold);

        // 2 of 5 grounded: 0.4 >= 0.35
        let medium = check_fabrication_risk(
            "Neural networks learn. Deep learning data. Cats sleep. Dogs bark. Birds sing.",
            &evidence(),
            &config,
        );
        assert_eq!(medium.grounded_sentences, 2);
        assert_eq!(medium.risk_level, RiskLevel::Medium);
        assert_eq!(medium.ungrounded_sentences, vec!["Cats sleep", "Dogs bark", "Birds sing"]);

        let high = check_fabrication_risk("Cats sleep. Dogs bark.", &evidence(), &config);
        assert_eq!(high.risk_level, RiskLevel::High);
        assert!(!high.meets_threshold);
    }

    #[test]
    fn test_identify_ungrounded_claims() {
        let long = "x".repeat(1001);
        assert_eq!(
            identify_ungrounded_claims(&long, &[], 1000),
            vec![UNSUPPORTED_REPORT_CLAIM.to_string()]
        );
        assert!(identify_ungrounded_claims(&long, &evidence(), 1000).is_empty());
        assert!(identify_ungrounded_claims(&"x".repeat(1000), &[], 1000).is_empty());
    }

    #[test]
    fn test_identify_ungrounded_claims_counts_chars() {
        // 1200 bytes, 600 chars
        let report = "é".repeat(600);
        assert!(identify_ungrounded_claims(&report, &[], 1000).is_empty());
        assert_eq!(identify_ungrounded_claims(&"é".repeat(1001), &[], 1000).len(), 1);
    }
}
