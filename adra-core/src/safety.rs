//! Corpus safety checks: temporal leakage filtering and citation format validation.

use crate::evidence::CorpusDocument;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Default publication cutoff. Only documents published after it are considered safe.
pub const DEFAULT_TEMPORAL_CUTOFF: &str = "2025-03-01";

const DATE_FORMAT: &str = "%Y-%m-%d";

static CITATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\[\d+\]",
        r"\([A-Za-z]+\s+et\s+al\.,\s*\d{4}\)",
        r"[A-Za-z]+\s+et\s+al\.\s+\(\d{4}\)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Whether `paper_date` falls strictly after `cutoff` (both `YYYY-MM-DD`).
///
/// Unparseable dates are treated as unsafe.
pub fn validate_temporal_safety(paper_date: &str, cutoff: &str) -> bool {
    match (
        NaiveDate::parse_from_str(paper_date.trim(), DATE_FORMAT),
        NaiveDate::parse_from_str(cutoff.trim(), DATE_FORMAT),
    ) {
        (Ok(paper), Ok(cutoff)) => paper > cutoff,
        _ => false,
    }
}

/// Keep documents published after `cutoff`. Undated documents are kept.
pub fn filter_unsafe_content(documents: &[CorpusDocument], cutoff: &str) -> Vec<CorpusDocument> {
    let safe: Vec<CorpusDocument> = documents
        .iter()
        .filter(|doc| match &doc.date {
            None => true,
            Some(date) => validate_temporal_safety(date, cutoff),
        })
        .cloned()
        .collect();

    let dropped = documents.len() - safe.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = safe.len(), cutoff, "Filtered pre-cutoff documents");
    }
    safe
}

/// Whether `citation` contains `[N]`, `(Author et al., YYYY)` or `Author et al. (YYYY)`.
pub fn validate_citation_format(citation: &str) -> bool {
    CITATION_PATTERNS.iter().any(|re| re.is_match(citation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_safety() {
        assert!(validate_temporal_safety("2025-04-15", DEFAULT_TEMPORAL_CUTOFF));
        assert!(!validate_temporal_safety("2024-12-01", DEFAULT_TEMPORAL_CUTOFF));
        assert!(!validate_temporal_safety("2025-03-01", DEFAULT_TEMPORAL_CUTOFF));
        assert!(!validate_temporal_safety("April 2025", DEFAULT_TEMPORAL_CUTOFF));
        assert!(!validate_temporal_safety("2025-04-15", "not a date"));
    }

    #[test]
    fn test_filter_unsafe_content() {
        let docs = vec![
            CorpusDocument::new("new", "New", "").with_date("2025-06-01"),
            CorpusDocument::new("old", "Old", "").with_date("2023-01-01"),
            CorpusDocument::new("undated", "Undated", ""),
            CorpusDocument::new("garbled", "Garbled", "").with_date("yesterday"),
        ];
        let kept: Vec<String> = filter_unsafe_content(&docs, DEFAULT_TEMPORAL_CUTOFF)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(kept, vec!["new", "undated"]);
    }

    #[test]
    fn test_citation_format() {
        assert!(validate_citation_format("[1] Smith et al., 2025"));
        assert!(validate_citation_format("as shown (Vaswani et al., 2017)"));
        assert!(validate_citation_format("Brown et al. (2020) report"));
        assert!(!validate_citation_format("some random text"));
        assert!(!validate_citation_format("Smith 2020"));
    }
}
