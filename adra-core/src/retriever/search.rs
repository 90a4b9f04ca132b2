//! Term-overlap ranking, token-budget admission and result merging.

use crate::evidence::{CorpusDocument, EvidenceItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Which primitive produced a result, recorded as `metadata.method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    Keyword,
    Semantic,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Semantic => "semantic",
        }
    }
}

/// How `retrieve_for_subtask` combines the search primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    Keyword,
    Semantic,
    #[default]
    Hybrid,
}

impl RetrievalStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Semantic => "semantic",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "semantic" => Ok(Self::Semantic),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!(
                "Unknown retrieval strategy: {other}. Must be one of keyword, semantic, hybrid"
            )),
        }
    }
}

/// Distinct lowercase whitespace-delimited terms.
pub fn terms(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Score every document by query-term overlap.
///
/// `score = |query ∩ doc| / |query|`. Documents without overlap are dropped; the rest
/// are sorted by descending score, ties keeping corpus order.
pub fn rank_documents(
    query: &str,
    corpus: &[CorpusDocument],
    method: SearchMethod,
) -> Vec<EvidenceItem> {
    let query_terms = terms(query);
    if query_terms.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<EvidenceItem> = corpus
        .iter()
        .filter_map(|doc| {
            let doc_text = doc.search_text();
            let doc_terms: HashSet<&str> = doc_text.split_whitespace().collect();
            let overlap = query_terms
                .iter()
                .filter(|t| doc_terms.contains(t.as_str()))
                .count();
            (overlap > 0).then(|| {
                EvidenceItem::new(
                    doc.id.clone(),
                    doc.title.clone(),
                    doc.content.clone(),
                    overlap as f64 / query_terms.len() as f64,
                )
                .with_metadata("method", method.as_str())
                .with_metadata("overlap_terms", overlap)
            })
        })
        .collect();

    sort_by_score(&mut results);
    results
}

/// Stable descending sort on `score`.
pub fn sort_by_score(items: &mut [EvidenceItem]) {
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Greedy prefix admission under a token budget.
///
/// Items are admitted in order while the running token estimate stays within
/// `token_budget`. The first item that would overflow ends admission.
pub fn admit_within_budget(items: Vec<EvidenceItem>, token_budget: usize) -> Vec<EvidenceItem> {
    let mut total_tokens = 0usize;
    let mut admitted = Vec::with_capacity(items.len());
    for item in items {
        let tokens = item.estimated_tokens();
        if total_tokens + tokens > token_budget {
            break;
        }
        total_tokens += tokens;
        admitted.push(item);
    }
    admitted
}

/// Concatenate result lists, keeping the first occurrence of each document id.
pub fn merge_unique<I>(lists: I) -> Vec<EvidenceItem>
where
    I: IntoIterator<Item = Vec<EvidenceItem>>,
{
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}
