//! The retriever: budgeted search primitives over an in-memory corpus.

use super::budget::ToolBudget;
use super::domain::Domain;
use super::search::{self, RetrievalStrategy, SearchMethod};
use crate::config::RetrievalConfig;
use crate::evidence::{self, CorpusDocument, EvidenceItem};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Budget and timing figures for one sub-task retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalStats {
    pub tool_calls_used: usize,
    pub tool_calls_limit: usize,
    pub token_budget: usize,
    pub title_prefix_chars: usize,
    pub elapsed_ms: u64,
}

/// Evidence for one sub-task plus the stats of the budget that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskRetrieval {
    pub subtask: String,
    pub evidence: Vec<EvidenceItem>,
    pub stats: RetrievalStats,
}

/// Keyword, semantic and chunk-read access to a corpus.
///
/// Holds configuration only. Call accounting lives in the [`ToolBudget`] passed to each
/// primitive, so one `Retriever` can serve concurrent sub-tasks.
#[derive(Debug, Clone, Default)]
pub struct Retriever {
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// A fresh per-subtask budget sized from configuration.
    pub fn new_budget(&self) -> ToolBudget {
        ToolBudget::new(self.config.max_tool_calls_per_subtask)
    }

    /// Rank documents by query-term overlap, admitting results within the token budget.
    ///
    /// Returns an empty list once `budget` is exhausted.
    pub async fn keyword_search(
        &self,
        query: &str,
        corpus: &[CorpusDocument],
        budget: &mut ToolBudget,
    ) -> Vec<EvidenceItem> {
        self.search(query, corpus, budget, SearchMethod::Keyword).await
    }

    /// Semantic search. Currently term-overlap ranking tagged `semantic`; an embedding
    /// backend would slot in here.
    pub async fn semantic_search(
        &self,
        query: &str,
        corpus: &[CorpusDocument],
        budget: &mut ToolBudget,
    ) -> Vec<EvidenceItem> {
        self.search(query, corpus, budget, SearchMethod::Semantic).await
    }

    async fn search(
        &self,
        query: &str,
        corpus: &[CorpusDocument],
        budget: &mut ToolBudget,
        method: SearchMethod,
    ) -> Vec<EvidenceItem> {
        if !budget.charge() {
            return Vec::new();
        }

        let ranked = search::rank_documents(query, corpus, method);
        let ranked_count = ranked.len();
        let admitted = search::admit_within_budget(ranked, self.config.token_budget);
        tracing::debug!(
            method = method.as_str(),
            ranked = ranked_count,
            admitted = admitted.len(),
            calls = budget.used(),
            "Search completed"
        );

        self.io_boundary().await;
        admitted
    }

    /// Read a document, or one section of it, by id.
    ///
    /// A section runs from a case-insensitive match of its heading to the next blank line
    /// or the end of the document. An unmatched section yields the whole content.
    /// Returns `None` when over budget, without a corpus, or when the id is unknown.
    pub async fn chunk_read(
        &self,
        doc_id: &str,
        section: Option<&str>,
        corpus: Option<&[CorpusDocument]>,
        budget: &mut ToolBudget,
    ) -> Option<String> {
        if !budget.charge() {
            return None;
        }

        let doc = corpus?.iter().find(|d| d.id == doc_id)?;
        let content = match section {
            Some(section) if !section.is_empty() && !doc.content.is_empty() => {
                extract_section(&doc.content, section).unwrap_or(&doc.content)
            }
            _ => &doc.content,
        };

        self.io_boundary().await;
        Some(content.to_string())
    }

    /// Title-prefix citation check, defaulting to the configured prefix length.
    pub fn verify_citation_match(
        &self,
        predicted_title: &str,
        ground_truth: &str,
        prefix_chars: Option<usize>,
    ) -> bool {
        evidence::verify_citation_match(
            predicted_title,
            ground_truth,
            prefix_chars.unwrap_or(self.config.title_prefix_match_chars),
        )
    }

    /// Gather evidence for one sub-task under a fresh budget.
    ///
    /// The query is refined for `domain` first. `Hybrid` runs keyword then semantic search,
    /// keeps the first occurrence of each document and re-sorts by score.
    pub async fn retrieve_for_subtask(
        &self,
        subtask: &str,
        corpus: &[CorpusDocument],
        strategy: RetrievalStrategy,
        domain: Option<Domain>,
    ) -> SubtaskRetrieval {
        let started = Instant::now();
        let mut budget = self.new_budget();
        let query = match domain {
            Some(domain) => domain.refine_query(subtask),
            None => subtask.to_string(),
        };

        let evidence = match strategy {
            RetrievalStrategy::Keyword => self.keyword_search(&query, corpus, &mut budget).await,
            RetrievalStrategy::Semantic => self.semantic_search(&query, corpus, &mut budget).await,
            RetrievalStrategy::Hybrid => {
                let keyword = self.keyword_search(&query, corpus, &mut budget).await;
                let semantic = self.semantic_search(&query, corpus, &mut budget).await;
                let mut merged = search::merge_unique([keyword, semantic]);
                search::sort_by_score(&mut merged);
                merged
            }
        };

        let elapsed = started.elapsed();
        if elapsed.as_secs_f64() > self.config.target_latency_seconds {
            tracing::warn!(
                elapsed_secs = elapsed.as_secs_f64(),
                target_secs = self.config.target_latency_seconds,
                "Sub-task retrieval exceeded target latency"
            );
        }

        SubtaskRetrieval {
            subtask: subtask.to_string(),
            evidence,
            stats: self.stats(&budget, elapsed),
        }
    }

    pub fn stats(&self, budget: &ToolBudget, elapsed: Duration) -> RetrievalStats {
        RetrievalStats {
            tool_calls_used: budget.used(),
            tool_calls_limit: budget.limit(),
            token_budget: self.config.token_budget,
            title_prefix_chars: self.config.title_prefix_match_chars,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Suspension point standing in for remote I/O.
    async fn io_boundary(&self) {
        if self.config.simulated_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.simulated_latency_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Slice of `content` from a case-insensitive match of `section` up to the next `\n\n`.
fn extract_section<'a>(content: &'a str, section: &str) -> Option<&'a str> {
    let heading = RegexBuilder::new(&regex::escape(section))
        .case_insensitive(true)
        .build()
        .ok()?;
    let found = heading.find(content)?;
    let end = content[found.end()..]
        .find("\n\n")
        .map(|offset| found.end() + offset)
        .unwrap_or(content.len());
    Some(&content[found.start()..end])
}
