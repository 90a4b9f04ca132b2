//! Corpus documents, retrieved evidence and citations.
//!
//! Also hosts the title-prefix rule shared by retrieval verification, groundedness
//! and evaluation: lowercase, collapse whitespace, compare the first N characters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of title characters compared by the prefix rule.
pub const DEFAULT_TITLE_PREFIX_CHARS: usize = 20;

/// Characters of content kept in a citation excerpt.
pub const EXCERPT_CHARS: usize = 200;

/// A searchable document supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Publication date (`YYYY-MM-DD`), used by temporal safety filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Any further caller-supplied fields, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CorpusDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            date: None,
            extra: Map::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Lowercased `"title content"`, the text searched by every primitive.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.content).to_lowercase()
    }
}

/// A scored document returned by retrieval, or supplied as gold evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl EvidenceItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            score,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Estimated token cost of carrying this item (4 characters per token).
    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(&self.content)
    }

    /// Retrieval method tag recorded in metadata, if any.
    pub fn method(&self) -> Option<&str> {
        self.metadata.get("method").and_then(Value::as_str)
    }
}

/// Attribution record derived from an evidence item at synthesis time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub doc_id: String,
    pub title: String,
    pub excerpt: String,
    pub relevance_score: f64,
}

impl Citation {
    pub fn from_evidence(item: &EvidenceItem) -> Self {
        let excerpt: String = item.content.chars().take(EXCERPT_CHARS).collect();
        Self {
            doc_id: item.id.clone(),
            title: item.title.clone(),
            excerpt: format!("{excerpt}..."),
            relevance_score: item.score,
        }
    }
}

/// Rough token estimate: four characters per token, counted as `char`s not bytes.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Lowercase and collapse internal whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized title truncated to `prefix_chars` characters.
pub fn title_prefix(title: &str, prefix_chars: usize) -> String {
    normalize_title(title).chars().take(prefix_chars).collect()
}

/// Whether two titles agree on their normalized `prefix_chars`-character prefix.
///
/// Tolerates truncation and formatting drift between a retrieved title and a gold one.
pub fn verify_citation_match(predicted_title: &str, ground_truth: &str, prefix_chars: usize) -> bool {
    title_prefix(predicted_title, prefix_chars) == title_prefix(ground_truth, prefix_chars)
}
