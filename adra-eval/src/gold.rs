//! Expert-authored benchmark cases.

use crate::error::EvalError;
use adra_core::{CorpusDocument, Domain, EvidenceItem, Plan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One benchmark query with gold data for every pipeline stage.
///
/// `gold_plan` is validated against the plan contract on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldCase {
    pub query: String,
    /// Free-form domain tag; unrecognised tags read as general.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub corpus: Vec<CorpusDocument>,
    pub gold_plan: Plan,
    #[serde(default)]
    pub gold_evidence: Vec<EvidenceItem>,
    /// Titles a good retrieval should cite.
    #[serde(default)]
    pub gold_citations: Vec<String>,
    /// Expected answers to the diagnostic bank, keyed by question text.
    #[serde(default)]
    pub gold_diagnostics: BTreeMap<String, bool>,
}

impl GoldCase {
    /// Load a case from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let content = match extension.as_deref() {
            Some("json" | "yaml" | "yml") => std::fs::read_to_string(path)?,
            _ => {
                return Err(EvalError::UnknownCaseFile {
                    path: path.to_path_buf(),
                });
            }
        };

        let case = if extension.as_deref() == Some("json") {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        tracing::debug!(path = %path.display(), query = %case.query, "Gold case loaded");
        Ok(case)
    }

    pub fn from_json(content: &str) -> Result<Self, EvalError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, EvalError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn domain(&self) -> Option<Domain> {
        self.domain.as_deref().map(Domain::from_tag)
    }

    /// Citation titles to score retrieval against: `gold_citations`, or the gold
    /// evidence titles when no citations were authored.
    pub fn citation_titles(&self) -> Vec<&str> {
        if self.gold_citations.is_empty() {
            self.gold_evidence.iter().map(|e| e.title.as_str()).collect()
        } else {
            self.gold_citations.iter().map(String::as_str).collect()
        }
    }
}
