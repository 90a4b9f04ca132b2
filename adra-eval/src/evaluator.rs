//! The evaluation log: per-stage scoring against gold data, summaries and export.

use crate::error::EvalError;
use crate::metrics::{self, DiagnosticCounts};
use crate::normalize;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Pipeline stage an evaluation scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Planning,
    Retrieval,
    Reasoning,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [Self::Planning, Self::Retrieval, Self::Reasoning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Retrieval => "retrieval",
            Self::Reasoning => "reasoning",
        }
    }

    /// Markdown section heading.
    fn heading(&self) -> &'static str {
        match self {
            Self::Planning => "Planning Module (π)",
            Self::Retrieval => "Retrieval Module (ρ)",
            Self::Reasoning => "Reasoning Module (σ)",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored stage output. Never mutated once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub module: ModuleKind,
    /// Metric values in the order the scorer reports them.
    pub metrics: IndexMap<String, f64>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl EvaluationResult {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Rendering used by [`Evaluator::export_results`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

impl FromStr for ExportFormat {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(EvalError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Per-module metric averages, metrics in reporting order.
pub type Summary = BTreeMap<ModuleKind, IndexMap<String, f64>>;

/// Scores stage outputs against gold data and keeps every result in order.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    format: ExportFormat,
    results: Vec<EvaluationResult>,
}

impl Evaluator {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            results: Vec::new(),
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// Jaccard scores of predicted sub-tasks against gold sub-tasks, after normalization.
    pub fn evaluate_planning<P: AsRef<str>, G: AsRef<str>>(
        &mut self,
        predicted: &[P],
        gold: &[G],
    ) -> EvaluationResult {
        let predicted_set = normalize::normalize_subtasks(predicted);
        let gold_set = normalize::normalize_subtasks(gold);
        let score = metrics::calculate_jaccard(&predicted_set, &gold_set);

        let mut details = Map::new();
        details.insert("predicted_count".into(), json!(predicted.len()));
        details.insert("gold_count".into(), json!(gold.len()));
        details.insert(
            "overlap_count".into(),
            json!(predicted_set.intersection(&gold_set).count()),
        );

        self.record(ModuleKind::Planning, score.to_metrics(), details)
    }

    /// Jaccard scores of retrieved titles against gold citations, compared on their
    /// `prefix_chars`-character prefixes.
    pub fn evaluate_retrieval<P: AsRef<str>, G: AsRef<str>>(
        &mut self,
        predicted_titles: &[P],
        gold_titles: &[G],
        prefix_chars: usize,
    ) -> EvaluationResult {
        let predicted_set = normalize::normalize_titles(predicted_titles, prefix_chars);
        let gold_set = normalize::normalize_titles(gold_titles, prefix_chars);
        let score = metrics::calculate_jaccard(&predicted_set, &gold_set);

        let mut details = Map::new();
        details.insert("predicted_count".into(), json!(predicted_titles.len()));
        details.insert("gold_count".into(), json!(gold_titles.len()));
        details.insert(
            "overlap_count".into(),
            json!(predicted_set.intersection(&gold_set).count()),
        );
        details.insert("prefix_chars".into(), json!(prefix_chars));

        self.record(ModuleKind::Retrieval, score.to_metrics(), details)
    }

    /// F1 scores of diagnostic answers against gold answers.
    pub fn evaluate_reasoning(
        &mut self,
        predicted: &BTreeMap<String, bool>,
        gold: &BTreeMap<String, bool>,
    ) -> EvaluationResult {
        let score = metrics::calculate_reasoning_f1(predicted, gold);
        let DiagnosticCounts { correct, .. } = score.counts;

        let mut details = Map::new();
        details.insert("total_diagnostics".into(), json!(gold.len()));
        details.insert("correct_predictions".into(), json!(correct));

        self.record(ModuleKind::Reasoning, score.to_metrics(), details)
    }

    fn record(
        &mut self,
        module: ModuleKind,
        metrics: IndexMap<String, f64>,
        details: Map<String, Value>,
    ) -> EvaluationResult {
        tracing::debug!(module = %module, ?metrics, "Evaluation recorded");
        let result = EvaluationResult {
            module,
            metrics,
            details,
        };
        self.results.push(result.clone());
        result
    }

    /// Average every metric per module across the log. Modules never evaluated are absent.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::new();
        for module in ModuleKind::ALL {
            let logged: Vec<&EvaluationResult> =
                self.results.iter().filter(|r| r.module == module).collect();
            let Some(first) = logged.first() else {
                continue;
            };

            let averages = first
                .metrics
                .keys()
                .map(|key| {
                    let total: f64 = logged.iter().filter_map(|r| r.metric(key)).sum();
                    (key.clone(), total / logged.len() as f64)
                })
                .collect();
            summary.insert(module, averages);
        }
        summary
    }

    /// Render the log in the configured format, also writing it to `path` when given.
    pub fn export_results(&self, path: Option<&Path>) -> Result<String, EvalError> {
        let output = match self.format {
            ExportFormat::Markdown => self.export_markdown(),
            ExportFormat::Json => self.export_json()?,
        };

        if let Some(path) = path {
            std::fs::write(path, &output)?;
            tracing::info!(
                path = %path.display(),
                results = self.results.len(),
                "Evaluation results exported"
            );
        }
        Ok(output)
    }

    /// One metric table per evaluated module, in pipeline order.
    pub fn export_markdown(&self) -> String {
        let mut output = String::from("# ADRA-Bank Evaluation Results\n\n");
        if self.results.is_empty() {
            output.push_str("No evaluation results available.\n");
            return output;
        }

        for module in ModuleKind::ALL {
            let mut logged = self.results.iter().filter(|r| r.module == module).peekable();
            if logged.peek().is_none() {
                continue;
            }

            output.push_str(&format!("## {}\n\n", module.heading()));
            output.push_str("| Metric | Value |\n");
            output.push_str("|--------|-------|\n");
            for result in logged {
                for (metric, value) in &result.metrics {
                    output.push_str(&format!("| {} | {value:.4} |\n", capitalize(metric)));
                }
            }
            output.push('\n');
        }

        output.push_str("---\n\n");
        output.push_str(
            "*Note: Metrics use Jaccard/IoU for Planning and Retrieval, F1-Score for Reasoning*\n",
        );
        output
    }

    /// `{"results": [...]}`, pretty-printed.
    pub fn export_json(&self) -> Result<String, EvalError> {
        let value = json!({ "results": self.results });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

/// First character uppercased, the rest lowercased.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
