//! Configuration system for ADRA.
//!
//! Uses `figment` for layered configuration: defaults -> user config -> workspace config ->
//! environment -> explicit overrides. Configuration is loaded from the user config directory
//! (`config.toml`) and/or `.adra/config.toml` and `.adra/research_config.yaml` in the
//! workspace directory.

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the research pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdraConfig {
    /// Planner constraints.
    #[serde(default)]
    pub planning: PlanningConfig,
    /// Retriever budgets.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Reasoner targets.
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    /// Groundedness thresholds.
    #[serde(default)]
    pub grounding: GroundingConfig,
    /// Corpus safety filtering.
    #[serde(default)]
    pub safety: SafetyConfig,
}

impl AdraConfig {
    /// Reject knob combinations no component can honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let planning = &self.planning;
        if planning.min_subtasks == 0 {
            return Err(ConfigError::Invalid {
                message: "planning.min_subtasks must be at least 1".into(),
            });
        }
        if planning.min_subtasks > planning.max_subtasks {
            return Err(ConfigError::Invalid {
                message: format!(
                    "planning.min_subtasks ({}) exceeds planning.max_subtasks ({})",
                    planning.min_subtasks, planning.max_subtasks
                ),
            });
        }
        if self.retrieval.title_prefix_match_chars == 0 {
            return Err(ConfigError::Invalid {
                message: "retrieval.title_prefix_match_chars must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.grounding.similarity_threshold) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "grounding.similarity_threshold must be within [0, 1], got {}",
                    self.grounding.similarity_threshold
                ),
            });
        }
        Ok(())
    }
}

/// Planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Minimum number of sub-tasks in a plan.
    #[serde(default = "default_min_subtasks")]
    pub min_subtasks: usize,
    /// Maximum number of sub-tasks in a plan.
    #[serde(default = "default_max_subtasks")]
    pub max_subtasks: usize,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            min_subtasks: default_min_subtasks(),
            max_subtasks: default_max_subtasks(),
        }
    }
}

fn default_min_subtasks() -> usize {
    5
}

fn default_max_subtasks() -> usize {
    10
}

/// Retriever configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Tool invocations permitted per sub-task.
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls_per_subtask: usize,
    /// Token budget per search call (estimated at 4 chars per token).
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,
    /// Characters compared by the citation title-prefix rule.
    #[serde(default = "default_title_prefix_chars")]
    pub title_prefix_match_chars: usize,
    /// Latency target for one sub-task retrieval, in seconds.
    #[serde(default = "default_target_latency")]
    pub target_latency_seconds: f64,
    /// Simulated I/O latency per search call, in milliseconds.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_tool_calls_per_subtask: default_max_tool_calls(),
            token_budget: default_token_budget(),
            title_prefix_match_chars: default_title_prefix_chars(),
            target_latency_seconds: default_target_latency(),
            simulated_latency_ms: 0,
        }
    }
}

fn default_max_tool_calls() -> usize {
    10
}

fn default_token_budget() -> usize {
    10_000
}

fn default_title_prefix_chars() -> usize {
    20
}

fn default_target_latency() -> f64 {
    76.0
}

/// Reasoner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Target report length in tokens.
    #[serde(default = "default_target_token_output")]
    pub target_token_output: usize,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            target_token_output: default_target_token_output(),
        }
    }
}

fn default_target_token_output() -> usize {
    13_000
}

/// Groundedness and fabrication-risk thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingConfig {
    /// Minimum claim-term overlap ratio for a sentence to count as grounded.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Minimum grounded-sentence ratio for `low` fabrication risk.
    #[serde(default = "default_min_evidence_ratio")]
    pub min_evidence_ratio: f64,
    /// Report length above which an evidence-free report is flagged.
    #[serde(default = "default_ungrounded_report_chars")]
    pub ungrounded_report_chars: usize,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_evidence_ratio: default_min_evidence_ratio(),
            ungrounded_report_chars: default_ungrounded_report_chars(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_min_evidence_ratio() -> f64 {
    0.5
}

fn default_ungrounded_report_chars() -> usize {
    1000
}

/// Temporal safety filtering of the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Documents dated on or before this day (`YYYY-MM-DD`) are excluded.
    #[serde(default = "default_temporal_cutoff")]
    pub temporal_cutoff: String,
    /// Apply the temporal filter to corpora before retrieval.
    #[serde(default)]
    pub filter_corpus: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            temporal_cutoff: default_temporal_cutoff(),
            filter_corpus: false,
        }
    }
}

fn default_temporal_cutoff() -> String {
    "2025-03-01".to_string()
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `ADRA_`, sections split on `__`)
/// 3. Workspace-local config (`.adra/research_config.yaml`, then `.adra/config.toml`)
/// 4. User config (`~/.config/adra/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AdraConfig>,
) -> Result<AdraConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AdraConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "adra", "adra") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_toml = ws.join(".adra").join("config.toml");
        if ws_toml.exists() {
            figment = figment.merge(Toml::file(&ws_toml));
        }
        let ws_yaml = ws.join(".adra").join("research_config.yaml");
        if ws_yaml.exists() {
            figment = figment.merge(Yaml::file(&ws_yaml));
        }
    }

    // ADRA_RETRIEVAL__TOKEN_BUDGET, ADRA_PLANNING__MAX_SUBTASKS, ...
    figment = figment.merge(Env::prefixed("ADRA_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: AdraConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    tracing::debug!(
        min_subtasks = config.planning.min_subtasks,
        max_subtasks = config.planning.max_subtasks,
        token_budget = config.retrieval.token_budget,
        "Loaded configuration"
    );
    Ok(config)
}

/// Load configuration from a single explicit file, layered over the defaults.
///
/// The format is chosen from the extension: `.yaml`/`.yml` or TOML otherwise.
pub fn load_config_file(path: &Path) -> Result<AdraConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let figment = Figment::from(Serialized::defaults(AdraConfig::default()));
    let figment = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Toml::file(path)),
    };
    let config: AdraConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
