//! Research orchestrator composing planning, retrieval and reasoning.
//!
//! Four modes decide which stages run for real and which are replaced by injected gold
//! data:
//!
//! | Mode | Gold inputs | Runs |
//! |---|---|---|
//! | `end-to-end` | none | plan → retrieve (if a corpus is given) → reason |
//! | `isolated_planning` | evidence (optional) | plan → reason |
//! | `isolated_retrieval` | plan | retrieve → reason |
//! | `isolated_reasoning` | plan and evidence | reason |
//!
//! Required gold inputs are checked once, in [`StageInputs::resolve`]; each handler
//! receives its inputs as non-optional values.

use crate::config::{AdraConfig, load_config};
use crate::error::{AdraError, OrchestratorError};
use crate::evidence::{CorpusDocument, EvidenceItem};
use crate::plan::Plan;
use crate::planner::Planner;
use crate::reasoner::{Reasoner, SynthesisResult};
use crate::retriever::{Domain, RetrievalStats, RetrievalStrategy, Retriever};
use crate::safety;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use uuid::Uuid;

/// Which pipeline stages run for real.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineMode {
    #[default]
    #[serde(rename = "end-to-end")]
    EndToEnd,
    #[serde(rename = "isolated_planning")]
    IsolatedPlanning,
    #[serde(rename = "isolated_retrieval")]
    IsolatedRetrieval,
    #[serde(rename = "isolated_reasoning")]
    IsolatedReasoning,
}

impl PipelineMode {
    pub const ALL: [PipelineMode; 4] = [
        Self::EndToEnd,
        Self::IsolatedPlanning,
        Self::IsolatedRetrieval,
        Self::IsolatedReasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndToEnd => "end-to-end",
            Self::IsolatedPlanning => "isolated_planning",
            Self::IsolatedRetrieval => "isolated_retrieval",
            Self::IsolatedReasoning => "isolated_reasoning",
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineMode {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| OrchestratorError::InvalidMode {
                mode: s.to_string(),
                valid: Self::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

/// Inputs to one pipeline execution. Which optional fields are required depends on the
/// mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    #[serde(default)]
    pub corpus: Option<Vec<CorpusDocument>>,
    #[serde(default)]
    pub gold_plan: Option<Plan>,
    #[serde(default)]
    pub gold_evidence: Option<Vec<EvidenceItem>>,
    #[serde(default)]
    pub domain: Option<Domain>,
}

impl ResearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_corpus(mut self, corpus: Vec<CorpusDocument>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn with_gold_plan(mut self, plan: Plan) -> Self {
        self.gold_plan = Some(plan);
        self
    }

    pub fn with_gold_evidence(mut self, evidence: Vec<EvidenceItem>) -> Self {
        self.gold_evidence = Some(evidence);
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }
}

/// Mode-specific inputs, borrowed from a [`ResearchRequest`].
#[derive(Debug, Clone, Copy)]
pub enum StageInputs<'a> {
    EndToEnd {
        corpus: Option<&'a [CorpusDocument]>,
    },
    IsolatedPlanning {
        gold_evidence: Option<&'a [EvidenceItem]>,
    },
    IsolatedRetrieval {
        gold_plan: &'a Plan,
        corpus: Option<&'a [CorpusDocument]>,
    },
    IsolatedReasoning {
        gold_plan: &'a Plan,
        gold_evidence: &'a [EvidenceItem],
    },
}

impl<'a> StageInputs<'a> {
    /// Check that `request` carries what `mode` needs.
    ///
    /// An empty gold evidence list counts as missing.
    pub fn resolve(mode: PipelineMode, request: &'a ResearchRequest) -> Result<Self, OrchestratorError> {
        let corpus = request.corpus.as_deref();
        let gold_evidence = request
            .gold_evidence
            .as_deref()
            .filter(|evidence| !evidence.is_empty());

        match mode {
            PipelineMode::EndToEnd => Ok(Self::EndToEnd { corpus }),
            PipelineMode::IsolatedPlanning => Ok(Self::IsolatedPlanning {
                gold_evidence: request.gold_evidence.as_deref(),
            }),
            PipelineMode::IsolatedRetrieval => match &request.gold_plan {
                Some(gold_plan) => Ok(Self::IsolatedRetrieval { gold_plan, corpus }),
                None => Err(OrchestratorError::MissingGoldInput {
                    mode: mode.to_string(),
                    missing: "gold_plan".into(),
                }),
            },
            PipelineMode::IsolatedReasoning => match (&request.gold_plan, gold_evidence) {
                (Some(gold_plan), Some(gold_evidence)) => Ok(Self::IsolatedReasoning {
                    gold_plan,
                    gold_evidence,
                }),
                _ => Err(OrchestratorError::MissingGoldInput {
                    mode: mode.to_string(),
                    missing: "gold_plan and gold_evidence".into(),
                }),
            },
        }
    }
}

/// What one execution did and which inputs were gold-substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub mode: PipelineMode,
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_gold_plan: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_gold_evidence: Option<bool>,
    /// Per-subtask budget usage, in plan order. Empty when retrieval did not run.
    #[serde(default)]
    pub retrieval: Vec<RetrievalStats>,
    pub elapsed_ms: u64,
}

impl ResultMetadata {
    fn new(mode: PipelineMode, domain: Option<Domain>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            mode,
            domain,
            pipeline_complete: None,
            used_gold_plan: None,
            used_gold_evidence: None,
            retrieval: Vec::new(),
            elapsed_ms: 0,
        }
    }
}

/// The orchestrator's only output type, created fresh per execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    pub query: String,
    pub plan: Plan,
    pub evidence: Vec<EvidenceItem>,
    pub synthesis: SynthesisResult,
    pub mode: PipelineMode,
    pub metadata: ResultMetadata,
}

/// Mode-switchable pipeline over a planner, retriever and reasoner.
#[derive(Debug, Clone)]
pub struct ResearchOrchestrator {
    config: AdraConfig,
    planner: Planner,
    retriever: Retriever,
    reasoner: Reasoner,
    mode: PipelineMode,
    strategy: RetrievalStrategy,
}

impl Default for ResearchOrchestrator {
    fn default() -> Self {
        Self::from_config(AdraConfig::default(), PipelineMode::default())
    }
}

impl ResearchOrchestrator {
    /// Default components in the mode named by `mode`.
    pub fn new(mode: &str) -> Result<Self, OrchestratorError> {
        let mode: PipelineMode = mode.parse()?;
        Ok(Self::from_config(AdraConfig::default(), mode))
    }

    /// Build every component from `config`.
    pub fn from_config(config: AdraConfig, mode: PipelineMode) -> Self {
        Self {
            planner: Planner::new(config.planning.clone()),
            retriever: Retriever::new(config.retrieval.clone()),
            reasoner: Reasoner::new(config.reasoning.clone(), config.grounding.clone()),
            config,
            mode,
            strategy: RetrievalStrategy::Hybrid,
        }
    }

    /// Load layered configuration for `workspace` and build from it.
    pub fn from_workspace(workspace: &Path, mode: &str) -> Result<Self, AdraError> {
        let mode: PipelineMode = mode.parse()?;
        let config = load_config(Some(workspace), None)?;
        Ok(Self::from_config(config, mode))
    }

    /// Replace the stage components.
    pub fn with_components(mut self, planner: Planner, retriever: Retriever, reasoner: Reasoner) -> Self {
        self.planner = planner;
        self.retriever = retriever;
        self.reasoner = reasoner;
        self
    }

    pub fn with_strategy(mut self, strategy: RetrievalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn config(&self) -> &AdraConfig {
        &self.config
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn reasoner(&self) -> &Reasoner {
        &self.reasoner
    }

    /// Switch mode by name. The current mode is kept on error.
    pub fn set_mode(&mut self, mode: &str) -> Result<(), OrchestratorError> {
        let mode: PipelineMode = mode.parse()?;
        self.set_pipeline_mode(mode);
        Ok(())
    }

    pub fn set_pipeline_mode(&mut self, mode: PipelineMode) {
        if mode != self.mode {
            tracing::info!(from = %self.mode, to = %mode, "Pipeline mode switched");
        }
        self.mode = mode;
    }

    /// Run the pipeline in the current mode.
    pub async fn execute_research(&self, request: ResearchRequest) -> Result<ResearchResult, AdraError> {
        let started = Instant::now();
        let inputs = StageInputs::resolve(self.mode, &request)?;
        let mut metadata = ResultMetadata::new(self.mode, request.domain);
        tracing::info!(
            run_id = %metadata.run_id,
            mode = %self.mode,
            domain = request.domain.map(|d| d.as_str()).unwrap_or("none"),
            "Executing research"
        );

        let query = request.query.as_str();
        let (plan, evidence) = match inputs {
            StageInputs::EndToEnd { corpus } => {
                let plan = self.planner.plan(query, None).await?;
                let evidence = self
                    .retrieve_into(plan.subtasks(), corpus, request.domain, &mut metadata)
                    .await;
                metadata.pipeline_complete = Some(true);
                (plan, evidence)
            }
            StageInputs::IsolatedPlanning { gold_evidence } => {
                let plan = self.planner.plan(query, None).await?;
                metadata.used_gold_evidence = Some(gold_evidence.is_some());
                (plan, gold_evidence.map(<[_]>::to_vec).unwrap_or_default())
            }
            StageInputs::IsolatedRetrieval { gold_plan, corpus } => {
                let evidence = self
                    .retrieve_into(gold_plan.subtasks(), corpus, request.domain, &mut metadata)
                    .await;
                metadata.used_gold_plan = Some(true);
                (gold_plan.clone(), evidence)
            }
            StageInputs::IsolatedReasoning {
                gold_plan,
                gold_evidence,
            } => {
                metadata.used_gold_plan = Some(true);
                metadata.used_gold_evidence = Some(true);
                (gold_plan.clone(), gold_evidence.to_vec())
            }
        };

        let synthesis = self
            .reasoner
            .synthesize_report(query, plan.subtasks(), &evidence)
            .await?;
        metadata.elapsed_ms = started.elapsed().as_millis() as u64;

        Ok(ResearchResult {
            query: request.query.clone(),
            plan,
            evidence,
            synthesis,
            mode: self.mode,
            metadata,
        })
    }

    async fn retrieve_into(
        &self,
        subtasks: &[String],
        corpus: Option<&[CorpusDocument]>,
        domain: Option<Domain>,
        metadata: &mut ResultMetadata,
    ) -> Vec<EvidenceItem> {
        match corpus {
            Some(corpus) if !corpus.is_empty() => {
                let (evidence, stats) = self.retrieve_evidence(subtasks, corpus, domain).await;
                metadata.retrieval = stats;
                evidence
            }
            _ => Vec::new(),
        }
    }

    /// Retrieve for every sub-task, each under its own budget, and deduplicate by document
    /// id in plan order.
    pub async fn retrieve_evidence(
        &self,
        subtasks: &[String],
        corpus: &[CorpusDocument],
        domain: Option<Domain>,
    ) -> (Vec<EvidenceItem>, Vec<RetrievalStats>) {
        let corpus: Cow<'_, [CorpusDocument]> = if self.config.safety.filter_corpus {
            Cow::Owned(safety::filter_unsafe_content(
                corpus,
                &self.config.safety.temporal_cutoff,
            ))
        } else {
            Cow::Borrowed(corpus)
        };

        let retrievals = futures::future::join_all(subtasks.iter().map(|subtask| {
            self.retriever
                .retrieve_for_subtask(subtask, &corpus, self.strategy, domain)
        }))
        .await;

        let mut seen = HashSet::new();
        let mut evidence = Vec::new();
        let mut stats = Vec::with_capacity(retrievals.len());
        for (index, retrieval) in retrievals.into_iter().enumerate() {
            tracing::debug!(
                subtask = index + 1,
                results = retrieval.evidence.len(),
                calls = retrieval.stats.tool_calls_used,
                "Sub-task retrieval finished"
            );
            evidence.extend(
                retrieval
                    .evidence
                    .into_iter()
                    .filter(|item| seen.insert(item.id.clone())),
            );
            stats.push(retrieval.stats);
        }

        tracing::info!(
            subtasks = subtasks.len(),
            evidence = evidence.len(),
            "Evidence aggregated"
        );
        (evidence, stats)
    }
}
