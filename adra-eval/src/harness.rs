//! Isolation harness: scores each pipeline stage on its own against a gold case.
//!
//! Each stage runs in the isolated mode that feeds it gold upstream data, so a weak
//! planner cannot drag down the retrieval score and weak retrieval cannot drag down the
//! reasoning score.

use crate::error::EvalError;
use crate::evaluator::{EvaluationResult, Evaluator};
use crate::gold::GoldCase;
use adra_core::{AdraConfig, PipelineMode, ResearchOrchestrator, ResearchRequest};
use serde::{Deserialize, Serialize};

/// Stage scores for one gold case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageScores {
    pub query: String,
    pub planning: EvaluationResult,
    pub retrieval: EvaluationResult,
    pub reasoning: EvaluationResult,
}

/// Runs gold cases through the isolated modes of one orchestrator configuration.
#[derive(Debug, Clone, Default)]
pub struct IsolationHarness {
    orchestrator: ResearchOrchestrator,
}

impl IsolationHarness {
    /// The orchestrator's mode is ignored; each stage sets its own.
    pub fn new(orchestrator: ResearchOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn from_config(config: AdraConfig) -> Self {
        Self::new(ResearchOrchestrator::from_config(config, PipelineMode::EndToEnd))
    }

    fn stage(&self, mode: PipelineMode) -> ResearchOrchestrator {
        let mut orchestrator = self.orchestrator.clone();
        orchestrator.set_pipeline_mode(mode);
        orchestrator
    }

    fn request(case: &GoldCase) -> ResearchRequest {
        let request = ResearchRequest::new(case.query.clone());
        match case.domain() {
            Some(domain) => request.with_domain(domain),
            None => request,
        }
    }

    /// Score planning, retrieval and reasoning for `case`, logging each result in
    /// `evaluator`.
    ///
    /// Reasoning requires non-empty `gold_evidence`; without it the run fails with the
    /// orchestrator's missing-input error after planning and retrieval are logged.
    pub async fn run(
        &self,
        case: &GoldCase,
        evaluator: &mut Evaluator,
    ) -> Result<StageScores, EvalError> {
        let prefix_chars = self.orchestrator.config().retrieval.title_prefix_match_chars;

        let mut planning_request = Self::request(case);
        if !case.gold_evidence.is_empty() {
            planning_request = planning_request.with_gold_evidence(case.gold_evidence.clone());
        }
        let planned = self
            .stage(PipelineMode::IsolatedPlanning)
            .execute_research(planning_request)
            .await?;
        let planning =
            evaluator.evaluate_planning(planned.plan.subtasks(), case.gold_plan.subtasks());

        let retrieval_request = Self::request(case)
            .with_gold_plan(case.gold_plan.clone())
            .with_corpus(case.corpus.clone());
        let retrieved = self
            .stage(PipelineMode::IsolatedRetrieval)
            .execute_research(retrieval_request)
            .await?;
        let titles: Vec<&str> = retrieved.evidence.iter().map(|e| e.title.as_str()).collect();
        let retrieval = evaluator.evaluate_retrieval(&titles, &case.citation_titles(), prefix_chars);

        let reasoning_request = Self::request(case)
            .with_gold_plan(case.gold_plan.clone())
            .with_gold_evidence(case.gold_evidence.clone());
        let reasoned = self
            .stage(PipelineMode::IsolatedReasoning)
            .execute_research(reasoning_request)
            .await?;
        let reasoning = evaluator.evaluate_reasoning(
            &reasoned.synthesis.diagnostic_responses,
            &case.gold_diagnostics,
        );

        tracing::info!(
            query = %case.query,
            planning_jaccard = planning.metric("jaccard").unwrap_or_default(),
            retrieval_jaccard = retrieval.metric("jaccard").unwrap_or_default(),
            reasoning_f1 = reasoning.metric("f1").unwrap_or_default(),
            "Gold case evaluated"
        );

        Ok(StageScores {
            query: case.query.clone(),
            planning,
            retrieval,
            reasoning,
        })
    }

    /// Run every case in order, stopping at the first failure.
    pub async fn run_all(
        &self,
        cases: &[GoldCase],
        evaluator: &mut Evaluator,
    ) -> Result<Vec<StageScores>, EvalError> {
        let mut scores = Vec::with_capacity(cases.len());
        for case in cases {
            scores.push(self.run(case, evaluator).await?);
        }
        Ok(scores)
    }
}
