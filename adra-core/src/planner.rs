//! Planner: decomposes a research query into a validated [`Plan`].
//!
//! Sub-task text comes from a [`SubtaskGenerator`] (normally a language-model backend).
//! Whatever the generator returns is re-validated against the plan contract before it
//! leaves the planner.

use crate::config::PlanningConfig;
use crate::error::{AdraError, GenerationError};
use crate::plan::{self, Plan};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything a generator needs to propose sub-tasks for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub query: String,
    pub context: Option<String>,
    /// Fully rendered planning prompt.
    pub prompt: String,
    pub min_subtasks: usize,
    pub max_subtasks: usize,
}

/// Source of candidate sub-task text.
#[async_trait]
pub trait SubtaskGenerator: Send + Sync {
    /// Propose sub-tasks for the request. Output is validated by the caller.
    async fn generate(&self, request: &PlanningRequest) -> Result<Vec<String>, GenerationError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Deterministic generator producing a generic research workflow.
#[derive(Debug, Clone, Default)]
pub struct TemplateSubtaskGenerator;

impl TemplateSubtaskGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The template sub-tasks for a query, sized to the request bounds.
    pub fn subtasks_for(&self, query: &str, min_subtasks: usize, max_subtasks: usize) -> Vec<String> {
        let topic: String = query.chars().take(50).collect();
        let mut subtasks = vec![
            format!("Review the fundamental concepts and background related to {topic}."),
            "Identify the key challenges and research gaps in the existing literature.".to_string(),
            "Examine the primary methodologies and approaches used in recent studies.".to_string(),
            "Analyze the main findings and results from relevant research papers.".to_string(),
            "Explore potential applications and future research directions in this area."
                .to_string(),
            "Compare different theoretical frameworks and their effectiveness in addressing problems."
                .to_string(),
            "Synthesize insights from multiple sources to identify common patterns.".to_string(),
        ];

        if subtasks.len() < min_subtasks {
            subtasks.extend([
                "Evaluate the limitations and constraints of current approaches.".to_string(),
                "Investigate emerging trends and novel techniques in the field.".to_string(),
            ]);
        }

        subtasks.truncate(max_subtasks);
        subtasks
    }
}

#[async_trait]
impl SubtaskGenerator for TemplateSubtaskGenerator {
    async fn generate(&self, request: &PlanningRequest) -> Result<Vec<String>, GenerationError> {
        Ok(self.subtasks_for(&request.query, request.min_subtasks, request.max_subtasks))
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Turns queries into plans within configured sub-task bounds.
#[derive(Clone)]
pub struct Planner {
    config: PlanningConfig,
    generator: Arc<dyn SubtaskGenerator>,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("config", &self.config)
            .field("generator", &self.generator.name())
            .finish()
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlanningConfig::default())
    }
}

impl Planner {
    pub fn new(config: PlanningConfig) -> Self {
        Self {
            config,
            generator: Arc::new(TemplateSubtaskGenerator::new()),
        }
    }

    /// Replace the sub-task generator.
    pub fn with_generator(mut self, generator: Arc<dyn SubtaskGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// Produce a validated plan for `query`.
    ///
    /// Fails with [`AdraError::Validation`] when the generated sub-tasks break the plan
    /// contract, or [`AdraError::Generation`] when the backend fails.
    pub async fn plan(&self, query: &str, context: Option<&str>) -> Result<Plan, AdraError> {
        let request = PlanningRequest {
            query: query.to_string(),
            context: context.map(str::to_string),
            prompt: self.planning_prompt(query),
            min_subtasks: self.config.min_subtasks,
            max_subtasks: self.config.max_subtasks,
        };

        let subtasks = self.generator.generate(&request).await?;
        let plan = Plan::with_bounds(subtasks, self.config.min_subtasks, self.config.max_subtasks)
            .inspect_err(|e| {
                tracing::warn!(
                    generator = self.generator.name(),
                    error = %e,
                    "Generated plan failed validation"
                );
            })?;

        tracing::info!(
            generator = self.generator.name(),
            subtasks = plan.len(),
            "Plan produced"
        );
        Ok(plan)
    }

    /// Non-failing check of candidate sub-tasks against the plan contract.
    pub fn validate_plan<S: AsRef<str>>(&self, subtasks: &[S]) -> bool {
        plan::validate_subtasks(subtasks, self.config.min_subtasks, self.config.max_subtasks)
            .is_ok()
    }

    /// Strategic planning prompt for a language-model backend.
    pub fn planning_prompt(&self, query: &str) -> String {
        format!(
            "You are an expert research strategist. Your task is to decompose the following research question into a comprehensive, high-level research plan.

Research Question: {query}

Requirements:
1. Generate {min}-{max} ordered sub-tasks
2. Each sub-task must be 8-20 words and a complete sentence
3. Focus on STRATEGIC, high-level tasks (not tactical details)
4. Ensure COMPREHENSIVE coverage (high Recall)
5. Avoid citations, dataset numbers, or figure references
6. Sub-tasks should be coarse-grained conceptual steps

Examples of GOOD sub-tasks:
- \"Review the fundamental theoretical frameworks underlying neural architecture search.\"
- \"Identify key challenges in scaling transformer models to longer contexts.\"
- \"Examine recent advances in few-shot learning for natural language tasks.\"

Examples of BAD sub-tasks:
- \"Read paper [23] about transformers.\" (too specific, has citation)
- \"Look at dataset 5.\" (too low-level, has dataset number)
- \"Review transformers.\" (too brief, under 8 words)

Generate the research plan now, with each sub-task on a new line, numbered.",
            min = self.config.min_subtasks,
            max = self.config.max_subtasks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanValidationError;

    struct FixedGenerator(Vec<String>);

    #[async_trait]
    impl SubtaskGenerator for FixedGenerator {
        async fn generate(&self, _: &PlanningRequest) -> Result<Vec<String>, GenerationError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl SubtaskGenerator for FailingGenerator {
        async fn generate(&self, _: &PlanningRequest) -> Result<Vec<String>, GenerationError> {
            Err(GenerationError::Unavailable("offline".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_plan_default_bounds() {
        let planner = Planner::default();
        let plan = planner
            .plan("What are the latest advances in transformer architectures?", None)
            .await
            .unwrap();
        assert!((5..=10).contains(&plan.len()));
        assert_eq!(plan.len(), 7);
        for task in plan.iter() {
            let words = task.split_whitespace().count();
            assert!((8..=20).contains(&words), "{task}");
            assert!(task.ends_with(['.', '!', '?']));
        }
    }

    #[tokio::test]
    async fn test_plan_first_subtask_embeds_query_prefix() {
        let planner = Planner::default();
        let query = "How do graph neural networks generalise across molecular property prediction tasks";
        let plan = planner.plan(query, None).await.unwrap();
        let prefix: String = query.chars().take(50).collect();
        assert!(plan.subtasks()[0].contains(&prefix));
        assert!(!plan.subtasks()[0].contains("tasks"));
    }

    #[tokio::test]
    async fn test_plan_respects_bounds() {
        let planner = Planner::new(PlanningConfig {
            min_subtasks: 5,
            max_subtasks: 6,
        });
        let plan = planner.plan("Quantum error correction codes", None).await.unwrap();
        assert_eq!(plan.len(), 6);

        let planner = Planner::new(PlanningConfig {
            min_subtasks: 8,
            max_subtasks: 10,
        });
        let plan = planner.plan("Quantum error correction codes", None).await.unwrap();
        assert_eq!(plan.len(), 9);
    }

    #[tokio::test]
    async fn test_plan_rejects_invalid_generation() {
        let planner = Planner::default().with_generator(Arc::new(FixedGenerator(vec![
            "Review transformers.".into(),
        ])));
        let err = planner.plan("anything", None).await.unwrap_err();
        assert!(matches!(
            err,
            AdraError::Validation(PlanValidationError::TooFewWords { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_plan_propagates_generation_failure() {
        let planner = Planner::default().with_generator(Arc::new(FailingGenerator));
        let err = planner.plan("anything", None).await.unwrap_err();
        assert!(matches!(err, AdraError::Generation(_)));
    }

    #[test]
    fn test_validate_plan() {
        let planner = Planner::default();
        let good = TemplateSubtaskGenerator::new().subtasks_for("neural search", 5, 10);
        assert!(planner.validate_plan(good.as_slice()));
        assert!(!planner.validate_plan(&good[..3]));
        let cited = vec!["Read paper [23] about transformers and their many variants."; 5];
        assert!(!planner.validate_plan(cited.as_slice()));
    }

    #[test]
    fn test_planning_prompt() {
        let planner = Planner::default();
        let prompt = planner.planning_prompt("What is RLHF?");
        assert!(prompt.contains("Research Question: What is RLHF?"));
        assert!(prompt.contains("Generate 5-10 ordered sub-tasks"));
        assert!(prompt.contains("8-20 words"));
        assert!(prompt.contains("complete sentence"));
    }
}
