//! Integration tests for the research pipeline.
//!
//! Each test drives a [`ResearchOrchestrator`] through one of its modes against a small
//! in-memory corpus and checks the stage outputs and run metadata.

use std::sync::Arc;

use adra_core::config::{AdraConfig, PlanningConfig};
use adra_core::{
    AdraError, CorpusDocument, Domain, EvidenceItem, GenerationError, OrchestratorError,
    PipelineMode, Plan, Planner, Reasoner, ResearchOrchestrator, ResearchRequest, Retriever,
    SubtaskGenerator,
};
use adra_core::planner::PlanningRequest;
use async_trait::async_trait;
use pretty_assertions::assert_eq;

/// Three dated papers on language models, all past the default temporal cutoff.
fn sample_corpus() -> Vec<CorpusDocument> {
    vec![
        CorpusDocument::new(
            "paper1",
            "Advances in Deep Learning for Natural Language Processing",
            "This paper reviews the recent advances in deep learning and the methodologies \
             used for natural language processing tasks.",
        )
        .with_date("2025-04-15"),
        CorpusDocument::new(
            "paper2",
            "Neural Architecture Search Methods",
            "We examine the approaches and results of neural architecture search in recent studies.",
        )
        .with_date("2025-05-20"),
        CorpusDocument::new(
            "paper3",
            "Efficient Training of Large Language Models",
            "The main findings show efficient training methods and future research directions \
             in this area.",
        )
        .with_date("2025-06-10"),
    ]
}

fn gold_plan() -> Plan {
    Plan::new(vec![
        "Review fundamental concepts and principles in the field of study.".to_string(),
        "Identify key challenges and significant research gaps to address.".to_string(),
        "Examine various methodologies and approaches used in recent research studies."
            .to_string(),
        "Analyze main findings and key results from relevant published papers.".to_string(),
        "Explore future directions and identify potential applications in practice.".to_string(),
    ])
    .expect("gold plan is valid")
}

fn gold_evidence() -> Vec<EvidenceItem> {
    vec![EvidenceItem::new(
        "g1",
        "Language Models Are Few-Shot Learners",
        "Large language models demonstrate strong few-shot learning capabilities.",
        1.0,
    )]
}

const QUERY: &str = "What are the latest advances in deep learning for language processing?";

#[tokio::test]
async fn test_end_to_end_runs_every_stage() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("end-to-end")?;
    let request = ResearchRequest::new(QUERY)
        .with_corpus(sample_corpus())
        .with_domain(Domain::General);

    let result = orchestrator.execute_research(request).await?;

    assert_eq!(result.mode, PipelineMode::EndToEnd);
    assert_eq!(result.query, QUERY);
    assert!(result.plan.len() >= 5);
    assert!(!result.evidence.is_empty());
    assert_eq!(result.metadata.pipeline_complete, Some(true));
    assert_eq!(result.metadata.retrieval.len(), result.plan.len());
    assert_eq!(result.synthesis.citations.len(), result.evidence.len());
    assert!(result.synthesis.token_count > 100);

    let report = &result.synthesis.report;
    for heading in ["Background", "Problem", "Methodology", "Results", "Future"] {
        assert!(report.contains(heading), "missing section {heading}");
    }
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_deduplicates_evidence() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("end-to-end")?;
    let result = orchestrator
        .execute_research(ResearchRequest::new(QUERY).with_corpus(sample_corpus()))
        .await?;

    let mut ids: Vec<&str> = result.evidence.iter().map(|e| e.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_without_corpus_has_no_evidence() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("end-to-end")?;
    let result = orchestrator.execute_research(ResearchRequest::new(QUERY)).await?;

    assert!(result.evidence.is_empty());
    assert!(result.metadata.retrieval.is_empty());
    assert!(!result.synthesis.ungrounded_claims.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_isolated_planning_uses_gold_evidence() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("isolated_planning")?;
    let request = ResearchRequest::new("Test query for planning?").with_gold_evidence(gold_evidence());

    let result = orchestrator.execute_research(request).await?;

    assert_eq!(result.mode, PipelineMode::IsolatedPlanning);
    assert_eq!(result.metadata.used_gold_evidence, Some(true));
    assert_eq!(result.evidence, gold_evidence());
    assert!(result.plan.len() >= 5);
    Ok(())
}

#[tokio::test]
async fn test_isolated_planning_without_gold_evidence() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("isolated_planning")?;
    let result = orchestrator
        .execute_research(ResearchRequest::new("Test query for planning?"))
        .await?;

    assert_eq!(result.metadata.used_gold_evidence, Some(false));
    assert!(result.evidence.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_isolated_retrieval_keeps_gold_plan() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("isolated_retrieval")?;
    let request = ResearchRequest::new(QUERY)
        .with_corpus(sample_corpus())
        .with_gold_plan(gold_plan());

    let result = orchestrator.execute_research(request).await?;

    assert_eq!(result.mode, PipelineMode::IsolatedRetrieval);
    assert_eq!(result.plan, gold_plan());
    assert_eq!(result.metadata.used_gold_plan, Some(true));
    assert_eq!(result.metadata.retrieval.len(), 5);
    assert!(!result.evidence.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_isolated_retrieval_requires_gold_plan() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("isolated_retrieval")?;
    let err = orchestrator
        .execute_research(ResearchRequest::new(QUERY).with_corpus(sample_corpus()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AdraError::Orchestrator(OrchestratorError::MissingGoldInput { .. })
    ));
    assert!(err.to_string().contains("requires gold_plan"));
    Ok(())
}

#[tokio::test]
async fn test_isolated_reasoning_uses_gold_inputs() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("isolated_reasoning")?;
    let request = ResearchRequest::new("Test query for reasoning?")
        .with_gold_plan(gold_plan())
        .with_gold_evidence(gold_evidence());

    let result = orchestrator.execute_research(request).await?;

    assert_eq!(result.mode, PipelineMode::IsolatedReasoning);
    assert_eq!(result.plan, gold_plan());
    assert_eq!(result.evidence, gold_evidence());
    assert_eq!(result.metadata.used_gold_plan, Some(true));
    assert_eq!(result.metadata.used_gold_evidence, Some(true));
    assert_eq!(result.synthesis.citations.len(), 1);
    assert_eq!(result.synthesis.citations[0].doc_id, "g1");
    Ok(())
}

#[tokio::test]
async fn test_isolated_reasoning_requires_both_gold_inputs() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("isolated_reasoning")?;

    let plan_only = ResearchRequest::new("Q").with_gold_plan(gold_plan());
    let err = orchestrator.execute_research(plan_only).await.unwrap_err();
    assert!(err.to_string().contains("requires gold_plan and gold_evidence"));

    let empty_evidence = ResearchRequest::new("Q")
        .with_gold_plan(gold_plan())
        .with_gold_evidence(Vec::new());
    let err = orchestrator.execute_research(empty_evidence).await.unwrap_err();
    assert!(err.to_string().contains("requires gold_plan and gold_evidence"));
    Ok(())
}

#[tokio::test]
async fn test_mode_switching() -> anyhow::Result<()> {
    let mut orchestrator = ResearchOrchestrator::new("end-to-end")?;
    assert_eq!(orchestrator.mode(), PipelineMode::EndToEnd);

    for mode in ["isolated_planning", "isolated_retrieval", "isolated_reasoning"] {
        orchestrator.set_mode(mode)?;
        assert_eq!(orchestrator.mode().as_str(), mode);
    }

    let err = orchestrator.set_mode("invalid_mode").unwrap_err();
    assert!(err.to_string().contains("Invalid mode"));
    assert_eq!(orchestrator.mode(), PipelineMode::IsolatedReasoning);
    Ok(())
}

#[test]
fn test_invalid_mode_at_construction() {
    let err = ResearchOrchestrator::new("invalid_mode").unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidMode { .. }));
    assert!(err.to_string().contains("Invalid mode: invalid_mode"));
}

#[tokio::test]
async fn test_domain_is_recorded_in_metadata() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("end-to-end")?;
    let corpus = vec![
        CorpusDocument::new(
            "fin1",
            "Risk Management in Financial Markets",
            "This paper discusses risk assessment and portfolio optimization in the market.",
        )
        .with_date("2025-05-01"),
    ];
    let request = ResearchRequest::new("How does risk management work in finance?")
        .with_corpus(corpus)
        .with_domain(Domain::from_tag("finance"));

    let result = orchestrator.execute_research(request).await?;

    assert_eq!(result.metadata.domain, Some(Domain::Finance));
    assert!(!result.synthesis.report.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_corpus_filter_drops_documents_before_cutoff() -> anyhow::Result<()> {
    let mut config = AdraConfig::default();
    config.safety.filter_corpus = true;
    config.safety.temporal_cutoff = "2025-05-01".to_string();
    let orchestrator = ResearchOrchestrator::from_config(config, PipelineMode::IsolatedRetrieval);

    let request = ResearchRequest::new(QUERY)
        .with_corpus(sample_corpus())
        .with_gold_plan(gold_plan());
    let result = orchestrator.execute_research(request).await?;

    assert!(!result.evidence.is_empty());
    assert!(result.evidence.iter().all(|e| e.id != "paper1"));
    Ok(())
}

#[tokio::test]
async fn test_reports_are_identical_across_runs() -> anyhow::Result<()> {
    let orchestrator = ResearchOrchestrator::new("end-to-end")?;
    let run = || ResearchRequest::new(QUERY).with_corpus(sample_corpus());

    let first = orchestrator.execute_research(run()).await?;
    let second = orchestrator.execute_research(run()).await?;

    assert_eq!(first.plan, second.plan);
    assert_eq!(first.synthesis.report, second.synthesis.report);
    assert_eq!(first.synthesis.diagnostic_responses, second.synthesis.diagnostic_responses);
    assert_ne!(first.metadata.run_id, second.metadata.run_id);
    Ok(())
}

/// A generator returning a fixed set of sub-tasks regardless of the query.
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

#[tokio::test]
async fn test_custom_components_drive_the_pipeline() -> anyhow::Result<()> {
    let generator = FixedGenerator(gold_plan().into_subtasks());
    let planner = Planner::new(PlanningConfig::default()).with_generator(Arc::new(generator));
    let orchestrator = ResearchOrchestrator::new("end-to-end")?.with_components(
        planner,
        Retriever::default(),
        Reasoner::default(),
    );

    let result = orchestrator
        .execute_research(ResearchRequest::new(QUERY).with_corpus(sample_corpus()))
        .await?;

    assert_eq!(result.plan, gold_plan());
    Ok(())
}

#[tokio::test]
async fn test_invalid_generated_plan_is_rejected() -> anyhow::Result<()> {
    let generator = FixedGenerator(vec!["Too short.".to_string()]);
    let planner = Planner::default().with_generator(Arc::new(generator));
    let orchestrator = ResearchOrchestrator::new("end-to-end")?.with_components(
        planner,
        Retriever::default(),
        Reasoner::default(),
    );

    let err = orchestrator
        .execute_research(ResearchRequest::new(QUERY))
        .await
        .unwrap_err();
    assert!(matches!(err, AdraError::Validation(_)));
    Ok(())
}
