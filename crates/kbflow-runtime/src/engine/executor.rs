//! Workflow execution engine.

use std::sync::Arc;

use jiff::Timestamp;
use kbflow_core::AiServices;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::{
    ContextConflict, EngineConfig, NodeOutput, NodeRecord, RunContext, RunReport, TRACING_TARGET,
};
use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{NodeId, NodeKind, WorkflowDefinition, WorkflowGraph};
use crate::node::executor_for;

/// The workflow execution engine.
///
/// Validates definitions, orders their nodes and runs them one at a time
/// against the injected [`AiServices`]. Any number of runs may share one
/// engine; each run owns its own context.
pub struct Engine {
    config: EngineConfig,
    services: AiServices,
    semaphore: Arc<Semaphore>,
}

impl Engine {
    /// Creates a new engine with the given configuration and services.
    pub fn new(config: EngineConfig, services: AiServices) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_runs));

        tracing::info!(
            target: TRACING_TARGET,
            max_concurrent_runs = config.max_concurrent_runs,
            default_timeout_ms = config.default_timeout.map(|t| t.as_millis() as u64),
            "Workflow engine initialized"
        );

        Self {
            config,
            services,
            semaphore,
        }
    }

    /// Creates a new engine with default configuration.
    pub fn with_defaults(services: AiServices) -> Self {
        Self::new(EngineConfig::default(), services)
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the number of available execution slots.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Validates a workflow definition without running it.
    pub fn validate(&self, definition: &WorkflowDefinition) -> WorkflowResult<()> {
        definition.validate()
    }

    /// Runs a workflow and returns the final answer.
    pub async fn run(&self, definition: &WorkflowDefinition, query: &str) -> WorkflowResult<String> {
        Ok(self.execute(definition, query).await?.answer)
    }

    /// Runs a workflow that can be cancelled through `cancel`.
    pub async fn run_with_cancellation(
        &self,
        definition: &WorkflowDefinition,
        query: &str,
        cancel: CancellationToken,
    ) -> WorkflowResult<String> {
        Ok(self
            .execute_with_cancellation(definition, query, cancel)
            .await?
            .answer)
    }

    /// Runs a workflow and returns the full report.
    pub async fn execute(
        &self,
        definition: &WorkflowDefinition,
        query: &str,
    ) -> WorkflowResult<RunReport> {
        self.execute_with_cancellation(definition, query, CancellationToken::new())
            .await
    }

    /// Runs a workflow that can be cancelled and returns the full report.
    ///
    /// The definition is validated before any node runs. The configured
    /// deadline, if any, covers node execution only.
    pub async fn execute_with_cancellation(
        &self,
        definition: &WorkflowDefinition,
        query: &str,
        cancel: CancellationToken,
    ) -> WorkflowResult<RunReport> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| WorkflowError::Internal(format!("semaphore closed: {}", e)))?;

        let graph = WorkflowGraph::validated(definition)?;
        let order = graph.topological_order()?;

        let run_id = Uuid::now_v7();
        let span = tracing::info_span!(
            target: TRACING_TARGET,
            "workflow_run",
            run_id = %run_id,
            node_count = order.len(),
        );

        let run = self
            .execute_nodes(run_id, &graph, order, query, &cancel)
            .instrument(span);

        let deadline = async {
            match self.config.default_timeout {
                Some(limit) => match tokio::time::timeout(limit, run).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            run_id = %run_id,
                            timeout_ms = limit.as_millis() as u64,
                            "Workflow execution timed out"
                        );
                        Err(WorkflowError::Timeout)
                    }
                },
                None => run.await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    run_id = %run_id,
                    "Workflow execution cancelled"
                );
                Err(WorkflowError::Cancelled)
            }
            result = deadline => result,
        }
    }

    async fn execute_nodes(
        &self,
        run_id: Uuid,
        graph: &WorkflowGraph,
        order: Vec<NodeId>,
        query: &str,
        cancel: &CancellationToken,
    ) -> WorkflowResult<RunReport> {
        let started_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET,
            node_count = order.len(),
            "Starting workflow execution"
        );

        let mut context = RunContext::new(query);
        let mut outputs = Vec::with_capacity(order.len());
        let mut conflicts = Vec::new();

        for node_id in &order {
            if cancel.is_cancelled() {
                return Err(WorkflowError::Cancelled);
            }

            let node = graph.node(node_id).ok_or_else(|| {
                WorkflowError::Internal(format!("scheduled node {node_id} is not in the graph"))
            })?;

            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %node_id,
                kind = %node.kind,
                "Executing node"
            );

            let outcome = executor_for(&node.kind)
                .execute(node, &context, &self.services)
                .await?;

            for field in outcome.patch.fields() {
                let Some(previous) = context.writer(field) else {
                    continue;
                };
                if graph.is_ancestor(previous, node_id) {
                    continue;
                }
                tracing::warn!(
                    target: TRACING_TARGET,
                    field = %field,
                    previous_writer = %previous,
                    writer = %node_id,
                    "Context field overwritten by a parallel branch"
                );
                conflicts.push(ContextConflict {
                    field,
                    previous_writer: previous.clone(),
                    writer: node_id.clone(),
                });
            }

            context = context.merge(node_id, outcome.patch);

            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %node_id,
                output_keys = outcome.output.as_map().len(),
                "Node completed"
            );

            outputs.push(NodeRecord {
                node_id: node_id.clone(),
                kind: node.kind.clone(),
                output: outcome.output,
            });
        }

        let answer = graph
            .first_of_kind(&NodeKind::Output)
            .and_then(|node| outputs.iter().find(|record| record.node_id == node.id))
            .and_then(|record| record.output.get_str(NodeOutput::FINAL_RESPONSE))
            .unwrap_or_default()
            .to_owned();

        let finished_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET,
            answer_len = answer.len(),
            conflict_count = conflicts.len(),
            "Workflow execution completed"
        );

        Ok(RunReport {
            run_id,
            answer,
            order,
            outputs,
            context,
            conflicts,
            started_at,
            finished_at,
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("available_slots", &self.available_slots())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use kbflow_core::generation::{
        GenerationProvider, GenerationRequest, GenerationResponse, GenerationService,
    };
    use kbflow_core::mock::{MockConfig, MockGeneration, MockProvider, MockRetrievalFailure};
    use kbflow_core::retrieval::RetrievalService;

    use super::*;
    use crate::engine::ContextField;
    use crate::error::ValidationError;
    use crate::graph::Node;

    fn linear() -> WorkflowDefinition {
        WorkflowDefinition::new()
            .with_node(Node::user_query("1"))
            .with_node(Node::knowledge_base("2"))
            .with_node(Node::llm_engine("3"))
            .with_node(Node::output("4"))
            .with_edge("1", "2")
            .with_edge("2", "3")
            .with_edge("3", "4")
    }

    fn echo_engine() -> (Engine, MockProvider) {
        let mock = MockProvider::echoing(["X is a letter."], "X is the 24th letter.");
        let engine = Engine::with_defaults(mock.clone().into_services());
        (engine, mock)
    }

    #[tokio::test]
    async fn linear_pipeline_returns_generated_answer() {
        let (engine, mock) = echo_engine();

        let answer = engine.run(&linear(), "What is X?").await.unwrap();
        assert_eq!(answer, "X is the 24th letter.");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].prompt.contains("Context: X is a letter."));
        assert_eq!(
            mock.collections_requested(),
            vec!["knowledge_base".to_owned()]
        );
    }

    #[tokio::test]
    async fn query_straight_to_output_returns_empty_answer() {
        let (engine, mock) = echo_engine();
        let definition = WorkflowDefinition::new()
            .with_node(Node::user_query("1"))
            .with_node(Node::output("2"))
            .with_edge("1", "2");

        assert_eq!(engine.run(&definition, "q").await.unwrap(), "");
        assert!(mock.prompts().is_empty());
    }

    #[tokio::test]
    async fn report_records_every_node() {
        let (engine, _) = echo_engine();

        let report = engine.execute(&linear(), "What is X?").await.unwrap();
        let order: Vec<_> = report.order.iter().map(NodeId::as_str).collect();
        assert_eq!(order, ["1", "2", "3", "4"]);
        assert_eq!(report.outputs.len(), 4);
        let query = report.output(&"1".into()).unwrap();
        assert_eq!(query.get_str(NodeOutput::QUERY), Some("What is X?"));
        assert_eq!(
            report.context.kb_docs(),
            Some(&["X is a letter.".to_owned()][..])
        );
        assert_eq!(report.context.llm_response(), Some("X is the 24th letter."));
        assert!(report.conflicts.is_empty());
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn unknown_nodes_do_not_stop_the_run() {
        let (engine, _) = echo_engine();
        let definition = linear()
            .with_node(Node::new("note", "Unknown"))
            .with_edge("2", "note")
            .with_edge("note", "3");

        let report = engine.execute(&definition, "What is X?").await.unwrap();
        assert!(report.output(&"note".into()).unwrap().is_empty());
        assert_eq!(report.answer, "X is the 24th letter.");
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let (engine, _) = echo_engine();
        let definition = linear();

        let first = engine.execute(&definition, "What is X?").await.unwrap();
        let second = engine.execute(&definition, "What is X?").await.unwrap();
        assert_eq!(first.answer, second.answer);
        assert_eq!(first.order, second.order);
        assert_eq!(first.outputs, second.outputs);
        assert_ne!(first.run_id, second.run_id);
    }

    #[tokio::test]
    async fn invalid_definition_fails_before_any_call() {
        let (engine, mock) = echo_engine();
        let definition = linear().with_edge("4", "1");

        let error = engine.run(&definition, "q").await.unwrap_err();
        assert!(matches!(
            error,
            WorkflowError::Validation(ValidationError::CyclicGraph)
        ));
        assert!(mock.collections_requested().is_empty());
        assert!(mock.prompts().is_empty());
        assert!(engine.validate(&definition).is_err());
    }

    #[tokio::test]
    async fn first_declared_output_supplies_answer() {
        let (engine, _) = echo_engine();
        let definition = WorkflowDefinition::new()
            .with_node(Node::output("late"))
            .with_node(Node::user_query("q"))
            .with_node(Node::llm_engine("llm"))
            .with_node(Node::output("early"))
            .with_edge("q", "early")
            .with_edge("early", "llm")
            .with_edge("llm", "late");

        // "early" runs before any response exists; "late" is declared first.
        let report = engine.execute(&definition, "q").await.unwrap();
        assert_eq!(report.answer, "X is the 24th letter.");
        let early = report.output(&"early".into()).unwrap();
        assert_eq!(early.get_str(NodeOutput::FINAL_RESPONSE), Some(""));
    }

    #[tokio::test]
    async fn parallel_writers_record_conflict() {
        let mock = MockProvider::new(MockConfig {
            collections: HashMap::from([
                ("alpha".to_owned(), vec!["from alpha".to_owned()]),
                ("beta".to_owned(), vec!["from beta".to_owned()]),
            ]),
            ..MockConfig::default()
        });
        let engine = Engine::with_defaults(mock.clone().into_services());
        let definition = WorkflowDefinition::new()
            .with_node(Node::user_query("q"))
            .with_node(Node::knowledge_base("kb_a").with_config("collectionName", "alpha"))
            .with_node(Node::knowledge_base("kb_b").with_config("collectionName", "beta"))
            .with_node(Node::llm_engine("llm"))
            .with_node(Node::output("out"))
            .with_edge("q", "kb_a")
            .with_edge("q", "kb_b")
            .with_edge("kb_a", "llm")
            .with_edge("kb_b", "llm")
            .with_edge("llm", "out");

        let report = engine.execute(&definition, "q").await.unwrap();
        assert_eq!(
            report.conflicts,
            vec![ContextConflict {
                field: ContextField::KbDocs,
                previous_writer: "kb_a".into(),
                writer: "kb_b".into(),
            }]
        );
        assert_eq!(
            report.context.kb_docs(),
            Some(&["from beta".to_owned()][..])
        );
        assert!(mock.prompts()[0].prompt.contains("Context: from beta"));
    }

    #[tokio::test]
    async fn chained_writers_do_not_conflict() {
        let (engine, _) = echo_engine();
        let definition = linear()
            .with_node(Node::knowledge_base("refine").with_config("k", 1))
            .with_edge("2", "refine")
            .with_edge("refine", "3");

        let report = engine.execute(&definition, "q").await.unwrap();
        assert!(report.conflicts.is_empty());
        assert_eq!(
            report.context.writer(ContextField::KbDocs),
            Some(&NodeId::from("refine"))
        );
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_run() {
        let (engine, mock) = echo_engine();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = engine
            .run_with_cancellation(&linear(), "q", cancel)
            .await
            .unwrap_err();
        assert!(matches!(error, WorkflowError::Cancelled));
        assert!(mock.prompts().is_empty());
    }

    struct SlowGeneration;

    #[async_trait::async_trait]
    impl GenerationProvider for SlowGeneration {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> kbflow_core::Result<GenerationResponse> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(GenerationResponse::new(request.prompt.clone()))
        }
    }

    fn slow_services() -> AiServices {
        AiServices::new(
            RetrievalService::new(MockProvider::default()),
            GenerationService::new(SlowGeneration),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_times_out() {
        let config = EngineConfig::builder()
            .with_default_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let engine = Engine::new(config, slow_services());

        let error = engine.run(&linear(), "q").await.unwrap_err();
        assert!(matches!(error, WorkflowError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_in_flight_node() {
        let engine = Engine::with_defaults(slow_services());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let error = engine
            .run_with_cancellation(&linear(), "q", cancel)
            .await
            .unwrap_err();
        assert!(matches!(error, WorkflowError::Cancelled));
    }

    #[tokio::test]
    async fn permits_are_released_after_runs() {
        let (engine, _) = echo_engine();
        assert_eq!(engine.available_slots(), 10);
        engine.run(&linear(), "q").await.unwrap();
        assert_eq!(engine.available_slots(), 10);
    }

    #[tokio::test]
    async fn retrieval_failure_aborts_before_generation() {
        let mock = MockProvider::new(MockConfig {
            documents: vec!["X is a letter.".into()],
            retrieval_failure: MockRetrievalFailure::All,
            ..MockConfig::default()
        });
        let engine = Engine::with_defaults(mock.clone().into_services());

        let error = engine.execute(&linear(), "What is X?").await.unwrap_err();
        match error {
            WorkflowError::Retrieval {
                node_id,
                collection,
                ..
            } => {
                assert_eq!(node_id.as_str(), "2");
                assert_eq!(collection, "knowledge_base");
            }
            other => panic!("expected retrieval error, got {other:?}"),
        }

        assert_eq!(mock.queries().len(), 2);
        assert!(mock.prompts().is_empty());
        assert_eq!(engine.available_slots(), 10);
    }

    #[tokio::test]
    async fn generation_failure_yields_no_answer() {
        let mock = MockProvider::new(MockConfig {
            documents: vec!["X is a letter.".into()],
            generation: MockGeneration::Fail,
            ..MockConfig::default()
        });
        let engine = Engine::with_defaults(mock.clone().into_services());

        let error = engine.run(&linear(), "What is X?").await.unwrap_err();
        match error {
            WorkflowError::Generation { node_id, .. } => assert_eq!(node_id.as_str(), "3"),
            other => panic!("expected generation error, got {other:?}"),
        }

        assert_eq!(mock.queries().len(), 1);
        assert_eq!(mock.prompts().len(), 1);
        assert_eq!(engine.available_slots(), 10);
    }
}
