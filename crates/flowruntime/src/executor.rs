use crate::catalog::NodeCatalog;
use crate::registry::NodeRegistry;
use flowcore::{
    DisabledEvaluator, ExecutionContext, ExecutionMode, ExecutionObserver, ExecutionStatus,
    ExpressionEvaluator, FlowError, NodeError, NodeExecution, Value, Workflow, WorkflowEdge,
    WorkflowError, WorkflowExecution, WorkflowNode,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Default bound on how many edges deep a single traversal may go.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Walks a workflow graph depth-first from its trigger nodes, one node at a
/// time, and produces the run record.
pub struct WorkflowExecutor {
    catalog: Arc<NodeCatalog>,
    registry: Arc<NodeRegistry>,
    evaluator: Arc<dyn ExpressionEvaluator>,
    observer: Option<Arc<dyn ExecutionObserver>>,
    max_depth: usize,
    enforce_timeout: bool,
}

/// Per-call options for [`WorkflowExecutor::execute`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Value handed to every trigger node. `Null` means no input.
    pub input: Value,
    pub mode: ExecutionMode,
    pub triggered_by: Option<String>,
    /// Fixed id for the run record; generated when absent.
    pub execution_id: Option<String>,
    pub cancellation: CancellationToken,
}

impl RunOptions {
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_execution_id(mut self, id: impl Into<String>) -> Self {
        self.execution_id = Some(id.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

impl WorkflowExecutor {
    pub fn new(catalog: Arc<NodeCatalog>, registry: Arc<NodeRegistry>) -> Self {
        Self {
            catalog,
            registry,
            evaluator: Arc::new(DisabledEvaluator),
            observer: None,
            max_depth: DEFAULT_MAX_DEPTH,
            enforce_timeout: true,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Disable the whole-run deadline taken from `settings.executionTimeout`.
    pub fn without_timeout(mut self) -> Self {
        self.enforce_timeout = false;
        self
    }

    /// Execute a workflow and return its run record.
    ///
    /// Failures never surface as `Err`: configuration problems, exhausted
    /// retries, timeouts and cancellation all end up as the record's status
    /// and `error` message.
    pub async fn execute(&self, workflow: &Workflow, options: RunOptions) -> WorkflowExecution {
        let mut execution = WorkflowExecution::new(workflow, options.mode);
        if let Some(id) = options.execution_id {
            execution.id = id;
        }
        execution.triggered_by = options.triggered_by;

        let context = ExecutionContext::new(workflow.id.clone(), execution.id.clone())
            .with_evaluator(self.evaluator.clone())
            .with_cancellation(options.cancellation.clone());

        let mut run = Run {
            executor: self,
            workflow,
            execution,
            context,
        };

        tracing::info!(
            "Starting workflow execution: {} ({})",
            workflow.id,
            run.execution.id
        );
        run.execution.status = ExecutionStatus::Running;
        run.notify();

        let timeout_secs = workflow.settings.execution_timeout;
        let deadline = (self.enforce_timeout && timeout_secs > 0)
            .then(|| Duration::from_secs(timeout_secs));

        let outcome = {
            let traversal = run.traverse(options.input);
            tokio::pin!(traversal);
            tokio::select! {
                biased;
                _ = options.cancellation.cancelled() => Err(FlowError::Cancelled),
                _ = wait_for(deadline) => Err(FlowError::Timeout { seconds: timeout_secs }),
                result = &mut traversal => result,
            }
        };

        run.finish(outcome)
    }
}

async fn wait_for(deadline: Option<Duration>) {
    match deadline {
        Some(duration) => sleep(duration).await,
        None => std::future::pending().await,
    }
}

/// One pending dispatch on the work stack.
struct Visit {
    node_id: String,
    input: Value,
    attempt: u32,
    depth: usize,
}

/// State of a single run. Owned by one `execute` call and dropped with it.
struct Run<'a> {
    executor: &'a WorkflowExecutor,
    workflow: &'a Workflow,
    execution: WorkflowExecution,
    context: ExecutionContext,
}

impl Run<'_> {
    fn notify(&self) {
        if let Some(observer) = &self.executor.observer {
            observer.on_update(self.execution.clone());
        }
    }

    /// Depth-first dispatch using an explicit stack. Children are pushed in
    /// reverse edge order so they pop in declaration order, which yields the
    /// same visitation order as recursive dispatch.
    async fn traverse(&mut self, initial_input: Value) -> Result<(), FlowError> {
        let workflow = self.workflow;
        let triggers = workflow.trigger_nodes();
        if triggers.is_empty() {
            return Err(WorkflowError::NoTriggerNode.into());
        }

        let mut outgoing: HashMap<&str, Vec<&WorkflowEdge>> = HashMap::new();
        for edge in &workflow.edges {
            outgoing.entry(edge.source.as_str()).or_default().push(edge);
        }

        let mut stack: Vec<Visit> = triggers
            .iter()
            .rev()
            .map(|node| Visit {
                node_id: node.id.clone(),
                input: initial_input.clone(),
                attempt: 0,
                depth: 0,
            })
            .collect();

        while let Some(visit) = stack.pop() {
            if visit.depth > self.executor.max_depth {
                return Err(WorkflowError::DepthExceeded(self.executor.max_depth).into());
            }

            let Some(node) = workflow.find_node(&visit.node_id) else {
                tracing::warn!("Skipping edge to unknown node {}", visit.node_id);
                continue;
            };

            let Some(output) = self.dispatch(node, &visit).await? else {
                // Failed attempt with retries left.
                let delay = workflow.settings.retry_delay_ms;
                if delay > 0 {
                    sleep(Duration::from_millis(delay)).await;
                }
                stack.push(Visit {
                    attempt: visit.attempt + 1,
                    ..visit
                });
                continue;
            };

            let routing = self
                .executor
                .registry
                .get(&node.definition_id)
                .map(|implementation| implementation.routing())
                .unwrap_or(flowcore::Routing::FanOut);

            let selected: Vec<&WorkflowEdge> = outgoing
                .get(visit.node_id.as_str())
                .map(|edges| {
                    edges
                        .iter()
                        .copied()
                        .filter(|edge| routing.selects(&output, edge))
                        .collect()
                })
                .unwrap_or_default();

            tracing::debug!(
                "Node {} routes to {:?}",
                visit.node_id,
                selected.iter().map(|e| e.target.as_str()).collect::<Vec<_>>()
            );

            for edge in selected.into_iter().rev() {
                stack.push(Visit {
                    node_id: edge.target.clone(),
                    input: output.clone(),
                    attempt: 0,
                    depth: visit.depth + 1,
                });
            }
        }

        Ok(())
    }

    /// Run one attempt of one node.
    ///
    /// `Ok(Some(output))` on success, `Ok(None)` when the attempt failed but
    /// may be retried, `Err` when the run must abort.
    async fn dispatch(
        &mut self,
        node: &WorkflowNode,
        visit: &Visit,
    ) -> Result<Option<Value>, FlowError> {
        let executor = self.executor;
        let definition = executor
            .catalog
            .get(&node.definition_id)
            .ok_or_else(|| WorkflowError::UnknownDefinition(node.definition_id.clone()))?;

        let index = self.execution.node_executions.len();
        self.execution.node_executions.push(NodeExecution::start(
            &node.id,
            visit.input.clone(),
            visit.attempt,
        ));
        self.notify();

        let Some(implementation) = executor.registry.get(&node.definition_id) else {
            let err = WorkflowError::NoExecutor(node.definition_id.clone());
            self.execution.node_executions[index].fail(ExecutionStatus::Error, err.to_string());
            self.notify();
            return Err(err.into());
        };

        let mut resolved = node.clone();
        resolved.data.parameters = definition.resolve_parameters(&node.data.parameters);

        match implementation
            .execute(&resolved, &visit.input, &self.context)
            .await
        {
            Ok(output) => {
                self.context.record_output(&node.id, output.clone());
                let record = &mut self.execution.node_executions[index];
                record.succeed(output.clone());
                tracing::info!("Node {} completed in {}ms", node.id, record.duration.unwrap_or(0));
                self.notify();
                Ok(Some(output))
            }
            Err(NodeError::Cancelled) => {
                self.execution.node_executions[index]
                    .fail(ExecutionStatus::Cancelled, FlowError::Cancelled.to_string());
                self.notify();
                Err(FlowError::Cancelled)
            }
            Err(err) => {
                let message = err.to_string();
                self.execution.node_executions[index].fail(ExecutionStatus::Error, &message);
                self.notify();

                let max_retries = self.workflow.settings.max_retries;
                if visit.attempt < max_retries {
                    tracing::warn!(
                        "Node {} failed (attempt {}/{}): {}",
                        node.id,
                        visit.attempt + 1,
                        max_retries + 1,
                        message
                    );
                    Ok(None)
                } else {
                    tracing::error!("Node {} failed: {}", node.id, message);
                    Err(err.into())
                }
            }
        }
    }

    fn finish(mut self, outcome: Result<(), FlowError>) -> WorkflowExecution {
        match outcome {
            Ok(()) => self.execution.finish(ExecutionStatus::Success, None),
            Err(err) => {
                let status = match err {
                    FlowError::Cancelled => ExecutionStatus::Cancelled,
                    _ => ExecutionStatus::Error,
                };
                let message = err.to_string();
                // A node interrupted by a timeout or cancellation is still marked running.
                for record in &mut self.execution.node_executions {
                    if record.status == ExecutionStatus::Running {
                        record.fail(status, message.clone());
                    }
                }
                self.execution.finish(status, Some(message));
            }
        }

        tracing::info!(
            "Workflow execution {} finished: {} in {}ms",
            self.execution.id,
            self.execution.status,
            self.execution.duration.unwrap_or(0)
        );
        self.notify();
        self.execution
    }
}
