use crate::catalog::NodeCatalog;
use crate::executor::{RunOptions, WorkflowExecutor, DEFAULT_MAX_DEPTH};
use crate::registry::NodeRegistry;
use crate::store::{ExecutionStore, InMemoryExecutionStore, InMemoryWorkflowStore, WorkflowStore};
use flowcore::{
    DisabledEvaluator, EventBus, ExecutionId, ExecutionStatus, ExpressionEvaluator, FlowError,
    SaveExecutions, Workflow, WorkflowError, WorkflowExecution,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Main runtime for executing workflows
pub struct FlowRuntime {
    catalog: Arc<NodeCatalog>,
    registry: Arc<NodeRegistry>,
    evaluator: Arc<dyn ExpressionEvaluator>,
    event_bus: Arc<EventBus>,
    workflows: Arc<dyn WorkflowStore>,
    executions: Arc<dyn ExecutionStore>,
    running: Arc<RwLock<HashMap<ExecutionId, CancellationToken>>>,
    config: RuntimeConfig,
}

impl FlowRuntime {
    /// Create a runtime with an empty catalog and registry.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_parts(NodeCatalog::new(), NodeRegistry::new(), config)
    }

    /// Create a runtime around a populated catalog and implementation registry.
    pub fn with_parts(catalog: NodeCatalog, registry: NodeRegistry, config: RuntimeConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            registry: Arc::new(registry),
            evaluator: Arc::new(DisabledEvaluator),
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
            workflows: Arc::new(InMemoryWorkflowStore::new()),
            executions: Arc::new(InMemoryExecutionStore::new(config.history_limit)),
            running: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_workflow_store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.workflows = store;
        self
    }

    pub fn with_execution_store(mut self, store: Arc<dyn ExecutionStore>) -> Self {
        self.executions = store;
        self
    }

    pub fn catalog(&self) -> &Arc<NodeCatalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn workflows(&self) -> &Arc<dyn WorkflowStore> {
        &self.workflows
    }

    pub fn executions(&self) -> &Arc<dyn ExecutionStore> {
        &self.executions
    }

    /// Register a workflow
    pub async fn register_workflow(&self, workflow: Workflow) {
        self.workflows.create(workflow).await;
    }

    /// Execute a stored workflow by id
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        options: RunOptions,
    ) -> Result<WorkflowExecution, FlowError> {
        let workflow = self
            .workflows
            .get(workflow_id)
            .await
            .ok_or_else(|| WorkflowError::NotFound(workflow_id.to_string()))?;
        Ok(self.execute(&workflow, options).await)
    }

    /// Execute a workflow directly (without registration)
    pub async fn execute(&self, workflow: &Workflow, mut options: RunOptions) -> WorkflowExecution {
        let execution_id = options
            .execution_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        self.running
            .write()
            .await
            .insert(execution_id.clone(), options.cancellation.clone());

        let mut executor = WorkflowExecutor::new(self.catalog.clone(), self.registry.clone())
            .with_evaluator(self.evaluator.clone())
            .with_observer(self.event_bus.clone())
            .with_max_depth(self.config.max_depth);
        if !self.config.enforce_timeout {
            executor = executor.without_timeout();
        }

        let execution = executor.execute(workflow, options).await;
        self.running.write().await.remove(&execution_id);

        if should_save(workflow.settings.save_executions, execution.status) {
            self.executions.append(execution.clone()).await;
        }
        execution
    }

    /// Request cancellation of an in-flight run. Returns false when no such run is active.
    pub async fn cancel(&self, execution_id: &str) -> bool {
        match self.running.read().await.get(execution_id) {
            Some(token) => {
                tracing::info!("Cancelling execution {}", execution_id);
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Ids of runs currently in flight.
    pub async fn active_executions(&self) -> Vec<ExecutionId> {
        self.running.read().await.keys().cloned().collect()
    }

    /// Subscribe to run record snapshots
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<WorkflowExecution> {
        self.event_bus.subscribe()
    }

    /// Get the event bus for direct access
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for FlowRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn should_save(policy: SaveExecutions, status: ExecutionStatus) -> bool {
    match policy {
        SaveExecutions::All => true,
        SaveExecutions::Errors => status != ExecutionStatus::Success,
        SaveExecutions::None => false,
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Deepest chain of edges one traversal may follow.
    pub max_depth: usize,
    /// Snapshots buffered per event subscriber. Values below one are treated as one.
    pub event_buffer_size: usize,
    /// Runs kept in the execution history.
    pub history_limit: usize,
    /// Apply each workflow's `executionTimeout` as a whole-run deadline.
    pub enforce_timeout: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            event_buffer_size: 1000,
            history_limit: 100,
            enforce_timeout: true,
        }
    }
}
