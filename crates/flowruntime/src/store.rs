//! Workflow definitions and execution history, kept in memory.

use async_trait::async_trait;
use chrono::Utc;
use flowcore::{Workflow, WorkflowError, WorkflowExecution};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// CRUD over workflow definitions.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn create(&self, workflow: Workflow);
    async fn get(&self, id: &str) -> Option<Workflow>;
    async fn list(&self) -> Vec<Workflow>;
    async fn update(&self, workflow: Workflow) -> Result<(), WorkflowError>;
    async fn delete(&self, id: &str) -> Result<Workflow, WorkflowError>;
}

/// Run history, newest first.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn append(&self, execution: WorkflowExecution);
    async fn update(&self, execution: WorkflowExecution) -> Result<(), WorkflowError>;
    async fn get(&self, id: &str) -> Option<WorkflowExecution>;
    async fn list(&self) -> Vec<WorkflowExecution>;
}

#[derive(Default)]
pub struct InMemoryWorkflowStore {
    workflows: RwLock<Vec<Workflow>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    /// Insert a workflow, replacing any stored one with the same id.
    async fn create(&self, workflow: Workflow) {
        let mut workflows = self.workflows.write().await;
        match workflows.iter_mut().find(|w| w.id == workflow.id) {
            Some(existing) => *existing = workflow,
            None => workflows.push(workflow),
        }
    }

    async fn get(&self, id: &str) -> Option<Workflow> {
        self.workflows.read().await.iter().find(|w| w.id == id).cloned()
    }

    async fn list(&self) -> Vec<Workflow> {
        self.workflows.read().await.clone()
    }

    async fn update(&self, mut workflow: Workflow) -> Result<(), WorkflowError> {
        let mut workflows = self.workflows.write().await;
        let existing = workflows
            .iter_mut()
            .find(|w| w.id == workflow.id)
            .ok_or_else(|| WorkflowError::NotFound(workflow.id.clone()))?;
        workflow.updated_at = Utc::now();
        *existing = workflow;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<Workflow, WorkflowError> {
        let mut workflows = self.workflows.write().await;
        let position = workflows
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
        Ok(workflows.remove(position))
    }
}

/// Keeps at most `limit` runs; the oldest fall off when new ones arrive.
pub struct InMemoryExecutionStore {
    limit: usize,
    executions: RwLock<VecDeque<WorkflowExecution>>,
}

impl InMemoryExecutionStore {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            executions: RwLock::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn append(&self, execution: WorkflowExecution) {
        let mut executions = self.executions.write().await;
        executions.push_front(execution);
        executions.truncate(self.limit);
    }

    async fn update(&self, execution: WorkflowExecution) -> Result<(), WorkflowError> {
        let mut executions = self.executions.write().await;
        let existing = executions
            .iter_mut()
            .find(|e| e.id == execution.id)
            .ok_or_else(|| WorkflowError::NotFound(execution.id.clone()))?;
        *existing = execution;
        Ok(())
    }

    async fn get(&self, id: &str) -> Option<WorkflowExecution> {
        self.executions.read().await.iter().find(|e| e.id == id).cloned()
    }

    async fn list(&self) -> Vec<WorkflowExecution> {
        self.executions.read().await.iter().cloned().collect()
    }
}
