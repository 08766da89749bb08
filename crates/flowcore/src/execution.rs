//! The run record: what the executor produces and observers receive.

use crate::workflow::{NodeId, Workflow, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub type ExecutionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Error,
    Cancelled,
    Waiting,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Success | ExecutionStatus::Error | ExecutionStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
            ExecutionStatus::Cancelled => "cancelled",
            ExecutionStatus::Waiting => "waiting",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Manual,
    Trigger,
    Webhook,
    Scheduled,
}

/// One attempt at running one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecution {
    pub node_id: NodeId,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// `null` when the node was dispatched without input.
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
}

impl NodeExecution {
    pub fn start(node_id: impl Into<String>, input: Value, retry_count: u32) -> Self {
        Self {
            node_id: node_id.into(),
            status: ExecutionStatus::Running,
            started_at: Some(Utc::now()),
            finished_at: None,
            duration: None,
            input,
            output: Value::Null,
            error: None,
            retry_count,
        }
    }

    pub fn succeed(&mut self, output: Value) {
        self.finish(ExecutionStatus::Success);
        self.output = output;
    }

    pub fn fail(&mut self, status: ExecutionStatus, message: impl Into<String>) {
        self.finish(status);
        self.error = Some(message.into());
    }

    fn finish(&mut self, status: ExecutionStatus) {
        let now = Utc::now();
        self.status = status;
        self.finished_at = Some(now);
        self.duration = self.started_at.map(|s| elapsed_ms(s, now));
    }
}

/// Trace of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub id: ExecutionId,
    pub workflow_id: WorkflowId,
    #[serde(default)]
    pub workflow_name: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub node_executions: Vec<NodeExecution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

impl WorkflowExecution {
    pub fn new(workflow: &Workflow, mode: ExecutionMode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            workflow_id: workflow.id.clone(),
            workflow_name: workflow.name.clone(),
            status: ExecutionStatus::Pending,
            mode,
            started_at: Utc::now(),
            finished_at: None,
            duration: None,
            node_executions: Vec::new(),
            error: None,
            triggered_by: None,
        }
    }

    /// Move the run into a terminal state, stamping finish time and duration.
    pub fn finish(&mut self, status: ExecutionStatus, error: Option<String>) {
        let now = Utc::now();
        self.status = status;
        self.error = error;
        self.finished_at = Some(now);
        self.duration = Some(elapsed_ms(self.started_at, now));
    }

    /// Every attempt recorded for a node, oldest first.
    pub fn attempts<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a NodeExecution> {
        self.node_executions.iter().filter(move |n| n.node_id == node_id)
    }

    /// The most recent attempt for a node, which carries its final status.
    pub fn last_attempt(&self, node_id: &str) -> Option<&NodeExecution> {
        self.node_executions.iter().rev().find(|n| n.node_id == node_id)
    }

    /// Node ids in dispatch order, one entry per attempt.
    pub fn visited(&self) -> Vec<&str> {
        self.node_executions.iter().map(|n| n.node_id.as_str()).collect()
    }
}

fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_milliseconds().max(0) as u64
}
