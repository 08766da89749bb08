use crate::definitions::{CRON_TRIGGER, MANUAL_TRIGGER, WEBHOOK_TRIGGER};
use async_trait::async_trait;
use chrono::Utc;
use flowcore::{ExecutionContext, Node, NodeError, Value, WorkflowNode};
use serde_json::json;

/// First non-null of: the named parameter, the run's initial input, `{}`.
fn payload(node: &WorkflowNode, parameter: &str, input: &Value) -> Value {
    node.parameter(parameter)
        .or_else(|| (!input.is_null()).then_some(input))
        .cloned()
        .unwrap_or_else(|| json!({}))
}

/// Starts a run by hand, emitting `testData` or the supplied input.
pub struct ManualTriggerNode;

#[async_trait]
impl Node for ManualTriggerNode {
    fn node_type(&self) -> &str {
        MANUAL_TRIGGER
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        Ok(payload(node, "testData", input))
    }
}

/// Emits the webhook payload delivered by the host.
pub struct WebhookTriggerNode;

#[async_trait]
impl Node for WebhookTriggerNode {
    fn node_type(&self) -> &str {
        WEBHOOK_TRIGGER
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        Ok(payload(node, "webhookData", input))
    }
}

pub struct CronTriggerNode;

#[async_trait]
impl Node for CronTriggerNode {
    fn node_type(&self) -> &str {
        CRON_TRIGGER
    }

    async fn execute(
        &self,
        _node: &WorkflowNode,
        _input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        Ok(json!({ "timestamp": Utc::now().to_rfc3339() }))
    }
}
