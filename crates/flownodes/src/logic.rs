//! Flow-control nodes: conditional branch, multi-way switch and merge.

use crate::definitions::{IF_CONDITION, MERGE, SWITCH};
use async_trait::async_trait;
use flowcore::value::{is_truthy, lookup_path};
use flowcore::{ExecutionContext, Map, Node, NodeError, Routing, Value, WorkflowNode};
use serde::Deserialize;
use serde_json::json;

/// Evaluates `condition` against the input and routes to the `"true"` or
/// `"false"` handle.
///
/// A condition that fails to evaluate is not a node failure: the node
/// reports `result: false` with an error note and routing continues down
/// the false branch.
pub struct IfConditionNode;

#[async_trait]
impl Node for IfConditionNode {
    fn node_type(&self) -> &str {
        IF_CONDITION
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let condition = node.str_parameter("condition").unwrap_or_default();

        let mut bindings = Map::new();
        bindings.insert("data".to_string(), input.clone());

        match ctx.evaluator().evaluate(condition, &bindings) {
            Ok(result) => {
                let result = result.as_bool().unwrap_or_else(|| is_truthy(&result));
                Ok(json!({ "result": result, "data": input }))
            }
            Err(err) => {
                tracing::warn!("Condition on node {} failed to evaluate: {}", node.id, err);
                Ok(json!({ "result": false, "data": input, "error": "Invalid condition" }))
            }
        }
    }

    fn routing(&self) -> Routing {
        Routing::Condition
    }
}

#[derive(Debug, Deserialize)]
struct SwitchCase {
    value: Value,
    #[serde(default)]
    output: String,
}

/// Looks up `property` in the input and routes to the output of the first
/// case whose value matches, or to `"default"`.
pub struct SwitchNode;

#[async_trait]
impl Node for SwitchNode {
    fn node_type(&self) -> &str {
        SWITCH
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let property = node.str_parameter("property").unwrap_or_default();
        let cases: Vec<SwitchCase> = match node.parameter("cases") {
            Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
                tracing::warn!("Switch node {} has unreadable cases: {}", node.id, e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let value = lookup_path(input, property);
        let matched = cases
            .iter()
            .find(|case| value.is_some_and(|v| loosely_equal(&case.value, v)))
            .map(|case| case.output.as_str())
            .filter(|output| !output.is_empty())
            .unwrap_or("default");

        Ok(json!({ "matchedOutput": matched, "data": input }))
    }

    fn routing(&self) -> Routing {
        Routing::Switch
    }
}

/// Strict equality, except that numbers compare by value (`1` matches `1.0`).
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Wraps its input in an array (arrays pass through unchanged).
///
/// The executor dispatches downstream nodes once per incoming edge, so a
/// merge fed by two branches runs twice, once with each branch's output.
/// It does not wait for and join both inputs; a host that needs a true
/// join has to supply its own implementation for this kind.
pub struct MergeNode;

#[async_trait]
impl Node for MergeNode {
    fn node_type(&self) -> &str {
        MERGE
    }

    async fn execute(
        &self,
        _node: &WorkflowNode,
        input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        Ok(match input {
            Value::Array(_) => input.clone(),
            other => Value::Array(vec![other.clone()]),
        })
    }
}
