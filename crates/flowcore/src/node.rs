use crate::expression::{DisabledEvaluator, ExpressionEvaluator};
use crate::workflow::{NodeId, WorkflowEdge, WorkflowId, WorkflowNode};
use crate::NodeError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Executable behaviour for one node kind.
///
/// Implementations receive the node instance with its parameters already
/// resolved against the definition defaults, the value routed into it and a
/// read-only view of the run context.
#[async_trait]
pub trait Node: Send + Sync {
    /// Definition id this implementation serves (e.g. "http-request").
    fn node_type(&self) -> &str;

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError>;

    /// How a successful output selects outgoing edges.
    fn routing(&self) -> Routing {
        Routing::FanOut
    }
}

/// Edge selection strategy applied after a node succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Every outgoing edge fires.
    FanOut,
    /// Only the edge whose handle is `"true"`/`"false"` matching `output.result`.
    Condition,
    /// Only edges whose handle equals `output.matchedOutput`.
    Switch,
}

impl Routing {
    pub fn selects(&self, output: &Value, edge: &WorkflowEdge) -> bool {
        let handle = edge.source_handle.as_deref();
        match self {
            Routing::FanOut => true,
            Routing::Condition => {
                let result = output
                    .get("result")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                handle == Some(if result { "true" } else { "false" })
            }
            Routing::Switch => {
                let matched = output
                    .get("matchedOutput")
                    .and_then(Value::as_str)
                    .unwrap_or("default");
                handle == Some(matched)
            }
        }
    }
}

/// Per-run state threaded through the traversal.
///
/// Only the executor that owns the run holds it mutably, so node
/// implementations can read earlier outputs but never write them.
#[derive(Clone)]
pub struct ExecutionContext {
    pub workflow_id: WorkflowId,
    pub execution_id: String,

    /// Free-form run-scoped variables.
    pub variables: Arc<RwLock<Map<String, Value>>>,

    /// Cancellation token for graceful shutdown
    pub cancellation: CancellationToken,

    node_outputs: HashMap<NodeId, Value>,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl ExecutionContext {
    pub fn new(workflow_id: impl Into<String>, execution_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            execution_id: execution_id.into(),
            variables: Arc::new(RwLock::new(Map::new())),
            cancellation: CancellationToken::new(),
            node_outputs: HashMap::new(),
            evaluator: Arc::new(DisabledEvaluator),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn evaluator(&self) -> &dyn ExpressionEvaluator {
        self.evaluator.as_ref()
    }

    /// Latest output produced by a node during this run.
    pub fn node_output(&self, node_id: &str) -> Option<&Value> {
        self.node_outputs.get(node_id)
    }

    pub fn node_outputs(&self) -> &HashMap<NodeId, Value> {
        &self.node_outputs
    }

    pub fn record_output(&mut self, node_id: impl Into<String>, output: Value) {
        self.node_outputs.insert(node_id.into(), output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edge(handle: Option<&str>) -> WorkflowEdge {
        WorkflowEdge {
            id: "e".into(),
            source: "a".into(),
            target: "b".into(),
            source_handle: handle.map(String::from),
            target_handle: None,
        }
    }

    #[test]
    fn condition_routes_on_boolean_result() {
        let output = json!({"result": true, "data": {}});
        assert!(Routing::Condition.selects(&output, &edge(Some("true"))));
        assert!(!Routing::Condition.selects(&output, &edge(Some("false"))));
        assert!(!Routing::Condition.selects(&output, &edge(None)));

        let fallback = json!({"result": false, "error": "Invalid condition"});
        assert!(Routing::Condition.selects(&fallback, &edge(Some("false"))));
    }

    #[test]
    fn switch_routes_on_matched_output() {
        let output = json!({"matchedOutput": "case2"});
        assert!(Routing::Switch.selects(&output, &edge(Some("case2"))));
        assert!(!Routing::Switch.selects(&output, &edge(Some("default"))));
        assert!(Routing::Switch.selects(&json!({}), &edge(Some("default"))));

        let unmatched = json!({"matchedOutput": "default"});
        assert!(!Routing::Switch.selects(&unmatched, &edge(Some("case1"))));
        assert!(!Routing::Switch.selects(&unmatched, &edge(None)));
    }

    #[test]
    fn fan_out_takes_every_edge() {
        assert!(Routing::FanOut.selects(&Value::Null, &edge(None)));
        assert!(Routing::FanOut.selects(&Value::Null, &edge(Some("anything"))));
    }
}
