use crate::definitions::{CODE, SET_DATA};
use async_trait::async_trait;
use flowcore::value::shallow_merge;
use flowcore::{ExecutionContext, Map, Node, NodeError, Value, WorkflowNode};

/// Set or overlay key/value pairs on the incoming data.
pub struct SetDataNode;

#[async_trait]
impl Node for SetDataNode {
    fn node_type(&self) -> &str {
        SET_DATA
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let empty = Map::new();
        let values = match node.parameter("values") {
            None => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(NodeError::InvalidParameter {
                    field: "values".to_string(),
                    expected: "an object".to_string(),
                })
            }
        };
        let keep_only_set = node
            .parameter("keepOnlySet")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if keep_only_set {
            Ok(Value::Object(values.clone()))
        } else {
            Ok(shallow_merge(input, values))
        }
    }
}

/// Run a user script with the input bound as `data`; the script's final
/// value becomes the output.
pub struct CodeNode;

#[async_trait]
impl Node for CodeNode {
    fn node_type(&self) -> &str {
        CODE
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let code = node
            .str_parameter("code")
            .ok_or_else(|| NodeError::MissingParameter("code".to_string()))?;

        let mut bindings = Map::new();
        bindings.insert("data".to_string(), input.clone());

        ctx.evaluator()
            .evaluate(code, &bindings)
            .map_err(|e| NodeError::failed(format!("Code execution failed: {}", e)))
    }
}
