use crate::definitions::DELAY;
use async_trait::async_trait;
use flowcore::{ExecutionContext, Node, NodeError, Value, WorkflowNode};
use tokio::time::{sleep, Duration};

/// Delay execution for a specified duration, passing the input through.
pub struct DelayNode;

#[async_trait]
impl Node for DelayNode {
    fn node_type(&self) -> &str {
        DELAY
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let delay_ms = match node.parameter("duration") {
            None => 1000,
            Some(value) => value.as_f64().filter(|ms| *ms >= 0.0).ok_or_else(|| {
                NodeError::InvalidParameter {
                    field: "duration".to_string(),
                    expected: "a non-negative number of milliseconds".to_string(),
                }
            })? as u64,
        };

        tracing::debug!("Delaying for {}ms", delay_ms);

        tokio::select! {
            _ = sleep(Duration::from_millis(delay_ms)) => Ok(input.clone()),
            _ = ctx.cancellation.cancelled() => Err(NodeError::Cancelled),
        }
    }
}
