use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ExpressionError(pub String);

/// Sandboxed evaluation of user-supplied expressions and scripts.
///
/// `bindings` are exposed to the source as top-level variables.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, source: &str, bindings: &Map<String, Value>) -> Result<Value, ExpressionError>;
}

/// Evaluator used when none has been configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEvaluator;

impl ExpressionEvaluator for DisabledEvaluator {
    fn evaluate(&self, _source: &str, _bindings: &Map<String, Value>) -> Result<Value, ExpressionError> {
        Err(ExpressionError("expression evaluation is not configured".to_string()))
    }
}
