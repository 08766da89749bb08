use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Workflow execution timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Workflow execution cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures local to a single node attempt. These are subject to the
/// workflow's retry policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidParameter { field: String, expected: String },

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("Cancelled")]
    Cancelled,
}

impl NodeError {
    pub fn failed(message: impl Into<String>) -> Self {
        NodeError::ExecutionFailed(message.into())
    }
}

/// Configuration errors. Fatal to the run, never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    NotFound(String),

    #[error("No trigger node found")]
    NoTriggerNode,

    #[error("Node definition not found: {0}")]
    UnknownDefinition(String),

    #[error("No executor for node type: {0}")]
    NoExecutor(String),

    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    #[error("Maximum traversal depth of {0} exceeded")]
    DepthExceeded(usize),
}
