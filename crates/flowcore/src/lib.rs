//! Core abstractions for the flow engine
//!
//! This crate provides the fundamental types and traits that all other
//! components depend on: the workflow graph, node definitions, the run
//! record, and the contract every node implementation fulfils.

mod definition;
mod error;
pub mod events;
mod execution;
mod expression;
mod node;
pub mod value;
mod workflow;

pub use definition::{
    NodeCategory, NodeDefinition, NodeType, ParameterSpec, ParameterType, PortSpec, PortType,
    SelectOption, ShowWhen,
};
pub use error::{FlowError, NodeError, WorkflowError};
pub use events::*;
pub use execution::{ExecutionId, ExecutionMode, ExecutionStatus, NodeExecution, WorkflowExecution};
pub use expression::{DisabledEvaluator, ExpressionError, ExpressionEvaluator};
pub use node::{ExecutionContext, Node, Routing};
pub use workflow::{
    NodeData, NodeId, Position, SaveExecutions, Workflow, WorkflowEdge, WorkflowId, WorkflowNode,
    WorkflowSettings,
};
pub use serde_json::{Map, Value};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
