//! Workflow execution runtime
//!
//! This crate provides the execution engine that runs workflows: the node
//! definition catalog, the implementation registry, the depth-first graph
//! executor, and in-memory stores for workflows and run history.

mod catalog;
mod executor;
mod registry;
mod runtime;
pub mod store;
mod validation;

pub use catalog::NodeCatalog;
pub use executor::{RunOptions, WorkflowExecutor, DEFAULT_MAX_DEPTH};
pub use registry::NodeRegistry;
pub use runtime::{FlowRuntime, RuntimeConfig};
pub use store::{ExecutionStore, InMemoryExecutionStore, InMemoryWorkflowStore, WorkflowStore};
pub use validation::{validate_workflow, Issue, Severity, ValidationReport};
