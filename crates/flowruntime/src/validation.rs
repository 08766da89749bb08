//! Static checks over a workflow before it is run.

use crate::catalog::NodeCatalog;
use crate::registry::NodeRegistry;
use flowcore::{Workflow, WorkflowError};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    fn error(&mut self, message: String) {
        self.issues.push(Issue {
            severity: Severity::Error,
            message,
        });
    }

    fn warning(&mut self, message: String) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            message,
        });
    }
}

/// Collect every problem that would stop or surprise a run of `workflow`.
pub fn validate_workflow(
    workflow: &Workflow,
    catalog: &NodeCatalog,
    registry: &NodeRegistry,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut graph = DiGraph::<&str, ()>::new();
    let mut indices = HashMap::new();

    for node in &workflow.nodes {
        if indices.contains_key(node.id.as_str()) {
            report.error(format!("Duplicate node id: {}", node.id));
            continue;
        }
        indices.insert(node.id.as_str(), graph.add_node(node.id.as_str()));

        match catalog.get(&node.definition_id) {
            None => report.error(format!(
                "Node {} uses unknown definition: {}",
                node.id, node.definition_id
            )),
            Some(definition) => {
                for missing in definition.missing_required(&node.data.parameters) {
                    report.error(format!(
                        "Node {} is missing required parameter: {}",
                        node.id, missing
                    ));
                }
            }
        }
        if !registry.contains(&node.definition_id) {
            report.error(format!("No executor for node type: {}", node.definition_id));
        }
    }

    for edge in &workflow.edges {
        match (
            indices.get(edge.source.as_str()),
            indices.get(edge.target.as_str()),
        ) {
            (Some(from), Some(to)) => {
                graph.add_edge(*from, *to, ());
            }
            _ => report.error(
                WorkflowError::InvalidConnection(format!(
                    "{}: {} -> {}",
                    edge.id, edge.source, edge.target
                ))
                .to_string(),
            ),
        }
    }

    if workflow.trigger_nodes().is_empty() {
        report.error("No trigger node found".to_string());
    }
    if is_cyclic_directed(&graph) {
        report.warning(
            "Workflow contains a cycle; traversal stops at the configured maximum depth"
                .to_string(),
        );
    }

    report
}
