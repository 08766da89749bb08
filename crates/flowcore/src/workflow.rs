use crate::error::FlowError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub type WorkflowId = String;
pub type NodeId = String;

/// Complete workflow definition: a directed graph of node instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
    #[serde(default)]
    pub settings: WorkflowSettings,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            settings: WorkflowSettings::default(),
            created_at: now,
            updated_at: now,
            is_active: false,
            folder_id: None,
            tags: Vec::new(),
        }
    }

    /// Parse a workflow from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn add_node(&mut self, node: WorkflowNode) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    /// Connect two nodes through the default output handle.
    pub fn connect(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.push_edge(source.into(), target.into(), None);
    }

    /// Connect two nodes through a named output handle (`"true"`, `"case1"`, ...).
    pub fn connect_handle(
        &mut self,
        source: impl Into<String>,
        handle: impl Into<String>,
        target: impl Into<String>,
    ) {
        self.push_edge(source.into(), target.into(), Some(handle.into()));
    }

    fn push_edge(&mut self, source: String, target: String, source_handle: Option<String>) {
        self.edges.push(WorkflowEdge {
            id: format!("e{}-{}-{}", self.edges.len(), source, target),
            source,
            target,
            source_handle,
            target_handle: None,
        });
    }

    pub fn find_node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes no edge points at, in declaration order.
    pub fn trigger_nodes(&self) -> Vec<&WorkflowNode> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.target == n.id))
            .collect()
    }

    /// Outgoing edges of a node, in declaration order.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &WorkflowEdge> + '_ {
        let id = id.to_string();
        self.edges.iter().filter(move |e| e.source == id)
    }
}

/// A configured occurrence of a node kind inside a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: NodeId,
    pub definition_id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, definition_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            data: NodeData {
                label: id.clone(),
                parameters: Map::new(),
                credentials: None,
            },
            id,
            definition_id: definition_id.into(),
            position: Position::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = label.into();
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.data.parameters.get(key).filter(|v| !v.is_null())
    }

    pub fn str_parameter(&self, key: &str) -> Option<&str> {
        self.parameter(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

/// Node position in the visual editor. Carried, never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEdge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveExecutions {
    #[default]
    All,
    Errors,
    None,
}

/// Global workflow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowSettings {
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_workflow: Option<WorkflowId>,
    pub save_executions: SaveExecutions,
    /// Whole-run deadline in seconds. Zero disables it.
    pub execution_timeout: u64,
    /// Attempts allowed beyond the first for a failing node.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            error_workflow: None,
            save_executions: SaveExecutions::All,
            execution_timeout: 300,
            max_retries: 0,
            retry_delay_ms: 0,
        }
    }
}
