use flowcore::Node;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of executable node implementations, keyed by definition id.
#[derive(Default, Clone)]
pub struct NodeRegistry {
    nodes: HashMap<String, Arc<dyn Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Register an implementation, replacing any previous one for the same type.
    pub fn register(&mut self, node: Arc<dyn Node>) {
        let node_type = node.node_type().to_string();
        tracing::info!("Registering node type: {}", node_type);
        self.nodes.insert(node_type, node);
    }

    pub fn unregister(&mut self, node_type: &str) -> Option<Arc<dyn Node>> {
        self.nodes.remove(node_type)
    }

    pub fn get(&self, node_type: &str) -> Option<Arc<dyn Node>> {
        self.nodes.get(node_type).cloned()
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.nodes.contains_key(node_type)
    }

    /// Get all registered node types, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.nodes.keys().cloned().collect();
        types.sort();
        types
    }
}
