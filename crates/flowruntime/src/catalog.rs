use flowcore::{NodeCategory, NodeDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Catalog of node definitions.
///
/// Listing, category and search results come back in registration order.
/// Re-registering an id replaces the definition in place and keeps its slot.
#[derive(Default, Clone)]
pub struct NodeCatalog {
    definitions: HashMap<String, Arc<NodeDefinition>>,
    order: Vec<String>,
    categories: Vec<(NodeCategory, Vec<String>)>,
}

impl NodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog pre-populated with the given definitions.
    pub fn with_definitions(definitions: impl IntoIterator<Item = NodeDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.register(definition);
        }
        catalog
    }

    /// Insert or overwrite a definition by id (last write wins).
    pub fn register(&mut self, definition: NodeDefinition) {
        let id = definition.id.clone();
        let category = definition.category;
        tracing::debug!("Registering node definition: {} ({})", id, category);

        match self.definitions.insert(id.clone(), Arc::new(definition)) {
            Some(previous) if previous.category == category => {}
            Some(previous) => {
                self.remove_from_category(previous.category, &id);
                self.category_entry(category).push(id);
            }
            None => {
                self.order.push(id.clone());
                self.category_entry(category).push(id);
            }
        }
    }

    /// Remove a definition; a no-op when the id is unknown.
    pub fn unregister(&mut self, id: &str) {
        if let Some(definition) = self.definitions.remove(id) {
            self.order.retain(|existing| existing != id);
            self.remove_from_category(definition.category, id);
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<NodeDefinition>> {
        self.definitions.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get_all(&self) -> Vec<Arc<NodeDefinition>> {
        self.resolve(&self.order)
    }

    pub fn get_by_category(&self, category: NodeCategory) -> Vec<Arc<NodeDefinition>> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, ids)| self.resolve(ids))
            .unwrap_or_default()
    }

    /// Categories that currently hold at least one definition, in first-seen order.
    pub fn categories(&self) -> Vec<NodeCategory> {
        self.categories
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(c, _)| *c)
            .collect()
    }

    /// Case-insensitive substring search over name, display name,
    /// description and tags. An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<Arc<NodeDefinition>> {
        let query = query.to_lowercase();
        self.get_all()
            .into_iter()
            .filter(|definition| definition.matches(&query))
            .collect()
    }

    fn resolve(&self, ids: &[String]) -> Vec<Arc<NodeDefinition>> {
        ids.iter()
            .filter_map(|id| self.definitions.get(id).cloned())
            .collect()
    }

    fn category_entry(&mut self, category: NodeCategory) -> &mut Vec<String> {
        let position = match self.categories.iter().position(|(c, _)| *c == category) {
            Some(position) => position,
            None => {
                self.categories.push((category, Vec::new()));
                self.categories.len() - 1
            }
        };
        &mut self.categories[position].1
    }

    fn remove_from_category(&mut self, category: NodeCategory, id: &str) {
        if let Some((_, ids)) = self.categories.iter_mut().find(|(c, _)| *c == category) {
            ids.retain(|existing| existing != id);
        }
    }
}
