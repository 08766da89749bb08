//! Standard node library
//!
//! Built-in node definitions and their implementations, plus helpers that
//! assemble a ready-to-use catalog, registry and runtime.

mod ai;
pub mod definitions;
mod expression;
mod http;
mod integrations;
mod logic;
mod time;
mod transform;
mod trigger;

pub use ai::{AiChatNode, CompletionClient, CompletionError, CompletionRequest, OpenRouterClient};
pub use definitions::builtin_definitions;
pub use expression::RhaiEvaluator;
pub use http::{HttpRelay, HttpRequest, HttpRequestNode, HttpResponse, ReqwestRelay};
pub use integrations::{GoogleSheetsNode, SendEmailNode, SlackMessageNode, TelegramMessageNode};
pub use logic::{IfConditionNode, MergeNode, SwitchNode};
pub use time::DelayNode;
pub use transform::{CodeNode, SetDataNode};
pub use trigger::{CronTriggerNode, ManualTriggerNode, WebhookTriggerNode};

use flowruntime::{FlowRuntime, NodeCatalog, NodeRegistry, RuntimeConfig};
use std::sync::Arc;

/// Outbound collaborators used by the network-facing nodes.
#[derive(Clone)]
pub struct NodeServices {
    pub http: Arc<dyn HttpRelay>,
    pub completion: Arc<dyn CompletionClient>,
}

impl Default for NodeServices {
    fn default() -> Self {
        Self {
            http: Arc::new(ReqwestRelay::new()),
            completion: Arc::new(OpenRouterClient::from_env()),
        }
    }
}

/// Register all standard nodes with a registry
pub fn register_all(registry: &mut NodeRegistry) {
    register_with(registry, NodeServices::default());
}

/// Register all standard nodes, wiring network nodes to `services`.
pub fn register_with(registry: &mut NodeRegistry, services: NodeServices) {
    registry.register(Arc::new(ManualTriggerNode));
    registry.register(Arc::new(WebhookTriggerNode));
    registry.register(Arc::new(CronTriggerNode));
    registry.register(Arc::new(HttpRequestNode::new(services.http)));
    registry.register(Arc::new(DelayNode));
    registry.register(Arc::new(IfConditionNode));
    registry.register(Arc::new(SwitchNode));
    registry.register(Arc::new(MergeNode));
    registry.register(Arc::new(SetDataNode));
    registry.register(Arc::new(CodeNode));
    registry.register(Arc::new(AiChatNode::new(services.completion)));
    registry.register(Arc::new(SendEmailNode));
    registry.register(Arc::new(SlackMessageNode));
    registry.register(Arc::new(TelegramMessageNode));
    registry.register(Arc::new(GoogleSheetsNode));
}

/// Catalog holding every built-in definition.
pub fn builtin_catalog() -> NodeCatalog {
    NodeCatalog::with_definitions(builtin_definitions())
}

/// Runtime with the built-in catalog, the standard nodes and the Rhai evaluator.
pub fn default_runtime(config: RuntimeConfig) -> FlowRuntime {
    runtime_with(config, NodeServices::default())
}

pub fn runtime_with(config: RuntimeConfig, services: NodeServices) -> FlowRuntime {
    let mut registry = NodeRegistry::new();
    register_with(&mut registry, services);
    FlowRuntime::with_parts(builtin_catalog(), registry, config)
        .with_evaluator(Arc::new(RhaiEvaluator::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_definition_has_an_implementation() {
        let catalog = builtin_catalog();
        let mut registry = NodeRegistry::new();
        register_all(&mut registry);

        assert_eq!(catalog.len(), 15);
        for definition in catalog.get_all() {
            assert!(
                registry.contains(&definition.id),
                "no implementation for {}",
                definition.id
            );
        }
        assert_eq!(registry.list_node_types().len(), 15);
    }
}
