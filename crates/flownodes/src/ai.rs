use crate::definitions::AI_CHAT;
use async_trait::async_trait;
use flowcore::value::interpolate;
use flowcore::{ExecutionContext, Node, NodeError, Value, WorkflowNode};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
}

impl CompletionRequest {
    /// Chat messages in send order: the optional system message, then the prompt.
    pub fn messages(&self) -> Vec<Value> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": self.prompt}));
        messages
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct CompletionError {
    pub status: Option<u16>,
    pub message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Chat completion backend used by the `ai-chat` node.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the provider's raw JSON response.
    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError>;
}

/// OpenRouter chat completions.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl OpenRouterClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: OPENROUTER_URL.to_string(),
        }
    }

    /// Reads the key from `OPENROUTER_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("OPENROUTER_API_KEY").ok())
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::new("OpenRouter API key not configured"))?;

        let mut body = json!({
            "model": request.model,
            "messages": request.messages(),
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError {
                status: Some(status.as_u16()),
                message: format!(
                    "OpenRouter API error: {}",
                    status.canonical_reason().unwrap_or("unknown status")
                ),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CompletionError::new(e.to_string()))
    }
}

/// Sends an interpolated prompt to a chat model.
pub struct AiChatNode {
    client: Arc<dyn CompletionClient>,
}

impl AiChatNode {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Node for AiChatNode {
    fn node_type(&self) -> &str {
        AI_CHAT
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let template = node
            .str_parameter("prompt")
            .ok_or_else(|| NodeError::MissingParameter("prompt".to_string()))?;
        let model = node.str_parameter("model").unwrap_or(DEFAULT_MODEL);
        let prompt = interpolate(template, input);

        let request = CompletionRequest {
            model: model.to_string(),
            prompt: prompt.clone(),
            system_prompt: node.str_parameter("systemPrompt").map(str::to_string),
            temperature: node.parameter("temperature").and_then(Value::as_f64),
        };

        let raw = self
            .client
            .complete(request)
            .await
            .map_err(|e| NodeError::failed(format!("AI Request failed: {}", e)))?;

        let response = raw
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
            .unwrap_or("No response")
            .to_string();

        Ok(json!({
            "model": model,
            "prompt": prompt,
            "response": response,
            "raw": raw,
        }))
    }
}
