use crate::definitions::HTTP_REQUEST;
use async_trait::async_trait;
use flowcore::{ExecutionContext, Map, Node, NodeError, Value, WorkflowNode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Map<String, Value>,
    /// Parsed JSON when the body is JSON, otherwise the raw text.
    pub data: Value,
}

/// Performs outbound HTTP on behalf of the `http-request` node.
#[async_trait]
pub trait HttpRelay: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NodeError>;
}

/// Relay backed by a shared reqwest client.
pub struct ReqwestRelay {
    client: reqwest::Client,
}

impl ReqwestRelay {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpRelay for ReqwestRelay {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NodeError> {
        let method = reqwest::Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| NodeError::InvalidParameter {
                field: "method".to_string(),
                expected: "an HTTP method".to_string(),
            })?;

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            if let Some(text) = value.as_str() {
                builder = builder.header(key, text);
            } else {
                builder = builder.header(key, value.to_string());
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NodeError::failed(format!("HTTP Request failed: {}", e)))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    Value::String(v.to_str().unwrap_or("").to_string()),
                )
            })
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| NodeError::failed(format!("Failed to read response: {}", e)))?;
        let data = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            data,
        })
    }
}

/// HTTP request node
pub struct HttpRequestNode {
    relay: Arc<dyn HttpRelay>,
}

impl HttpRequestNode {
    pub fn new(relay: Arc<dyn HttpRelay>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl Node for HttpRequestNode {
    fn node_type(&self) -> &str {
        HTTP_REQUEST
    }

    async fn execute(
        &self,
        node: &WorkflowNode,
        _input: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let url = node
            .str_parameter("url")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| NodeError::MissingParameter("url".to_string()))?;
        let method = node.str_parameter("method").unwrap_or("GET");
        let headers = match node.parameter("headers") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        tracing::debug!("{} {}", method, url);

        let response = self
            .relay
            .send(HttpRequest {
                method: method.to_string(),
                url: url.to_string(),
                headers,
                body: node.parameter("body").cloned(),
            })
            .await?;

        serde_json::to_value(response).map_err(|e| NodeError::failed(e.to_string()))
    }
}
