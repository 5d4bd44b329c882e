use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model serving endpoint summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingEndpoint {
    pub name: String,
    pub state: Option<EndpointState>,
    pub creator: Option<String>,
    pub task: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointState {
    pub ready: Option<String>,
    pub config_update: Option<String>,
}

impl ServingEndpoint {
    /// Endpoints without a reported readiness are assumed usable.
    pub fn is_ready(&self) -> bool {
        match self.state.as_ref().and_then(|s| s.ready.as_deref()) {
            Some(ready) => ready == "READY",
            None => true,
        }
    }

    pub fn state_display(&self) -> String {
        match &self.state {
            Some(state) => format!(
                "ready={} config_update={}",
                state.ready.as_deref().unwrap_or("UNKNOWN"),
                state.config_update.as_deref().unwrap_or("UNKNOWN")
            ),
            None => "UNKNOWN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServingEndpointList {
    #[serde(default)]
    pub endpoints: Vec<ServingEndpoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Chat completion response. Endpoints differ in shape, so the raw body is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ChatResponse(pub Value);

impl ChatResponse {
    /// Pull the answer out of the common response shapes.
    pub fn answer(&self) -> Option<&str> {
        let body = &self.0;
        body.pointer("/choices/0/message/content")
            .or_else(|| body.get("content"))
            .or_else(|| body.get("response"))
            .and_then(Value::as_str)
    }
}
