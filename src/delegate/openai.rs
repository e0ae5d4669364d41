//! OpenAI-compatible delegate.
//!
//! Sends the delegation request as a Chat Completions call in JSON mode and
//! parses the first choice's content as a [`DelegationResponse`]. Works with
//! any server speaking the OpenAI wire format (Ollama, vLLM, ...).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DelegationConfig, DEFAULT_LLM_API_URL};
use crate::BoxFuture;

use super::provider::{DelegationError, DelegationRequest, DelegationResponse, SearchDelegate};

pub struct OpenAiDelegate {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiDelegate {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_LLM_API_URL.to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn from_config(config: &DelegationConfig) -> Self {
        Self::new(config.api_key.clone())
            .with_base_url(config.api_url.clone())
            .with_model(config.model.clone())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_request_body(&self, request: &DelegationRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(request.system_instruction.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(request.user_query.clone()),
                },
            ],
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
            temperature: 0.0,
        }
    }
}

/// Pull the answer text out of a chat completion and parse it.
fn parse_completion(resp: ChatResponse) -> Result<DelegationResponse, DelegationError> {
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| DelegationError::Parse("no content in response".to_string()))?;

    DelegationResponse::parse(&content)
}

impl SearchDelegate for OpenAiDelegate {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn select(
        &self,
        request: &DelegationRequest,
    ) -> BoxFuture<'_, Result<DelegationResponse, DelegationError>> {
        let body = self.build_request_body(request);
        Box::pin(async move {
            debug!(model = %body.model, "Delegated search request");

            let resp = self
                .client
                .post(&self.base_url)
                .header("authorization", format!("Bearer {}", self.api_key))
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| DelegationError::Network(e.to_string()))?;

            let status = resp.status().as_u16();
            if status == 401 {
                return Err(DelegationError::Auth("invalid API key".to_string()));
            }
            if !resp.status().is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(DelegationError::Provider { status, message });
            }

            let completion: ChatResponse = resp
                .json()
                .await
                .map_err(|e| DelegationError::Parse(e.to_string()))?;

            parse_completion(completion)
        })
    }
}

// ── Chat Completions wire types (private) ───────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
