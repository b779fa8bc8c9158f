//! Chat-completions client for the briefing model.
//!
//! A thin wrapper over an OpenAI-compatible `/chat/completions` endpoint,
//! requesting JSON-mode output with bounded length and low temperature.
//! The endpoint, model, and limits come from configuration so tests can
//! substitute a mock server.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use precall_shared::{CompletionConfig, PrecallError, Result};

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("precall/", env!("CARGO_PKG_VERSION"));

/// A message in the completion conversation.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// JSON-mode output request.
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Request body for the chat-completions call.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

/// Response envelope — only the fields we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Completion backend client.
pub struct CompletionClient {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl CompletionClient {
    /// Build a client from the resolved config, or `None` when the backend
    /// credential is absent — callers then skip network calls entirely.
    pub fn from_config(config: &CompletionConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PrecallError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Some(Self {
            http,
            api_key,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }))
    }

    /// Send one system+user turn and return the raw reply text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PrecallError::Network(format!("completion call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PrecallError::Synthesis(format!(
                "completion backend error {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            PrecallError::Synthesis(format!("unreadable completion response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PrecallError::Synthesis("completion reply had no choices".into()))
    }
}
