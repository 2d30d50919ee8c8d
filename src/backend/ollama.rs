//! Ollama HTTP backend.

use crate::backend::Backend;
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Backend talking to a local or remote Ollama server.
pub struct OllamaBackend {
    client: Client,
    host: String,
    timeout: Option<Duration>,
}

impl OllamaBackend {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            host: host.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Fail requests that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        check_status(status.as_u16(), body)
    }
}

/// Pass a 2xx body through; classify anything else, preferring the
/// `{"error": "..."}` message Ollama puts in failure bodies.
fn check_status(status: u16, body: String) -> Result<String, BackendError> {
    if (200..300).contains(&status) {
        return Ok(body);
    }
    let message = serde_json::from_str::<OllamaError>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(BackendError::from_status(status, &message))
}

/// Extract the assistant text from a `/api/chat` reply. Ollama can report
/// errors inside a 200 body.
fn parse_chat_reply(body: &str) -> Result<String, BackendError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::Other(format!("Failed to parse chat response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(BackendError::Other(error));
    }

    Ok(response
        .message
        .and_then(|m| m.content)
        .unwrap_or_default())
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize, Debug)]
struct ModelTag {
    name: Option<String>,
    model: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OllamaError {
    error: String,
}

#[async_trait]
impl Backend for OllamaBackend {
    async fn chat(&self, model: &str, prompt: &str) -> Result<String, BackendError> {
        debug!("Sending {} char prompt to {} ({})", prompt.chars().count(), self.host, model);

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let body = self
            .send(self.client.post(self.url("/api/chat")).json(&request))
            .await?;

        parse_chat_reply(&body)
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let body = self.send(self.client.get(self.url("/api/tags"))).await?;

        let tags: TagsResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::Other(format!("Failed to parse model list: {}", e)))?;

        Ok(tags
            .models
            .into_iter()
            .filter_map(|m| m.model.or(m.name))
            .collect())
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
