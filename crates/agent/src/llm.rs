use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Narrow seam to the external text-generation collaborator: prompt in,
/// text out or failure. Callers must treat every failure as recoverable.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for an Ollama-style local chat endpoint (`POST /api/chat`).
pub struct OllamaClient {
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    client: Client,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            client,
        })
    }

    /// Bearer token for hosted endpoints that speak the same protocol.
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
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

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            stream: false,
        };

        let mut builder = self.client.post(format!("{}/api/chat", self.base_url)).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.context("completion request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("completion endpoint returned {status}"));
        }

        let body: ChatResponse =
            response.json().await.context("completion response was not valid JSON")?;
        let content = body.message.map(|message| message.content).unwrap_or_default();
        if content.trim().is_empty() {
            return Err(anyhow!("completion endpoint returned an empty reply"));
        }

        Ok(content)
    }
}
