//! Anthropic-backed backend implementation.
//! Each call sends the prompt as a single user message to the messages API.

use super::Backend;
use crate::config::TranslatorConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace};

const API_VERSION: &str = "2023-06-01";

/// Backend that delegates to the Anthropic messages API.
pub struct AnthropicBackend {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicBackend {
    /// Build a client for `config`. Fails if no API key is configured.
    pub fn new(config: &TranslatorConfig) -> Result<Self, BackendError> {
        if config.api_key.trim().is_empty() {
            return Err(BackendError::MissingApiKey);
        }
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            url: format!("{}/v1/messages", config.endpoint.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }

    /// Send a JSON body to the messages endpoint and return the raw response text.
    async fn post_messages(&self, body: Value) -> Result<String, BackendError> {
        trace!("POST {}", self.url);
        let resp = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl Backend for AnthropicBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": self.system_prompt,
            "messages": [{"role": "user", "content": prompt}],
        });
        let raw = self.post_messages(body).await?;
        let parsed: MessagesResponse = serde_json::from_str(&raw)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "backend usage: {} input tokens, {} output tokens",
                usage.input_tokens, usage.output_tokens
            );
        }
        let text: String = parsed
            .content
            .iter()
            .filter(|c| c.kind == "text")
            .map(|c| c.text.as_str())
            .collect();
        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text)
    }
}
