use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, CompletionGateway};
use crate::error::GatewayError;
use crate::params::RequestParameters;
use crate::state::ChatMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_options(api_key, DEFAULT_MODEL, DEFAULT_BASE_URL, None)
    }

    /// `timeout` of `None` keeps the transport default.
    pub fn with_options(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().unwrap_or_default(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            url: format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH),
        }
    }
}

#[async_trait]
impl CompletionGateway for OpenAIClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &RequestParameters,
    ) -> Result<Completion, GatewayError> {
        let request = OpenAIRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        debug!(model = %self.model, messages = messages.len(), "Sending chat completion");

        let response = self.client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let body = response.text().await?;
        let openai_response: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let content = openai_response.choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Malformed("response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let usage_tokens = openai_response.usage.map(|u| u.total_tokens).unwrap_or(0);
        debug!(usage_tokens, "Chat completion received");

        Ok(Completion { content, usage_tokens })
    }
}
