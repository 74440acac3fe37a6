//! Native Anthropic adapter: the Messages API, authenticated with
//! `x-api-key`/`anthropic-version` headers rather than `async-openai`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{ModelAdapter, ProviderClient, EVALUATION_MAX_TOKENS, EVALUATION_TEMPERATURE};
use crate::error::{Error, Result};

const API_BASE: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    system: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

/// A client for one Anthropic model.
pub struct AnthropicClient {
    api_key: String,
    model: String,
    api_version: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Construct a client for `model` authenticated with `api_key`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            api_version: ANTHROPIC_VERSION.to_string(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    async fn invoke(&self, system_prompt: &str, user_payload: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            system: system_prompt.to_string(),
            messages: vec![AnthropicMessage { role: "user", content: user_payload.to_string() }],
            max_tokens: EVALUATION_MAX_TOKENS,
            temperature: EVALUATION_TEMPERATURE,
        };

        let response = self
            .client
            .post(API_BASE)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmptyResponse(format!("anthropic returned status {status}: {body}")));
        }

        let parsed: AnthropicResponse = response.json().await.map_err(Error::Transport)?;
        let text = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::EmptyResponse("no text content block in anthropic response".to_string()))?;

        Ok(text)
    }
}

/// Build a panel adapter for an Anthropic model.
pub fn anthropic_adapter(
    provider_id: impl Into<String>,
    model_name: impl Into<String>,
    api_key: impl Into<String>,
) -> ModelAdapter<AnthropicClient> {
    let model_name = model_name.into();
    ModelAdapter::new(provider_id, model_name.clone(), AnthropicClient::new(api_key, model_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_system_as_top_level_field() {
        let request = AnthropicRequest {
            model: "claude-3-5-sonnet-latest".into(),
            system: "sys prompt".into(),
            messages: vec![AnthropicMessage { role: "user", content: "payload".into() }],
            max_tokens: EVALUATION_MAX_TOKENS,
            temperature: EVALUATION_TEMPERATURE,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["system"], "sys prompt");
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
