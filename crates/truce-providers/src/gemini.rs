//! Native Gemini adapter: the Generative Language REST API, not an
//! OpenAI-compatible proxy. One-shot, non-streaming, tool-less call only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{ModelAdapter, ProviderClient, EVALUATION_MAX_TOKENS, EVALUATION_TEMPERATURE};
use crate::error::{Error, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

/// A client for one Gemini model, authenticated via the `x-goog-api-key`
/// header rather than a bearer token.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Construct a client for `model` authenticated with `api_key`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn invoke(&self, system_prompt: &str, user_payload: &str) -> Result<String> {
        let url = format!("{API_BASE}/models/{}:generateContent", self.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: user_payload.to_string() }],
            }],
            system_instruction: GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: system_prompt.to_string() }],
            },
            generation_config: GeminiGenerationConfig {
                temperature: EVALUATION_TEMPERATURE,
                max_output_tokens: EVALUATION_MAX_TOKENS,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Error::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmptyResponse(format!("gemini returned status {status}: {body}")));
        }

        let parsed: GeminiResponse = response.json().await.map_err(Error::Transport)?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::EmptyResponse("no candidates in gemini response".to_string()))?;

        Ok(text)
    }
}

/// Build a panel adapter for a Gemini model.
pub fn gemini_adapter(
    provider_id: impl Into<String>,
    model_name: impl Into<String>,
    api_key: impl Into<String>,
) -> ModelAdapter<GeminiClient> {
    let model_name = model_name.into();
    ModelAdapter::new(provider_id, model_name.clone(), GeminiClient::new(api_key, model_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let request = GeminiRequest {
            contents: vec![GeminiContent { role: "user".into(), parts: vec![GeminiPart { text: "hi".into() }] }],
            system_instruction: GeminiContent { role: "user".into(), parts: vec![GeminiPart { text: "sys".into() }] },
            generation_config: GeminiGenerationConfig {
                temperature: EVALUATION_TEMPERATURE,
                max_output_tokens: EVALUATION_MAX_TOKENS,
                response_mime_type: "application/json",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("systemInstruction").is_some());
        assert!(value.get("generationConfig").unwrap().get("maxOutputTokens").is_some());
    }
}
