//! OpenAI and xAI adapters: both speak the OpenAI chat-completions wire
//! format, so xAI is reached by overriding the client's base URL rather than
//! writing a second client (§9 DESIGN NOTES: xAI's adapter is "the OpenAI
//! client pointed at a different base URL").

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;

use crate::client::{ModelAdapter, ProviderClient, EVALUATION_MAX_TOKENS, EVALUATION_TEMPERATURE};
use crate::error::{Error, Result};

/// Default xAI API base (OpenAI-compatible endpoint).
pub const XAI_DEFAULT_API_BASE: &str = "https://api.x.ai/v1";

/// A chat-completions client shared by the OpenAI and xAI adapters.
pub struct OpenAiCompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleClient {
    /// Build a client for the default OpenAI API base.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self { client: Client::with_config(config), model: model.into() }
    }

    /// Build a client pointed at `base_url` (used for xAI's OpenAI-compatible
    /// endpoint, or a self-hosted OpenAI-compatible gateway).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key).with_api_base(base_url);
        Self { client: Client::with_config(config), model: model.into() }
    }
}

#[async_trait]
impl ProviderClient for OpenAiCompatibleClient {
    async fn invoke(&self, system_prompt: &str, user_payload: &str) -> Result<String> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(user_payload)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(EVALUATION_TEMPERATURE)
            .max_tokens(EVALUATION_MAX_TOKENS)
            .response_format(ResponseFormat::JsonObject)
            .messages(vec![system.into(), user.into()])
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::EmptyResponse("no choices in chat completion response".to_string()))?;
        Ok(content)
    }
}

/// Build a panel adapter for an OpenAI model.
pub fn openai_adapter(
    provider_id: impl Into<String>,
    model_name: impl Into<String>,
    api_key: impl Into<String>,
) -> ModelAdapter<OpenAiCompatibleClient> {
    let model_name = model_name.into();
    ModelAdapter::new(provider_id, model_name.clone(), OpenAiCompatibleClient::openai(api_key, model_name))
}

/// Build a panel adapter for an xAI model, defaulting to xAI's OpenAI-compatible
/// base URL unless `base_url` overrides it.
pub fn xai_adapter(
    provider_id: impl Into<String>,
    model_name: impl Into<String>,
    api_key: impl Into<String>,
    base_url: Option<String>,
) -> ModelAdapter<OpenAiCompatibleClient> {
    let model_name = model_name.into();
    let client = OpenAiCompatibleClient::with_base_url(
        api_key,
        base_url.unwrap_or_else(|| XAI_DEFAULT_API_BASE.to_string()),
        model_name.clone(),
    );
    ModelAdapter::new(provider_id, model_name, client)
}
