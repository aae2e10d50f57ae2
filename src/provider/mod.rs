//! Model provider trait and implementations.

pub mod http;
pub mod ollama;
pub mod openai;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ParleyConfig;
use crate::error::ParleyError;
use crate::models::LanguageModel;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

impl ProviderRequest {
    /// Plain request with default settings and no tools.
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    /// A plain text reply with no tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }
}

/// The language-model boundary. Everything that talks to a model goes
/// through this trait, so tests can substitute a scripted implementation.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a completion for the given turns.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ParleyError>;
}

/// Create a provider for the configured model.
pub fn create_provider(config: &ParleyConfig) -> Result<Arc<dyn ModelProvider>, ParleyError> {
    let client = http::build_client(config.request_timeout)?;

    match &config.model {
        LanguageModel::Ollama(m) => {
            let base_url = config
                .get_base_url("ollama")
                .unwrap_or_else(|| ollama::DEFAULT_OLLAMA_BASE_URL.to_string());
            Ok(Arc::new(ollama::OllamaProvider::new(
                m.clone(),
                base_url,
                client,
            )))
        }
        LanguageModel::OpenAiCompatible { model_id, base_url } => {
            let base_url = base_url
                .clone()
                .or_else(|| config.get_base_url("openai-compatible"))
                .ok_or_else(|| {
                    ParleyError::Configuration("Missing OPENAI_COMPAT_BASE_URL".into())
                })?;
            Ok(Arc::new(openai::OpenAiProvider::new(
                model_id.clone(),
                config.get_api_key("openai-compatible"),
                base_url,
                client,
            )))
        }
    }
}
