//! Ollama local provider (OpenAI-compatible).

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::models::OllamaModel;

use super::openai::OpenAiProvider;
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaProvider {
    inner: OpenAiProvider,
}

impl OllamaProvider {
    pub fn new(model: OllamaModel, base_url: String, client: reqwest::Client) -> Self {
        Self {
            inner: OpenAiProvider::new(
                model.as_str().to_string(),
                None, // no API key for local
                format!("{}/v1", base_url.trim_end_matches('/')),
                client,
            ),
        }
    }
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ParleyError> {
        self.inner.generate_text(request).await
    }
}
