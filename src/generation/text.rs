//! Single-call text generation.

use tracing::debug;

use crate::error::ParleyError;
use crate::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use crate::types::*;

/// Send `messages` to the model once and return the raw provider response.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    messages: Vec<ModelMessage>,
    settings: GenerationSettings,
) -> Result<ProviderResponse, ParleyError> {
    let request = ProviderRequest {
        messages,
        settings,
        tools: None,
    };

    debug!(
        provider = provider.provider_name(),
        model = provider.model_id(),
        turns = request.messages.len(),
        "generate_text"
    );
    provider.generate_text(&request).await
}

/// Turns in, reply text out.
pub async fn generate(
    provider: &dyn ModelProvider,
    messages: Vec<ModelMessage>,
) -> Result<String, ParleyError> {
    let response = generate_text(provider, messages, GenerationSettings::default()).await?;
    Ok(response.text)
}
