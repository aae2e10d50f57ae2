//! Model definitions and selection.

pub mod ollama;
pub mod selector;

pub use ollama::OllamaModel;
pub use selector::ModelSelector;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "ollama:llama3.2";

/// Top-level language model enum, dispatching to provider-specific variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "provider", content = "model")]
pub enum LanguageModel {
    /// Locally hosted Ollama model.
    Ollama(OllamaModel),
    /// Any server speaking the OpenAI chat-completions protocol.
    OpenAiCompatible {
        model_id: String,
        base_url: Option<String>,
    },
}

impl LanguageModel {
    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        match self {
            Self::Ollama(m) => m.as_str(),
            Self::OpenAiCompatible { model_id, .. } => model_id,
        }
    }

    /// Get the provider name.
    pub fn provider_name(&self) -> &str {
        match self {
            Self::Ollama(_) => "ollama",
            Self::OpenAiCompatible { .. } => "openai-compatible",
        }
    }
}

impl Default for LanguageModel {
    fn default() -> Self {
        Self::Ollama(OllamaModel::Llama32)
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}
