//! Ollama local model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Ollama models (local, OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum OllamaModel {
    #[strum(serialize = "llama3.2")]
    Llama32,
    #[strum(serialize = "llama3.1")]
    Llama31,
    #[strum(serialize = "mistral")]
    Mistral,
    #[strum(serialize = "qwen2.5")]
    Qwen25,
    #[strum(default)]
    Custom(String),
}

impl OllamaModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Llama32 => "llama3.2",
            Self::Llama31 => "llama3.1",
            Self::Mistral => "mistral",
            Self::Qwen25 => "qwen2.5",
            Self::Custom(s) => s,
        }
    }
}
