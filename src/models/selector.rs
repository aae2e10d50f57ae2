//! Model selection and parsing.

use std::str::FromStr;

use super::{LanguageModel, OllamaModel};
use crate::error::ParleyError;

/// Parse a "provider:model" string into a LanguageModel.
pub struct ModelSelector;

impl ModelSelector {
    /// Parse "provider:model_id" into a LanguageModel.
    ///
    /// Examples: "ollama:llama3.2", "openai-compatible:gpt-4o-mini".
    /// A bare id with no provider prefix is treated as an Ollama tag.
    pub fn parse(s: &str) -> Result<LanguageModel, ParleyError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParleyError::InvalidArgument(
                "Model selector must not be empty".into(),
            ));
        }

        let Some((provider, model_id)) = s.split_once(':') else {
            return Ok(LanguageModel::Ollama(ollama_model(s)));
        };
        if model_id.is_empty() {
            return Err(ParleyError::InvalidArgument(format!(
                "Invalid model selector '{s}': expected 'provider:model_id'"
            )));
        }

        match provider {
            "ollama" => Ok(LanguageModel::Ollama(ollama_model(model_id))),
            "openai-compatible" | "openai_compatible" => Ok(LanguageModel::OpenAiCompatible {
                model_id: model_id.to_string(),
                base_url: None,
            }),
            // Ollama tags carry their own colon (e.g. "llama3.2:3b").
            _ if is_ollama_size_tag(model_id) => {
                Ok(LanguageModel::Ollama(ollama_model(s)))
            }
            other => Err(ParleyError::ModelNotFound(format!(
                "No provider named '{other}'. Use ollama or openai-compatible."
            ))),
        }
    }
}

fn ollama_model(tag: &str) -> OllamaModel {
    OllamaModel::from_str(tag).unwrap_or_else(|_| OllamaModel::Custom(tag.to_string()))
}

fn is_ollama_size_tag(tag: &str) -> bool {
    tag == "latest"
        || tag
            .chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
}

impl FromStr for LanguageModel {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelSelector::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_model() {
        let model = ModelSelector::parse(crate::models::DEFAULT_MODEL).unwrap();
        assert_eq!(model, LanguageModel::Ollama(OllamaModel::Llama32));
        assert_eq!(model.to_string(), "ollama:llama3.2");
    }

    #[test]
    fn parse_bare_tag_as_ollama() {
        let model = ModelSelector::parse("llama3.2").unwrap();
        assert_eq!(model.provider_name(), "ollama");
        assert_eq!(model.model_id(), "llama3.2");
    }

    #[test]
    fn parse_ollama_tag_with_size_suffix() {
        let model = ModelSelector::parse("llama3.2:3b").unwrap();
        assert_eq!(model.provider_name(), "ollama");
        assert_eq!(model.model_id(), "llama3.2:3b");

        let model = ModelSelector::parse("ollama:qwen2.5:7b").unwrap();
        assert_eq!(model.model_id(), "qwen2.5:7b");
    }

    #[test]
    fn parse_openai_compatible_model() {
        let model = ModelSelector::parse("openai-compatible:gpt-4o-mini").unwrap();
        assert_eq!(model.provider_name(), "openai-compatible");
        assert_eq!(model.model_id(), "gpt-4o-mini");
    }

    #[test]
    fn parse_rejects_unknown_provider_and_empty_input() {
        assert!(matches!(
            ModelSelector::parse("anthropic:claude"),
            Err(ParleyError::ModelNotFound(_))
        ));
        assert!(matches!(
            ModelSelector::parse("  "),
            Err(ParleyError::InvalidArgument(_))
        ));
        assert!(matches!(
            ModelSelector::parse("ollama:"),
            Err(ParleyError::InvalidArgument(_))
        ));
    }
}
