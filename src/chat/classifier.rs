//! Message classifier: asks the model whether a turn needs an emotional or a
//! logical answer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::error::ParleyError;
use crate::generation::{generate_text, parse_object};
use crate::graph::Node;
use crate::provider::ModelProvider;
use crate::types::{GenerationSettings, ModelMessage, ResponseFormat};

use super::state::ChatState;

/// Instruction sent ahead of the user's message. Carries two worked examples.
pub const CLASSIFIER_PROMPT: &str = r#"Classify the user message as either:
'emotional': if it asks for emotional support, therapy, deals with feelings, or personal problems
'logical': if it asks for facts, information, logical analysis, or practical solutions
Examples:
User: I'm feeling really down and don't know what to do.
Output: { "message_type": "emotional" }

User: What is the capital of Germany?
Output: { "message_type": "logical" }
"#;

/// Classification tag for one user turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageType {
    Emotional,
    Logical,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emotional => "emotional",
            Self::Logical => "logical",
        }
    }
}

/// Structured shape the model is asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageClassification {
    pub message_type: MessageType,
}

impl MessageClassification {
    pub const NAME: &'static str = "MessageClassification";

    /// JSON Schema for the classifier's reply.
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message_type": {
                    "type": "string",
                    "enum": [MessageType::Emotional.as_str(), MessageType::Logical.as_str()],
                }
            },
            "required": ["message_type"],
            "additionalProperties": false,
        })
    }

    /// Settings that ask the server to constrain output to [`Self::json_schema`].
    pub fn settings() -> GenerationSettings {
        GenerationSettings::builder()
            .response_format(ResponseFormat::JsonSchema {
                schema: Self::json_schema(),
                name: Self::NAME.to_string(),
            })
            .build()
    }
}

/// What to do when the model's reply does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierFallback {
    /// Propagate the parse error and end the session.
    Strict,
    /// Log a warning and use this tag.
    Default(MessageType),
}

impl Default for ClassifierFallback {
    fn default() -> Self {
        Self::Default(MessageType::Logical)
    }
}

impl ClassifierFallback {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::default()
        }
    }
}

/// Tags the latest user turn with a [`MessageType`].
pub struct ClassifierNode {
    provider: Arc<dyn ModelProvider>,
    fallback: ClassifierFallback,
}

impl ClassifierNode {
    pub fn new(provider: Arc<dyn ModelProvider>, fallback: ClassifierFallback) -> Self {
        Self { provider, fallback }
    }

    /// Classify one message. Only the message itself is sent, never history.
    ///
    /// The request carries a JSON Schema response format. Servers that ignore
    /// it still get the worked examples in the prompt, and the reply is
    /// parsed leniently either way.
    pub async fn classify(&self, text: &str) -> Result<MessageType, ParleyError> {
        let messages = vec![
            ModelMessage::system(CLASSIFIER_PROMPT),
            ModelMessage::user(text),
        ];
        let response = generate_text(
            self.provider.as_ref(),
            messages,
            MessageClassification::settings(),
        )
        .await?;
        let raw = response.text;

        match parse_object::<MessageClassification>(&raw, MessageClassification::NAME) {
            Ok(parsed) => {
                debug!(message_type = %parsed.message_type, "classified message");
                Ok(parsed.message_type)
            }
            Err(err) => match self.fallback {
                ClassifierFallback::Strict => Err(err),
                ClassifierFallback::Default(tag) => {
                    warn!(error = %err, fallback = %tag, "classifier output did not parse");
                    Ok(tag)
                }
            },
        }
    }
}

#[async_trait]
impl Node<ChatState> for ClassifierNode {
    async fn run(&self, mut state: ChatState) -> Result<ChatState, ParleyError> {
        let text = state.pending_user_turn()?.text_content();
        state.message_type = Some(self.classify(&text).await?);
        Ok(state)
    }
}
