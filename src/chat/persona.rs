//! Persona responders for the router graph.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ParleyError;
use crate::generation::generate;
use crate::graph::Node;
use crate::provider::ModelProvider;
use crate::types::ModelMessage;

use super::state::ChatState;

pub const THERAPIST_PERSONA: &str = "You are a compassionate therapist. Focus on the emotional aspect of the user's message.
Show empathy, validate their feelings, and help them process their emotions.
Ask thoughtful questions to help them explore their feelings more deeply.
Avoid giving logical solutions unless explicitly asked.";

pub const LOGICAL_PERSONA: &str = "You are a purely logical assistant. Focus only on facts and information.
Provide clear, concise answers based on logic and evidence.
Do not address emotions or provide emotional support.
Be direct and straightforward in your responses.";

/// Answers the latest user turn under a fixed system persona.
///
/// History is not forwarded: the model sees only the persona and the
/// current message. The reply is appended to the full transcript.
pub struct PersonaNode {
    provider: Arc<dyn ModelProvider>,
    persona: String,
    echo: Regex,
}

impl PersonaNode {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        persona: impl Into<String>,
    ) -> Result<Self, ParleyError> {
        let persona = persona.into();
        let echo = echo_pattern(&persona)?;
        Ok(Self {
            provider,
            persona,
            echo,
        })
    }

    pub fn therapist(provider: Arc<dyn ModelProvider>) -> Result<Self, ParleyError> {
        Self::new(provider, THERAPIST_PERSONA)
    }

    pub fn logical(provider: Arc<dyn ModelProvider>) -> Result<Self, ParleyError> {
        Self::new(provider, LOGICAL_PERSONA)
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Removes any copy of the persona instruction from a reply.
    fn scrub(&self, reply: &str) -> String {
        if !self.echo.is_match(reply) {
            return reply.to_string();
        }
        warn!("model echoed its persona instruction; stripping it");
        self.echo.replace_all(reply, "").trim().to_string()
    }
}

// Matches the persona regardless of how the model re-wrapped its lines.
fn echo_pattern(persona: &str) -> Result<Regex, ParleyError> {
    let words: Vec<String> = persona.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return Err(ParleyError::InvalidArgument(
            "persona instruction must not be empty".into(),
        ));
    }
    Regex::new(&words.join(r"\s+"))
        .map_err(|e| ParleyError::InvalidArgument(format!("persona pattern: {e}")))
}

#[async_trait]
impl Node<ChatState> for PersonaNode {
    async fn run(&self, mut state: ChatState) -> Result<ChatState, ParleyError> {
        let latest = state.pending_user_turn()?.text_content();
        let messages = vec![
            ModelMessage::system(self.persona.clone()),
            ModelMessage::user(latest),
        ];
        let reply = generate(self.provider.as_ref(), messages).await?;
        let reply = self.scrub(&reply);
        debug!(chars = reply.len(), "persona reply");
        state.add_messages(vec![ModelMessage::assistant(reply)]);
        Ok(state)
    }
}
