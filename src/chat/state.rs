//! Session state shared by every node in a chat graph.

use crate::error::ParleyError;
use crate::types::{ModelMessage, Transcript};

use super::classifier::MessageType;

/// Transcript plus the classification tag for the current turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub messages: Transcript,
    pub message_type: Option<MessageType>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State holding a single user turn.
    pub fn with_user(text: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.push_user(text);
        state
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.add_messages(vec![ModelMessage::user(text)]);
    }

    /// Append-only reducer for node updates.
    pub fn add_messages(&mut self, updates: Vec<ModelMessage>) {
        self.messages.extend(updates);
    }

    /// The turn a model call must answer. Fails unless the transcript ends
    /// in a user turn.
    pub fn pending_user_turn(&self) -> Result<&ModelMessage, ParleyError> {
        match self.messages.last() {
            Some(last) if last.is_user() => Ok(last),
            Some(last) => Err(ParleyError::InvalidState(format!(
                "expected the transcript to end with a user turn, found {}",
                last.role.as_str()
            ))),
            None => Err(ParleyError::InvalidState(
                "transcript is empty; nothing to answer".into(),
            )),
        }
    }

    /// Text of the latest assistant reply, if the transcript ends in one.
    pub fn last_reply(&self) -> Option<String> {
        self.messages
            .last()
            .filter(|m| m.is_assistant())
            .map(ModelMessage::text_content)
    }
}
