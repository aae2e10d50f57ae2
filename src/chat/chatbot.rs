//! Single-turn responder.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::generation::generate;
use crate::graph::Node;
use crate::provider::ModelProvider;
use crate::types::ModelMessage;

use super::state::ChatState;

/// Sends the whole transcript to the model and appends the reply.
pub struct ChatbotNode {
    provider: Arc<dyn ModelProvider>,
}

impl ChatbotNode {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Node<ChatState> for ChatbotNode {
    async fn run(&self, mut state: ChatState) -> Result<ChatState, ParleyError> {
        state.pending_user_turn()?;
        let reply = generate(self.provider.as_ref(), state.messages.clone()).await?;
        state.add_messages(vec![ModelMessage::assistant(reply)]);
        Ok(state)
    }
}
