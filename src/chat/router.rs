//! Branch selection for the router graph.

use async_trait::async_trait;
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::ParleyError;
use crate::graph::Node;

use super::classifier::MessageType;
use super::state::ChatState;

/// Which persona answers the turn. The string form doubles as the node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Branch {
    Therapist,
    Logical,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Therapist => "therapist",
            Self::Logical => "logical",
        }
    }
}

/// Maps a raw classification tag to a branch. Anything other than
/// `"emotional"` goes to the logical persona.
pub fn route(tag: Option<&str>) -> Branch {
    match tag {
        Some("emotional") => Branch::Therapist,
        _ => Branch::Logical,
    }
}

/// Typed form of [`route`].
pub fn route_tag(tag: Option<MessageType>) -> Branch {
    route(tag.as_ref().map(MessageType::as_str))
}

/// Pass-through node. The branch decision lives on the conditional edge
/// leaving it, so the graph can be inspected without a model call.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouterNode;

#[async_trait]
impl Node<ChatState> for RouterNode {
    async fn run(&self, state: ChatState) -> Result<ChatState, ParleyError> {
        debug!(
            message_type = ?state.message_type,
            branch = %route_tag(state.message_type),
            "routing turn"
        );
        Ok(state)
    }
}
