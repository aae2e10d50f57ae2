//! Per-turn lifecycle of the router session.

use strum::Display;

use crate::chat::{Branch, CLASSIFIER, ROUTER};
use crate::error::ParleyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionPhase {
    AwaitingInput,
    Classifying,
    Routing,
    Responding,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionEvent {
    Exit,
    Message,
    Classified,
    Routed,
    Responded,
}

impl SessionEvent {
    /// Event implied by the graph entering node `id`.
    pub fn entering(id: &str) -> Option<Self> {
        match id {
            CLASSIFIER => None,
            ROUTER => Some(Self::Classified),
            id if id == Branch::Therapist.as_str() || id == Branch::Logical.as_str() => {
                Some(Self::Routed)
            }
            _ => None,
        }
    }
}

impl SessionPhase {
    pub fn advance(self, event: SessionEvent) -> Result<Self, ParleyError> {
        use SessionEvent as E;
        use SessionPhase as P;

        match (self, event) {
            (P::AwaitingInput, E::Exit) => Ok(P::Terminated),
            (P::AwaitingInput, E::Message) => Ok(P::Classifying),
            (P::Classifying, E::Classified) => Ok(P::Routing),
            (P::Routing, E::Routed) => Ok(P::Responding),
            (P::Responding, E::Responded) => Ok(P::AwaitingInput),
            (phase, event) => Err(ParleyError::InvalidState(format!(
                "session cannot handle {event} while {phase}"
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Terminated
    }
}
