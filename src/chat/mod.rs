//! The conversational flows: state, nodes, and the graphs that wire them.
//!
//! - Echo graph: `START → chatbot → END`
//! - Router graph: `START → classifier → router → {therapist | logical} → END`

pub mod chatbot;
pub mod classifier;
pub mod graphs;
pub mod persona;
pub mod router;
pub mod state;

pub use chatbot::ChatbotNode;
pub use classifier::{
    ClassifierFallback, ClassifierNode, MessageClassification, MessageType, CLASSIFIER_PROMPT,
};
pub use graphs::{build_echo_graph, build_router_graph};
pub use persona::{PersonaNode, LOGICAL_PERSONA, THERAPIST_PERSONA};
pub use router::{route, route_tag, Branch, RouterNode};
pub use state::ChatState;

/// Node id of the single-turn responder.
pub const CHATBOT: &str = "chatbot";
/// Node id of the classifier.
pub const CLASSIFIER: &str = "classifier";
/// Node id of the router.
pub const ROUTER: &str = "router";
