//! Graph builders for the echo and router flows.

use std::sync::Arc;

use crate::error::ParleyError;
use crate::graph::{CompiledStateGraph, StateGraph, END, START};
use crate::provider::ModelProvider;

use super::chatbot::ChatbotNode;
use super::classifier::{ClassifierFallback, ClassifierNode};
use super::persona::PersonaNode;
use super::router::{route_tag, Branch, RouterNode};
use super::state::ChatState;
use super::{CHATBOT, CLASSIFIER, ROUTER};

/// `START → chatbot → END`
pub fn build_echo_graph(
    provider: Arc<dyn ModelProvider>,
) -> Result<CompiledStateGraph<ChatState>, ParleyError> {
    let mut graph = StateGraph::new();
    graph
        .add_node(CHATBOT, Box::new(ChatbotNode::new(provider)))
        .add_edge(START, CHATBOT)
        .add_edge(CHATBOT, END);
    graph.compile()
}

/// `START → classifier → router → {therapist | logical} → END`
pub fn build_router_graph(
    provider: Arc<dyn ModelProvider>,
    fallback: ClassifierFallback,
) -> Result<CompiledStateGraph<ChatState>, ParleyError> {
    let therapist = Branch::Therapist.as_str();
    let logical = Branch::Logical.as_str();

    let mut graph = StateGraph::new();
    graph
        .add_node(
            CLASSIFIER,
            Box::new(ClassifierNode::new(provider.clone(), fallback)),
        )
        .add_node(ROUTER, Box::new(RouterNode))
        .add_node(therapist, Box::new(PersonaNode::therapist(provider.clone())?))
        .add_node(logical, Box::new(PersonaNode::logical(provider)?))
        .add_edge(START, CLASSIFIER)
        .add_edge(CLASSIFIER, ROUTER)
        .add_conditional_edges(
            ROUTER,
            |state: &ChatState| route_tag(state.message_type).as_str().to_string(),
            [(therapist, therapist), (logical, logical)],
        )
        .add_edge(therapist, END)
        .add_edge(logical, END);
    graph.compile()
}
