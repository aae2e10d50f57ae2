//! State graph: nodes, plain and conditional edges, compile and invoke.
//!
//! Build a [`StateGraph`] with `add_node` / `add_edge` /
//! `add_conditional_edges`, `compile` it, then `invoke` the result with an
//! initial state. Control always enters at [`START`] and stops at [`END`].

mod compiled;
mod node;
mod state_graph;

pub use compiled::CompiledStateGraph;
pub use node::{FnNode, Node};
pub use state_graph::StateGraph;

/// Virtual entry node id.
pub const START: &str = "__start__";

/// Virtual exit node id.
pub const END: &str = "__end__";

/// Upper bound on node executions in a single `invoke`.
pub const MAX_STEPS: usize = 64;
