//! Tool-calling agent.

mod react;

pub use react::{ReactAgent, DEFAULT_MAX_ITERATIONS};
