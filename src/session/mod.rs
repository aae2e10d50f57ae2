//! Interactive sessions: read a line, run a flow, print the reply.
//!
//! Loops are generic over [`BufRead`](std::io::BufRead) and
//! [`Write`](std::io::Write) so tests can script stdin and capture stdout.

mod input;
mod phase;
mod runner;

pub use input::{read_input, Input, EXIT_SENTINEL, QUIT_SENTINEL};
pub use phase::{SessionEvent, SessionPhase};
#[cfg(feature = "mcp")]
pub use runner::{run_agent_session, run_agent_with_client};
pub use runner::{run_agent_loop, run_router_loop, run_single_turn, TOOL_RULE_WIDTH};
