//! The three interactive loops.

use std::io::{BufRead, Write};
#[cfg(feature = "mcp")]
use std::sync::Arc;

use tracing::{debug, warn};

use crate::agent::ReactAgent;
use crate::chat::ChatState;
use crate::error::ParleyError;
use crate::graph::CompiledStateGraph;
#[cfg(feature = "mcp")]
use crate::provider::ModelProvider;
use crate::types::ModelMessage;

use super::input::{read_input, Input, EXIT_SENTINEL, QUIT_SENTINEL};
use super::phase::{SessionEvent, SessionPhase};

/// Width of the rule printed under the tool list.
pub const TOOL_RULE_WIDTH: usize = 60;

fn prompt<R: BufRead, W: Write>(
    reader: &mut R,
    output: &mut W,
    text: &str,
    sentinel: &str,
) -> Result<Input, ParleyError> {
    write!(output, "{text}")?;
    output.flush()?;
    read_input(reader, sentinel)
}

/// Ask once, answer once. `exit` or end of input ends the session without
/// a model call.
pub async fn run_single_turn<R: BufRead, W: Write>(
    graph: &CompiledStateGraph<ChatState>,
    reader: &mut R,
    output: &mut W,
) -> Result<(), ParleyError> {
    let text = match prompt(reader, output, "Enter Message: ", EXIT_SENTINEL)? {
        Input::Exit => {
            debug!("single turn ended before any message");
            return Ok(());
        }
        Input::Message(text) => text,
    };

    let state = graph.invoke(ChatState::with_user(text)).await?;
    writeln!(output, "{}", state.last_reply().unwrap_or_default())?;
    Ok(())
}

/// Classify-and-route loop. Ends on `exit` or end of input.
///
/// Any model or parse error ends the session and is returned.
pub async fn run_router_loop<R: BufRead, W: Write>(
    graph: &CompiledStateGraph<ChatState>,
    reader: &mut R,
    output: &mut W,
) -> Result<ChatState, ParleyError> {
    let mut state = ChatState::new();
    let mut phase = SessionPhase::AwaitingInput;

    loop {
        let input = prompt(reader, output, "Message: ", EXIT_SENTINEL)?;
        let text = match input {
            Input::Exit => {
                phase = phase.advance(SessionEvent::Exit)?;
                debug!(%phase, "session ended");
                writeln!(output, "Bye")?;
                return Ok(state);
            }
            Input::Message(text) => text,
        };

        phase = phase.advance(SessionEvent::Message)?;
        state.push_user(text);

        let mut current = phase;
        state = graph
            .invoke_observed(state, |node| {
                let Some(event) = SessionEvent::entering(node) else {
                    return;
                };
                match current.advance(event) {
                    Ok(next) => {
                        debug!(from = %current, to = %next, "session phase");
                        current = next;
                    }
                    Err(e) => warn!(error = %e, node, "unexpected graph step"),
                }
            })
            .await?;
        phase = current.advance(SessionEvent::Responded)?;

        writeln!(
            output,
            "Assistant: {}",
            state.last_reply().unwrap_or_default()
        )?;
    }
}

/// Tool-agent loop. Ends on `quit` or end of input.
///
/// Per-turn failures are printed and the loop carries on. Returns the
/// transcript as it stood when the session ended.
pub async fn run_agent_loop<R: BufRead, W: Write>(
    agent: &ReactAgent,
    system_prompt: &str,
    reader: &mut R,
    output: &mut W,
) -> Result<Vec<ModelMessage>, ParleyError> {
    let names = agent.tool_names();
    if names.is_empty() {
        writeln!(output, "Available tools -")?;
    } else {
        writeln!(output, "Available tools - {}", names.join(" "))?;
    }
    writeln!(output, "{}", "-".repeat(TOOL_RULE_WIDTH))?;

    let mut messages = vec![ModelMessage::system(system_prompt)];

    loop {
        let text = match prompt(reader, output, "\nYou: ", QUIT_SENTINEL)? {
            Input::Exit => {
                writeln!(output, "Goodbye")?;
                return Ok(messages);
            }
            Input::Message(text) => text,
        };
        messages.push(ModelMessage::user(text));

        match agent.invoke(messages.clone()).await {
            Ok(result) => {
                debug!(iterations = result.iterations, "agent turn finished");
                writeln!(output, "\nAgent:  {}", result.text)?;
                messages = result.messages;
            }
            Err(e) => {
                warn!(error = %e, "agent turn failed");
                writeln!(output, "Error:  {e}")?;
            }
        }
    }
}

/// Start the tool server, load its tools, and run [`run_agent_loop`].
///
/// The server is shut down on every exit path. Startup failures are
/// returned; per-turn failures are not.
#[cfg(feature = "mcp")]
pub async fn run_agent_session<R: BufRead, W: Write>(
    provider: Arc<dyn ModelProvider>,
    params: &crate::mcp::StdioServerParams,
    system_prompt: &str,
    reader: &mut R,
    output: &mut W,
) -> Result<(), ParleyError> {
    crate::mcp::MCPClient::scoped(params, |client| async move {
        run_agent_with_client(provider, client, system_prompt, reader, output).await?;
        Ok::<(), ParleyError>(())
    })
    .await
}

/// Load every tool `client` offers and run [`run_agent_loop`] over them.
/// An empty tool list still starts the loop.
#[cfg(feature = "mcp")]
pub async fn run_agent_with_client<R: BufRead, W: Write>(
    provider: Arc<dyn ModelProvider>,
    client: Arc<crate::mcp::MCPClient>,
    system_prompt: &str,
    reader: &mut R,
    output: &mut W,
) -> Result<Vec<ModelMessage>, ParleyError> {
    let tools = crate::mcp::MCPToolAdapter::load_tools(client).await?;
    debug!(tools = tools.len(), "tool server ready");
    let agent = ReactAgent::new(provider).with_tools(tools);
    run_agent_loop(&agent, system_prompt, reader, output).await
}
