//! Command handlers.

use std::io;

use tracing::debug;

use crate::chat::{build_echo_graph, build_router_graph, ClassifierFallback};
use crate::error::Result;
use crate::mcp::StdioServerParams;
use crate::provider::create_provider;
use crate::session::{run_agent_session, run_router_loop, run_single_turn};

use super::{Cli, Commands};

/// Run the selected command against stdin and stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let provider = create_provider(&config)?;
    debug!(model = %config.model, command = ?cli.command, "starting session");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    match cli.command {
        Commands::Echo => {
            let graph = build_echo_graph(provider)?;
            run_single_turn(&graph, &mut input, &mut output).await
        }
        Commands::Route(_) => {
            let fallback = ClassifierFallback::from_strict(config.classifier_strict);
            let graph = build_router_graph(provider, fallback)?;
            run_router_loop(&graph, &mut input, &mut output).await?;
            Ok(())
        }
        Commands::Agent(_) => {
            let params = StdioServerParams::from(&config.mcp);
            run_agent_session(
                provider,
                &params,
                &config.agent_system_prompt,
                &mut input,
                &mut output,
            )
            .await
        }
    }
}
