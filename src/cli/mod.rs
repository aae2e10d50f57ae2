//! CLI entry point for Parley.

mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ParleyConfig;
use crate::error::{ParleyError, Result};

pub use run::run;

/// Talk to a local model through a small conversation graph.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about = "Conversational graphs over a local language model")]
pub struct Cli {
    /// Model to use (provider:model, e.g. ollama:llama3.2)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Config file (defaults to ~/.parley/config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message and print the reply
    Echo,
    /// Classify each message and answer with the matching persona; `exit` quits
    Route(RouteArgs),
    /// Chat with a tool-using agent backed by an MCP server; `quit` quits
    Agent(AgentArgs),
}

/// Arguments for `parley route`.
#[derive(Args, Debug, Default)]
pub struct RouteArgs {
    /// End the session when the classifier reply does not parse
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `parley agent`.
#[derive(Args, Debug, Default)]
pub struct AgentArgs {
    /// MCP server command (defaults to the configured one)
    #[arg(long)]
    pub server: Option<String>,

    /// Argument for the server command; repeat for more
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Environment entry for the server, as KEY=VALUE; repeat for more
    #[arg(long = "env", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

fn parse_env_pair(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

impl Cli {
    /// Layered config with command-line overrides applied last.
    pub fn resolve_config(&self) -> Result<ParleyConfig> {
        let mut config = ParleyConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ParleyConfig) -> Result<()> {
        if let Some(model) = &self.model {
            config.model = model.parse()?;
        }

        match &self.command {
            Commands::Echo => {}
            Commands::Route(args) => {
                if args.strict {
                    config.classifier_strict = true;
                }
            }
            Commands::Agent(args) => {
                if let Some(server) = &args.server {
                    if server.trim().is_empty() {
                        return Err(ParleyError::InvalidArgument(
                            "--server must not be empty".into(),
                        ));
                    }
                    config.mcp.command = server.clone();
                    config.mcp.args.clear();
                }
                if !args.args.is_empty() {
                    config.mcp.args = args.args.clone();
                }
                config.mcp.env.extend(args.env.iter().cloned());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LanguageModel, OllamaModel};

    #[test]
    fn parse_echo_with_global_model() {
        let cli = Cli::try_parse_from(["parley", "echo", "--model", "ollama:mistral"]).unwrap();
        assert!(matches!(cli.command, Commands::Echo));
        assert_eq!(cli.model.as_deref(), Some("ollama:mistral"));
    }

    #[test]
    fn parse_route_strict() {
        let cli = Cli::try_parse_from(["parley", "route", "--strict"]).unwrap();
        match cli.command {
            Commands::Route(args) => assert!(args.strict),
            other => panic!("expected Route, got {other:?}"),
        }
    }

    #[test]
    fn parse_agent_server_args_and_env() {
        let cli = Cli::try_parse_from([
            "parley",
            "agent",
            "--server",
            "npx",
            "--arg",
            "-y",
            "--arg",
            "firecrawl-mcp",
            "--env",
            "FIRECRAWL_API_KEY=fc-123",
        ])
        .unwrap();
        match cli.command {
            Commands::Agent(args) => {
                assert_eq!(args.server.as_deref(), Some("npx"));
                assert_eq!(args.args, vec!["-y", "firecrawl-mcp"]);
                assert_eq!(
                    args.env,
                    vec![("FIRECRAWL_API_KEY".to_string(), "fc-123".to_string())]
                );
            }
            other => panic!("expected Agent, got {other:?}"),
        }
    }

    #[test]
    fn bad_env_pair_is_rejected() {
        assert!(Cli::try_parse_from(["parley", "agent", "--env", "NOEQUALS"]).is_err());
        assert!(Cli::try_parse_from(["parley", "agent", "--env", "=value"]).is_err());
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["parley"]).is_err());
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::try_parse_from([
            "parley",
            "agent",
            "-m",
            "qwen2.5",
            "--server",
            "uvx",
            "--arg",
            "mcp-server-fetch",
        ])
        .unwrap();
        let mut config = ParleyConfig::new();
        config.mcp.args = vec!["stale".into()];
        cli.apply_overrides(&mut config).unwrap();

        assert_eq!(config.model, LanguageModel::Ollama(OllamaModel::Qwen25));
        assert_eq!(config.mcp.command, "uvx");
        assert_eq!(config.mcp.args, vec!["mcp-server-fetch"]);
    }

    #[test]
    fn server_without_args_drops_configured_args() {
        let cli = Cli::try_parse_from(["parley", "agent", "--server", "my-server"]).unwrap();
        let mut config = ParleyConfig::new();
        config.mcp.args = vec!["-y".into(), "firecrawl-mcp".into()];
        cli.apply_overrides(&mut config).unwrap();
        assert!(config.mcp.args.is_empty());
    }

    #[test]
    fn route_strict_sets_classifier_mode() {
        let cli = Cli::try_parse_from(["parley", "route", "--strict"]).unwrap();
        let mut config = ParleyConfig::new();
        cli.apply_overrides(&mut config).unwrap();
        assert!(config.classifier_strict);
    }
}
