//! Stdio launch parameters for the tool server.

use std::collections::HashMap;

use tokio::process::Command;

use crate::config::McpServerConfig;

/// How to spawn an MCP server as a child process.
///
/// The child does not inherit the parent environment. It sees `PATH` (so
/// launchers like `npx` resolve) plus the configured `env` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioServerParams {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl StdioServerParams {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Build the child command with the given `PATH`.
    pub(crate) fn command_with_path(&self, path: Option<&str>) -> Command {
        let mut command = Command::new(&self.command);
        command.args(&self.args).env_clear();
        if let Some(path) = path {
            command.env("PATH", path);
        }
        command.envs(&self.env);
        command
    }

    /// Build the child command, forwarding the current `PATH`.
    pub fn to_command(&self) -> Command {
        let path = std::env::var("PATH").ok();
        self.command_with_path(path.as_deref())
    }
}

impl From<&McpServerConfig> for StdioServerParams {
    fn from(config: &McpServerConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
        }
    }
}
