//! Configuration system (layered: code > env > config file > defaults).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ParleyError, Result};
use crate::models::LanguageModel;

/// System prompt seeded into every tool-agent transcript.
pub const DEFAULT_AGENT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can scrape websites, crawl pages, and data using Firecrawl tools. Think step by step and use the appropriate tools to help the user.";

/// Default tool-server launcher.
pub const DEFAULT_MCP_COMMAND: &str = "npx";

/// How to launch the MCP tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_MCP_COMMAND.to_string(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }
}

/// Layered configuration for Parley.
///
/// Resolution order, lowest to highest:
/// 1. Built-in defaults (`ollama:llama3.2`, `npx`)
/// 2. TOML config file (`~/.parley/config.toml` or an explicit path)
/// 3. Environment variables (after loading `.env`)
/// 4. Explicit setters and CLI flags
#[derive(Debug, Clone)]
pub struct ParleyConfig {
    pub model: LanguageModel,
    /// Fail the session when the classifier output does not parse.
    pub classifier_strict: bool,
    /// Per-request HTTP timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub agent_system_prompt: String,
    pub mcp: McpServerConfig,
    api_keys: HashMap<String, String>,
    base_urls: HashMap<String, String>,
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            model: LanguageModel::default(),
            classifier_strict: false,
            request_timeout: None,
            agent_system_prompt: DEFAULT_AGENT_SYSTEM_PROMPT.to_string(),
            mcp: McpServerConfig::default(),
            api_keys: HashMap::new(),
            base_urls: HashMap::new(),
        }
    }
}

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    model: Option<String>,
    ollama_base_url: Option<String>,
    openai_compatible_base_url: Option<String>,
    openai_compatible_api_key: Option<String>,
    classifier_strict: Option<bool>,
    request_timeout_secs: Option<u64>,
    agent_system_prompt: Option<String>,
    mcp: Option<FileMcpConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileMcpConfig {
    command: Option<String>,
    args: Option<Vec<String>>,
    env: Option<HashMap<String, String>>,
}

impl ParleyConfig {
    /// Create config with built-in defaults only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables only (plus `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load the full layered config.
    ///
    /// An explicit `path` must exist. Without one, the default file is read
    /// only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();

        match path {
            Some(path) => config.apply_file(path)?,
            None => {
                let default_path = default_config_path();
                if default_path.is_file() {
                    config.apply_file(&default_path)?;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Merge a TOML config file over the current values.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ParleyError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        self.apply_toml(&raw)
            .map_err(|e| ParleyError::Configuration(format!("{}: {e}", path.display())))
    }

    fn apply_toml(&mut self, raw: &str) -> Result<()> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|e| ParleyError::Configuration(e.to_string()))?;

        if let Some(model) = file.model {
            self.model = model.parse()?;
        }
        if let Some(url) = file.ollama_base_url {
            self.set_base_url("ollama", url);
        }
        if let Some(url) = file.openai_compatible_base_url {
            self.set_base_url("openai-compatible", url);
        }
        if let Some(key) = file.openai_compatible_api_key {
            self.set_api_key("openai-compatible", key);
        }
        if let Some(strict) = file.classifier_strict {
            self.classifier_strict = strict;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = timeout_from_secs(secs);
        }
        if let Some(prompt) = file.agent_system_prompt {
            self.agent_system_prompt = prompt;
        }
        if let Some(mcp) = file.mcp {
            if let Some(command) = mcp.command {
                self.mcp.command = command;
            }
            if let Some(args) = mcp.args {
                self.mcp.args = args;
            }
            if let Some(env) = mcp.env {
                self.mcp.env = env;
            }
        }
        Ok(())
    }

    /// Merge environment overrides, reading variables through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("PARLEY_MODEL") {
            self.model = model.parse()?;
        }

        let url_mappings = [
            ("OLLAMA_BASE_URL", "ollama"),
            ("OPENAI_COMPAT_BASE_URL", "openai-compatible"),
        ];
        for (env_var, provider) in url_mappings {
            if let Some(url) = lookup(env_var) {
                self.set_base_url(provider, url);
            }
        }
        if let Some(key) = lookup("OPENAI_COMPAT_API_KEY") {
            self.set_api_key("openai-compatible", key);
        }

        if let Some(command) = lookup("PARLEY_MCP_COMMAND") {
            self.mcp.command = command;
        }
        if let Some(args) = lookup("PARLEY_MCP_ARGS") {
            self.mcp.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(strict) = lookup("PARLEY_CLASSIFIER_STRICT") {
            self.classifier_strict = parse_bool("PARLEY_CLASSIFIER_STRICT", &strict)?;
        }
        if let Some(secs) = lookup("PARLEY_REQUEST_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ParleyError::Configuration(format!("PARLEY_REQUEST_TIMEOUT_SECS: {e}"))
            })?;
            self.request_timeout = timeout_from_secs(secs);
        }
        Ok(())
    }

    pub fn set_api_key(&mut self, provider: &str, key: String) {
        self.api_keys.insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.get(provider).cloned()
    }

    pub fn set_base_url(&mut self, provider: &str, url: String) {
        self.base_urls.insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.get(provider).cloned()
    }
}

/// `~/.parley/config.toml`, falling back to a relative path without a home dir.
pub fn default_config_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".parley"))
        .unwrap_or_else(|| PathBuf::from(".parley"))
        .join("config.toml")
}

// Zero disables the timeout.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ParleyError::Configuration(format!(
            "{name}: expected a boolean, got '{other}'"
        ))),
    }
}
