//! Error types for Parley.

use thiserror::Error;

/// Primary error type for all Parley operations.
#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not parse {what} from model output: {raw:?}")]
    Parse { what: String, raw: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Errors raised while compiling or running a state graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge names a node that was never added.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge leaves `START`, or more than one does.
    #[error("graph must have exactly one entry edge, found {0}")]
    EntryPoint(usize),

    /// A node has no outgoing edge.
    #[error("node has no outgoing edge: {0}")]
    DeadEnd(String),

    /// A node has more than one outgoing edge.
    #[error("node has more than one outgoing edge: {0}")]
    FanOut(String),

    /// A node id was registered twice, or collides with a reserved id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// A conditional router returned a key with no mapped target.
    #[error("router on '{node}' returned unmapped branch '{branch}'")]
    UnmappedBranch { node: String, branch: String },

    /// A single invocation exceeded the step limit.
    #[error("graph exceeded {0} steps without reaching END")]
    StepLimit(usize),
}

impl ParleyError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a structured-output parse error.
    pub fn parse(what: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            raw: raw.into(),
        }
    }

    /// Whether the error came from the model boundary rather than local logic.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Network(_) | Self::Timeout(_) | Self::ModelNotFound(_)
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ParleyError>;
