//! Convenience re-exports for common use.

pub use crate::agent::ReactAgent;
pub use crate::chat::{build_echo_graph, build_router_graph, ChatState, ClassifierFallback, MessageType};
pub use crate::config::ParleyConfig;
pub use crate::error::{ParleyError, Result};
pub use crate::models::LanguageModel;
pub use crate::provider::{create_provider, ModelProvider};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{AgentRunResult, FinishReason, GenerationSettings, ModelMessage, Role};
