//! Tool parameter schemas.

use serde::{Deserialize, Serialize};

/// JSON Schema describing a tool's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentToolParameters {
    pub schema: serde_json::Value,
}

impl AgentToolParameters {
    /// Wrap a raw JSON Schema. A missing or non-object schema becomes the
    /// empty object schema, since chat endpoints reject anything else.
    pub fn from_schema(schema: serde_json::Value) -> Self {
        if schema.is_object() {
            Self { schema }
        } else {
            Self::empty()
        }
    }

    /// Schema for a tool that takes no parameters.
    pub fn empty() -> Self {
        Self {
            schema: serde_json::json!({
                "type": "object",
                "properties": {},
            }),
        }
    }
}

impl Default for AgentToolParameters {
    fn default() -> Self {
        Self::empty()
    }
}
