//! Expose MCP server tools to the agent.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::tools::{
    AgentToolParameters, DynamicTool, DynamicToolAdapter, DynamicToolProvider, Tool,
    ToolArguments, ToolExecutionContext,
};

use super::client::MCPClient;
use super::schema::MCPToolSchema;

/// Adapts an MCP client to the [`DynamicToolProvider`] trait.
pub struct MCPToolAdapter {
    client: Arc<MCPClient>,
}

impl MCPToolAdapter {
    pub fn new(client: Arc<MCPClient>) -> Self {
        Self { client }
    }

    /// List the server's tools once and wrap each for the agent.
    pub async fn load_tools(client: Arc<MCPClient>) -> Result<Vec<Arc<dyn Tool>>, ParleyError> {
        DynamicToolAdapter::discover(Arc::new(Self::new(client))).await
    }
}

#[async_trait]
impl DynamicToolProvider for MCPToolAdapter {
    async fn list_tools(&self) -> Result<Vec<DynamicTool>, ParleyError> {
        let tools = self.client.list_tools().await?;
        Ok(tools.into_iter().map(DynamicTool::from).collect())
    }

    async fn execute_tool(
        &self,
        name: &str,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, ParleyError> {
        let result = self.client.call_tool(name, args.raw().clone()).await?;
        Ok(result.into_value_or_text())
    }
}

impl From<MCPToolSchema> for DynamicTool {
    fn from(tool: MCPToolSchema) -> Self {
        DynamicTool {
            name: tool.name,
            description: tool.description.unwrap_or_default(),
            parameters: AgentToolParameters::from_schema(tool.input_schema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::client::test_support::FakeServer;
    use serde_json::json;

    #[test]
    fn schema_converts_to_dynamic_tool() {
        let dynamic = DynamicTool::from(MCPToolSchema {
            name: "search".into(),
            description: None,
            input_schema: json!({
                "type": "object",
                "properties": { "q": { "type": "string" } }
            }),
        });

        assert_eq!(dynamic.name, "search");
        assert_eq!(dynamic.description, "");
        assert_eq!(dynamic.parameters.schema["properties"]["q"]["type"], "string");
    }

    #[tokio::test]
    async fn loaded_tools_call_through_to_server() {
        let client = Arc::new(FakeServer::with_tools(&["firecrawl_scrape"]).client());
        let tools = MCPToolAdapter::load_tools(Arc::clone(&client)).await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].description(), "firecrawl_scrape tool");

        let out = tools[0]
            .execute(
                &ToolArguments::new(json!({"url": "https://a.b"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap();
        assert!(out.as_str().unwrap().contains("https://a.b"));
        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn server_side_tool_error_propagates() {
        let mut server = FakeServer::with_tools(&["firecrawl_scrape"]);
        server.fail_calls = true;
        let adapter = MCPToolAdapter::new(Arc::new(server.client()));

        let err = adapter
            .execute_tool(
                "firecrawl_scrape",
                &ToolArguments::new(json!({})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ParleyError::ToolExecution { tool_name, .. } if tool_name == "firecrawl_scrape"
        ));
    }

    #[tokio::test]
    async fn closed_client_fails_tool_calls() {
        let client = Arc::new(FakeServer::with_tools(&["scrape"]).client());
        client.close().await.unwrap();
        let adapter = MCPToolAdapter::new(client);

        let err = adapter.list_tools().await.unwrap_err();
        assert!(matches!(err, ParleyError::Stream(_)));
    }
}
