//! MCP client over an rmcp session.

use std::future::Future;
use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientInfo, Content, JsonObject, ProtocolVersion,
        ResourceContents,
    },
    service::{
        ClientInitializeError, DynService, RoleClient, RunningService, ServiceError, ServiceExt,
    },
    transport::TokioChildProcess,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ParleyError;

use super::schema::MCPToolSchema;
use super::transport::StdioServerParams;

type DynClientService = Box<dyn DynService<RoleClient>>;
pub type MCPRunningService = RunningService<RoleClient, DynClientService>;

/// Output of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct MCPToolCallResult {
    pub structured_content: Option<serde_json::Value>,
    pub text_content: Option<String>,
    pub content: Vec<serde_json::Value>,
}

impl MCPToolCallResult {
    pub fn into_value_or_text(self) -> serde_json::Value {
        if let Some(structured) = self.structured_content {
            return structured;
        }
        if let Some(text) = self.text_content {
            return serde_json::Value::String(text);
        }
        serde_json::Value::Array(self.content)
    }
}

/// Client for one MCP server session.
///
/// Calls take `&self`, so a client can be shared behind an `Arc` by every
/// tool it exposes. Once [`close`](Self::close) runs, all calls fail.
pub struct MCPClient {
    session: Mutex<Option<MCPRunningService>>,
}

impl MCPClient {
    /// Spawn the server and run the initialize handshake.
    pub async fn connect(params: &StdioServerParams) -> Result<Self, ParleyError> {
        info!(command = %params.command, args = ?params.args, "starting MCP server");
        let transport = TokioChildProcess::new(params.to_command()).map_err(|e| {
            ParleyError::Provider {
                provider: "mcp".into(),
                message: format!("failed to spawn '{}': {e}", params.command),
            }
        })?;

        let client_info = ClientInfo {
            protocol_version: ProtocolVersion::LATEST,
            ..Default::default()
        };
        let client = Self::from_running_service_result(client_info.into_dyn().serve(transport).await)?;
        info!("MCP session initialized");
        Ok(client)
    }

    /// Wrap a session whose handshake already completed.
    pub fn from_running_service(session: MCPRunningService) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    pub fn from_running_service_result(
        result: Result<MCPRunningService, ClientInitializeError>,
    ) -> Result<Self, ParleyError> {
        result
            .map(Self::from_running_service)
            .map_err(map_client_initialize_error)
    }

    /// Connect, run `body`, then close the session whatever `body` returned.
    pub async fn scoped<F, Fut, T>(params: &StdioServerParams, body: F) -> Result<T, ParleyError>
    where
        F: FnOnce(Arc<MCPClient>) -> Fut,
        Fut: Future<Output = Result<T, ParleyError>>,
    {
        Self::connect(params).await?.scope(body).await
    }

    /// Run `body` with this client, then close it.
    ///
    /// An error from `body` wins over an error from closing.
    pub async fn scope<F, Fut, T>(self, body: F) -> Result<T, ParleyError>
    where
        F: FnOnce(Arc<MCPClient>) -> Fut,
        Fut: Future<Output = Result<T, ParleyError>>,
    {
        let client = Arc::new(self);
        let outcome = body(Arc::clone(&client)).await;
        let closed = client.close().await;

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!(error = %close_err, "MCP close failed after session error");
                Err(err)
            }
        }
    }

    pub async fn is_closed(&self) -> bool {
        match self.session.lock().await.as_ref() {
            Some(session) => session.is_closed(),
            None => true,
        }
    }

    /// List every tool the server offers, following pagination.
    pub async fn list_tools(&self) -> Result<Vec<MCPToolSchema>, ParleyError> {
        let guard = self.session.lock().await;
        let session = active(guard.as_ref())?;

        let tools = match session.list_all_tools().await {
            Ok(tools) => tools,
            Err(ServiceError::UnexpectedResponse) => {
                let page = session
                    .list_tools(None)
                    .await
                    .map_err(|e| map_service_error("list_tools", e))?;
                page.tools
            }
            Err(e) => return Err(map_service_error("list_tools", e)),
        };

        debug!(count = tools.len(), "listed MCP tools");
        Ok(tools.into_iter().map(MCPToolSchema::from).collect())
    }

    /// Execute a tool on the server.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, ParleyError> {
        let arguments = coerce_tool_arguments(arguments)?;
        let guard = self.session.lock().await;
        let session = active(guard.as_ref())?;

        debug!(tool = name, "calling MCP tool");
        let result = session
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|e| map_service_error("call_tool", e))?;

        map_call_result(name, result)
    }

    /// Shut the session down. Safe to call more than once.
    pub async fn close(&self) -> Result<(), ParleyError> {
        let Some(session) = self.session.lock().await.take() else {
            return Ok(());
        };
        let reason = session
            .cancel()
            .await
            .map_err(|e| ParleyError::Stream(format!("MCP session task failed: {e}")))?;
        info!(reason = ?reason, "MCP session closed");
        Ok(())
    }
}

fn active(session: Option<&MCPRunningService>) -> Result<&MCPRunningService, ParleyError> {
    match session {
        Some(session) if !session.is_closed() => Ok(session),
        _ => Err(ParleyError::Stream("MCP session is closed".into())),
    }
}

fn coerce_tool_arguments(value: serde_json::Value) -> Result<Option<JsonObject>, ParleyError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                ParleyError::InvalidArgument(format!("MCP tool arguments must be valid JSON: {e}"))
            })?;
            coerce_tool_arguments(parsed)
        }
        other => Err(ParleyError::InvalidArgument(format!(
            "MCP tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> Option<String> {
    let lines: Vec<String> = content
        .iter()
        .filter_map(|item| {
            if let Some(text) = item.as_text() {
                return Some(text.text.clone());
            }
            match &item.as_resource()?.resource {
                ResourceContents::TextResourceContents { text, .. } => Some(text.clone()),
                _ => None,
            }
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn map_call_result(name: &str, result: CallToolResult) -> Result<MCPToolCallResult, ParleyError> {
    let text_content = extract_text_content(&result.content);
    let content = result
        .content
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect::<Vec<_>>();

    if result.is_error.unwrap_or(false) {
        let message = result
            .structured_content
            .as_ref()
            .map(|v| v.to_string())
            .or_else(|| text_content.clone())
            .unwrap_or_else(|| "MCP tool returned an error result".into());

        return Err(ParleyError::ToolExecution {
            tool_name: name.to_string(),
            message,
        });
    }

    Ok(MCPToolCallResult {
        structured_content: result.structured_content,
        text_content,
        content,
    })
}

fn map_client_initialize_error(error: ClientInitializeError) -> ParleyError {
    match error {
        ClientInitializeError::ConnectionClosed(context) => {
            ParleyError::Stream(format!("MCP initialize connection closed: {context}"))
        }
        ClientInitializeError::TransportError { error, context } => ParleyError::Stream(format!(
            "MCP initialize transport error ({context}): {error}"
        )),
        ClientInitializeError::JsonRpcError(error) => ParleyError::Provider {
            provider: "mcp".into(),
            message: format!(
                "MCP initialize JSON-RPC error {}: {}",
                error.code.0, error.message
            ),
        },
        ClientInitializeError::Cancelled => ParleyError::Stream("MCP initialize cancelled".into()),
        other => ParleyError::Provider {
            provider: "mcp".into(),
            message: format!("MCP initialize error: {other}"),
        },
    }
}

fn map_service_error(context: &str, error: ServiceError) -> ParleyError {
    match error {
        ServiceError::McpError(error) => ParleyError::Provider {
            provider: "mcp".into(),
            message: format!("{context}: MCP error {}: {}", error.code.0, error.message),
        },
        ServiceError::TransportSend(error) => {
            ParleyError::Stream(format!("{context}: MCP transport send failed: {error}"))
        }
        ServiceError::TransportClosed => {
            ParleyError::Stream(format!("{context}: MCP transport closed"))
        }
        ServiceError::UnexpectedResponse => ParleyError::Provider {
            provider: "mcp".into(),
            message: format!("{context}: unexpected MCP response"),
        },
        ServiceError::Cancelled { reason } => {
            let suffix = reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            ParleyError::Stream(format!("{context}: MCP request cancelled{suffix}"))
        }
        ServiceError::Timeout { timeout } => ParleyError::Timeout(timeout.as_millis() as u64),
        other => ParleyError::Provider {
            provider: "mcp".into(),
            message: format!("{context}: MCP service error: {other}"),
        },
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeServer;
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn coerce_tool_arguments_accepts_object_and_stringified_object() {
        let from_obj = coerce_tool_arguments(json!({"url":"https://a.b"}))
            .expect("object arguments should parse")
            .expect("object should be present");
        assert_eq!(from_obj.get("url"), Some(&json!("https://a.b")));

        let from_str = coerce_tool_arguments(json!(r#"{"url":"https://c.d"}"#))
            .expect("stringified object should parse")
            .expect("object should be present");
        assert_eq!(from_str.get("url"), Some(&json!("https://c.d")));

        assert!(coerce_tool_arguments(json!(null)).unwrap().is_none());
        assert!(coerce_tool_arguments(json!("  ")).unwrap().is_none());
    }

    #[test]
    fn coerce_tool_arguments_rejects_non_object() {
        let err =
            coerce_tool_arguments(json!(["bad"])).expect_err("array arguments should be rejected");
        assert!(matches!(err, ParleyError::InvalidArgument(_)));

        let err = coerce_tool_arguments(json!(r#"{"url":"x""#))
            .expect_err("malformed JSON string should be rejected");
        assert!(
            matches!(err, ParleyError::InvalidArgument(message) if message.contains("valid JSON"))
        );
    }

    #[test]
    fn map_service_error_variants() {
        let err = map_service_error("list_tools", ServiceError::UnexpectedResponse);
        assert!(matches!(
            err,
            ParleyError::Provider { provider, message }
            if provider == "mcp" && message.contains("unexpected MCP response")
        ));

        let err = map_service_error(
            "call_tool",
            ServiceError::Timeout {
                timeout: Duration::from_millis(2750),
            },
        );
        assert!(matches!(err, ParleyError::Timeout(2750)));
    }

    #[test]
    fn initialize_error_is_mapped() {
        let init_error = ClientInitializeError::JsonRpcError(
            rmcp::model::ErrorData::invalid_request("bad initialize payload", None),
        );
        let err = match MCPClient::from_running_service_result(Err(init_error)) {
            Ok(_) => panic!("initialize error should be mapped"),
            Err(err) => err,
        };
        assert!(matches!(
            err,
            ParleyError::Provider { provider, message }
            if provider == "mcp" && message.contains("bad initialize payload")
        ));
    }

    #[test]
    fn error_payload_becomes_tool_execution_error() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{ "type": "text", "text": "rate limited" }],
            "isError": true
        }))
        .expect("fixture call result should deserialize");

        let err = map_call_result("firecrawl_scrape", result).unwrap_err();
        assert!(matches!(
            err,
            ParleyError::ToolExecution { tool_name, message }
            if tool_name == "firecrawl_scrape" && message == "rate limited"
        ));
    }

    #[test]
    fn text_result_prefers_structured_content() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{ "type": "text", "text": "fallback" }],
            "structuredContent": { "title": "Example" },
            "isError": false
        }))
        .expect("fixture call result should deserialize");

        let mapped = map_call_result("scrape", result).unwrap();
        assert_eq!(mapped.text_content.as_deref(), Some("fallback"));
        assert_eq!(mapped.into_value_or_text(), json!({ "title": "Example" }));
    }

    #[tokio::test]
    async fn lists_and_calls_tools_over_session() {
        let client = FakeServer::with_tools(&["firecrawl_scrape", "firecrawl_crawl"]).client();

        let tools = client.list_tools().await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["firecrawl_scrape", "firecrawl_crawl"]);

        let result = client
            .call_tool("firecrawl_scrape", json!({"url": "https://a.b"}))
            .await
            .unwrap();
        let text = result.text_content.unwrap();
        assert!(text.starts_with("firecrawl_scrape called with"));
        assert!(text.contains("https://a.b"));

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_further_calls() {
        let client = FakeServer::with_tools(&["scrape"]).client();
        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(client.is_closed().await);

        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, ParleyError::Stream(msg) if msg.contains("closed")));
    }

    #[tokio::test]
    async fn scope_closes_on_success_and_on_error() {
        let client = FakeServer::with_tools(&["scrape"]).client();
        let mut kept = None;
        let count = client
            .scope(|client| {
                kept = Some(Arc::clone(&client));
                async move { Ok::<_, ParleyError>(client.list_tools().await?.len()) }
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(kept.unwrap().is_closed().await);

        let client = FakeServer::with_tools(&["scrape"]).client();
        let mut kept = None;
        let err = client
            .scope(|client| {
                kept = Some(Arc::clone(&client));
                async move { Err::<(), _>(ParleyError::InvalidState("body failed".into())) }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::InvalidState(msg) if msg == "body failed"));
        assert!(kept.unwrap().is_closed().await);
    }
}
