//! Reason-act loop: call the model, run the tools it asks for, feed the
//! results back, and stop once it answers without tool calls.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ParleyError;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::*;

/// Model round-trips allowed per [`ReactAgent::invoke`].
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Agent bound to one provider and a fixed tool set.
pub struct ReactAgent {
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Arc<dyn Tool>>,
    settings: GenerationSettings,
    max_iterations: usize,
}

impl ReactAgent {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            settings: GenerationSettings::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Run the loop over `messages` and return the extended transcript.
    ///
    /// Tool failures and unknown tool names are reported back to the model
    /// as error results. Provider failures end the run.
    pub async fn invoke(&self, mut messages: Vec<ModelMessage>) -> Result<AgentRunResult, ParleyError> {
        let tool_defs: Option<Vec<ToolDefinition>> = if self.tools.is_empty() {
            None
        } else {
            Some(self.tools.iter().map(|t| t.definition()).collect())
        };

        let mut usage = Usage::default();
        let mut last_text = String::new();

        for iteration in 1..=self.max_iterations {
            let request = ProviderRequest {
                messages: messages.clone(),
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };

            debug!(iteration, turns = messages.len(), "agent: calling provider");
            let response = self.provider.generate_text(&request).await?;
            usage.merge(&response.usage);

            if response.tool_calls.is_empty() {
                messages.push(ModelMessage::assistant(response.text.clone()));
                return Ok(AgentRunResult {
                    text: response.text,
                    messages,
                    usage,
                    finish_reason: response.finish_reason.or(Some(FinishReason::Stop)),
                    iterations: iteration,
                });
            }

            last_text = response.text.clone();
            messages.push(ModelMessage::assistant_with_tool_calls(
                response.text,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let ctx = ToolExecutionContext {
                    tool_call_id: call.id.clone(),
                    iteration,
                };
                let result = self.run_tool(call, &ctx).await;
                messages.push(ModelMessage::tool_result(
                    result.tool_call_id,
                    result.result,
                    result.is_error,
                ));
            }
        }

        warn!(
            max_iterations = self.max_iterations,
            "agent stopped before the model produced a final answer"
        );
        Ok(AgentRunResult {
            text: last_text,
            messages,
            usage,
            finish_reason: Some(FinishReason::Length),
            iterations: self.max_iterations,
        })
    }

    async fn run_tool(&self, call: &AgentToolCall, ctx: &ToolExecutionContext) -> AgentToolResult {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            warn!(tool = %call.name, "model called an unknown tool");
            return AgentToolResult {
                tool_call_id: call.id.clone(),
                result: serde_json::json!({ "error": format!("Tool '{}' not found", call.name) }),
                is_error: true,
            };
        };

        debug!(tool = %call.name, id = %call.id, "executing tool");
        let args = ToolArguments::new(call.arguments.clone());
        match tool.execute(&args, ctx).await {
            Ok(result) => AgentToolResult {
                tool_call_id: call.id.clone(),
                result,
                is_error: false,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                AgentToolResult {
                    tool_call_id: call.id.clone(),
                    result: serde_json::json!({ "error": e.to_string() }),
                    is_error: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_support::ScriptedProvider;
    use crate::provider::ProviderResponse;
    use crate::tools::{AgentTool, AgentToolParameters};
    use serde_json::json;

    fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ProviderResponse {
        ProviderResponse {
            tool_calls: vec![AgentToolCall {
                id: id.into(),
                name: name.into(),
                arguments,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        }
    }

    fn scrape_tool() -> Arc<dyn Tool> {
        Arc::new(AgentTool::new(
            "scrape",
            "fetch a page",
            AgentToolParameters::empty(),
            |args, _ctx| async move {
                let url = args.get_str("url")?.to_string();
                Ok::<_, ParleyError>(json!(format!("<h1>{url}</h1>")))
            },
        ))
    }

    #[tokio::test]
    async fn settings_are_sent_on_every_iteration() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push(Ok(tool_call("call_0", "scrape", json!({"url": "a.test"}))));
        provider.push_text("done");
        let settings = GenerationSettings::builder()
            .temperature(0.2)
            .max_tokens(256)
            .build();
        let agent = ReactAgent::new(provider.clone())
            .with_tool(scrape_tool())
            .with_settings(settings.clone());

        agent.invoke(vec![ModelMessage::user("scrape a.test")]).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.settings == settings));
    }

    #[tokio::test]
    async fn no_tools_answers_directly_without_definitions() {
        let provider = Arc::new(ScriptedProvider::with_replies(&["Hi! How can I help?"]));
        let agent = ReactAgent::new(provider.clone());

        let result = agent
            .invoke(vec![ModelMessage::system("helper"), ModelMessage::user("hello")])
            .await
            .unwrap();

        assert_eq!(result.text, "Hi! How can I help?");
        assert_eq!(result.iterations, 1);
        assert_eq!(result.messages.len(), 3);
        assert!(result.messages[2].is_assistant());
        assert!(provider.requests()[0].tools.is_none());
    }

    #[tokio::test]
    async fn tool_results_are_fed_back_until_final_answer() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push(Ok(tool_call("call_1", "scrape", json!({"url": "https://a.b"}))));
        provider.push_text("The page says a.b");
        let agent = ReactAgent::new(provider.clone()).with_tool(scrape_tool());

        let result = agent
            .invoke(vec![ModelMessage::user("scrape https://a.b")])
            .await
            .unwrap();

        assert_eq!(result.text, "The page says a.b");
        assert_eq!(result.iterations, 2);
        assert_eq!(result.finish_reason, Some(FinishReason::Stop));

        let requests = provider.requests();
        assert_eq!(requests[0].tools.as_ref().unwrap()[0].name, "scrape");
        let fed_back = &requests[1].messages;
        assert_eq!(fed_back.len(), 3);
        match &fed_back[2].content[0] {
            ContentPart::ToolResult(r) => {
                assert_eq!(r.tool_call_id, "call_1");
                assert_eq!(r.result, json!("<h1>https://a.b</h1>"));
                assert!(!r.is_error);
            }
            other => panic!("expected tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_and_unknown_tools_become_error_results() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push(Ok(tool_call("call_1", "scrape", json!({}))));
        provider.push(Ok(tool_call("call_2", "crawl", json!({}))));
        provider.push_text("Sorry, I could not fetch that.");
        let agent = ReactAgent::new(provider.clone()).with_tool(scrape_tool());

        let result = agent.invoke(vec![ModelMessage::user("go")]).await.unwrap();
        assert_eq!(result.text, "Sorry, I could not fetch that.");

        let errors: Vec<&AgentToolResult> = result
            .messages
            .iter()
            .flat_map(|m| m.content.iter())
            .filter_map(|part| match part {
                ContentPart::ToolResult(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|r| r.is_error));
        assert!(errors[0].result["error"].as_str().unwrap().contains("url"));
        assert!(errors[1].result["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn iteration_cap_reports_length() {
        let provider = Arc::new(ScriptedProvider::new());
        for i in 0..3 {
            provider.push(Ok(tool_call(&format!("call_{i}"), "scrape", json!({"url": "x"}))));
        }
        let agent = ReactAgent::new(provider.clone())
            .with_tool(scrape_tool())
            .with_max_iterations(3);

        let result = agent.invoke(vec![ModelMessage::user("loop")]).await.unwrap();
        assert_eq!(result.finish_reason, Some(FinishReason::Length));
        assert_eq!(result.iterations, 3);
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn provider_errors_end_the_run() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push(Err(ParleyError::api(500, "boom")));
        let agent = ReactAgent::new(provider);

        let err = agent.invoke(vec![ModelMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ParleyError::Api { status: 500, .. }));
    }
}
