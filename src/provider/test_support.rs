//! Scripted provider for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ParleyError;

use super::{ModelProvider, ProviderRequest, ProviderResponse};

/// Replays queued responses and records every request it receives.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, ParleyError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_replies(replies: &[&str]) -> Self {
        let provider = Self::new();
        for reply in replies {
            provider.push_text(reply);
        }
        provider
    }

    pub(crate) fn push_text(&self, text: &str) {
        self.push(Ok(ProviderResponse::text(text)));
    }

    pub(crate) fn push(&self, response: Result<ProviderResponse, ParleyError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ParleyError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ParleyError::InvalidState("no scripted response left".into())))
    }
}
