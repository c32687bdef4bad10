//! Offline responder for `--dry-run`: answers every prompt with the prompt itself.

use async_trait::async_trait;

use biasprobe_core::{GenerationRequest, ModelResponse, Responder, Result};

#[derive(Debug, Clone)]
pub struct EchoResponder {
    model: String,
}

impl EchoResponder {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

#[async_trait]
impl Responder for EchoResponder {
    fn provider_name(&self) -> &str {
        "echo"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_response(&self, request: &GenerationRequest) -> Result<ModelResponse> {
        Ok(ModelResponse {
            content: request.prompt.clone(),
            tokens_used: request.prompt.split_whitespace().count() as u32,
            response_time_ms: 0,
        })
    }
}
