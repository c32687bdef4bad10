//! Ollama responder over the `/api/generate` endpoint.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use biasprobe_core::{GenerationRequest, HarnessError, ModelResponse, Responder, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone)]
pub struct OllamaResponder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaResponder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarnessError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize, PartialEq)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

impl<'a> GenerateBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
    error: Option<String>,
}

impl GenerateReply {
    fn into_model_response(self, elapsed: Duration) -> Result<ModelResponse> {
        if let Some(error) = self.error {
            return Err(HarnessError::Responder(format!("ollama: {error}")));
        }
        Ok(ModelResponse {
            content: self.response,
            tokens_used: self.prompt_eval_count + self.eval_count,
            response_time_ms: elapsed.as_millis() as u64,
        })
    }
}

#[async_trait]
impl Responder for OllamaResponder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_response(&self, request: &GenerationRequest) -> Result<ModelResponse> {
        let start = Instant::now();
        let body = GenerateBody::from_request(request);
        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| HarnessError::Responder(format!("ollama request failed: {e}")))?;

        let status = response.status();
        let reply: GenerateReply = response
            .json()
            .await
            .map_err(|e| HarnessError::Responder(format!("ollama returned {status}: {e}")))?;
        debug!(status = %status, model = %request.model, "ollama replied");
        reply.into_model_response(start.elapsed())
    }
}
