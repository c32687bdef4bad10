//! Probe providers, responders, and the probe execution contract.
//!
//! A [`ProbeProvider`] owns the variant catalog of one probe type and scores
//! responses to it; a [`Responder`] is the model under test. Both are
//! injected, so tests use in-memory fakes and production wires real clients.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    ExecutionResult, HarnessError, Metadata, ProbeRequest, ProbeType, ProbeVariant, Result,
};

/// Prompt execution request sent to a [`Responder`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// What a responder returns for one prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelResponse {
    pub content: String,
    pub tokens_used: u32,
    pub response_time_ms: u64,
}

/// The model under test.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Provider label recorded on results (e.g. "ollama").
    fn provider_name(&self) -> &str;

    /// Model label recorded on results and sent with each request.
    fn model_name(&self) -> &str;

    async fn generate_response(&self, request: &GenerationRequest) -> Result<ModelResponse>;
}

/// Execution facts handed to the scorer alongside the response text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionMetadata {
    pub response_time_ms: u64,
    pub tokens_used: u32,
    pub temperature: f64,
    pub model_provider: String,
    pub model_name: String,
}

/// Scorer output for one response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreOutcome {
    pub bias_score: f64,
    pub confidence: f64,
    /// Scorer-specific analysis details, recorded under `scoring_details`.
    #[serde(default)]
    pub details: Metadata,
}

impl ScoreOutcome {
    pub fn new(bias_score: f64, confidence: f64) -> Self {
        Self {
            bias_score,
            confidence,
            details: Metadata::new(),
        }
    }
}

/// Variant catalog and scorer for one probe type.
pub trait ProbeProvider: Send + Sync {
    fn probe_type(&self) -> ProbeType;

    /// Catalog variants, optionally filtered to one domain.
    fn list_variants(&self, domain: Option<&str>) -> Vec<ProbeVariant>;

    fn get_variant(&self, variant_id: &str) -> Option<ProbeVariant> {
        self.list_variants(None)
            .into_iter()
            .find(|v| v.id == variant_id)
    }

    fn score_response(
        &self,
        response: &str,
        variant: &ProbeVariant,
        execution: &ExecutionMetadata,
    ) -> Result<ScoreOutcome>;
}

/// Mapping from probe type to its provider.
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    providers: HashMap<ProbeType, Arc<dyn ProbeProvider>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own probe type, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn ProbeProvider>) -> &mut Self {
        self.providers.insert(provider.probe_type(), provider);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ProbeProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, probe_type: ProbeType) -> Option<Arc<dyn ProbeProvider>> {
        self.providers.get(&probe_type).cloned()
    }

    /// Registered probe types in canonical enumeration order.
    pub fn probe_types(&self) -> Vec<ProbeType> {
        ProbeType::ALL
            .into_iter()
            .filter(|pt| self.providers.contains_key(pt))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRegistry")
            .field("probe_types", &self.probe_types())
            .finish()
    }
}

/// Execute one probe variant: ask the responder, then score the answer.
///
/// Fails with [`HarnessError::ProbeTypeMismatch`] or
/// [`HarnessError::VariantNotFound`] before contacting the responder.
/// Scores are clamped into `[0, 1]`.
#[instrument(
    skip(provider, request, responder),
    fields(probe_type = %request.probe_type, variant_id = %request.variant_id)
)]
pub async fn execute_probe(
    provider: &dyn ProbeProvider,
    request: &ProbeRequest,
    responder: &dyn Responder,
) -> Result<ExecutionResult> {
    let expected = provider.probe_type();
    if request.probe_type != expected {
        return Err(HarnessError::ProbeTypeMismatch {
            expected,
            actual: request.probe_type,
        });
    }

    let variant = provider
        .get_variant(&request.variant_id)
        .ok_or_else(|| HarnessError::VariantNotFound {
            probe_type: expected,
            variant_id: request.variant_id.clone(),
        })?;

    let request_id = Uuid::new_v4().to_string();

    let mut generation_metadata = Metadata::new();
    generation_metadata.insert("probe_type".to_string(), expected.as_str().into());
    generation_metadata.insert("variant_id".to_string(), request.variant_id.clone().into());
    generation_metadata.insert("request_id".to_string(), request_id.clone().into());
    generation_metadata.extend(request.metadata.clone());

    let generation = GenerationRequest {
        prompt: variant.prompt.clone(),
        model: request.model_name.clone(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        metadata: generation_metadata,
    };

    let start = Instant::now();
    let response = responder.generate_response(&generation).await.map_err(|e| {
        warn!(error = %e, "responder call failed");
        e
    })?;
    let response_time_ms = start.elapsed().as_millis() as u64;
    debug!(
        response_time_ms,
        reported_ms = response.response_time_ms,
        tokens = response.tokens_used,
        "responder returned"
    );

    let execution = ExecutionMetadata {
        response_time_ms,
        tokens_used: response.tokens_used,
        temperature: request.temperature,
        model_provider: request.model_provider.clone(),
        model_name: request.model_name.clone(),
    };
    let score = provider.score_response(&response.content, &variant, &execution)?;

    let mut metadata = Metadata::new();
    metadata.insert(
        "scoring_details".to_string(),
        serde_json::Value::Object(score.details.clone()),
    );
    metadata.insert(
        "variant_metadata".to_string(),
        serde_json::Value::Object(variant.metadata.clone()),
    );
    metadata.extend(request.metadata.clone());

    let result = ExecutionResult {
        request_id,
        probe_type: expected,
        variant_id: request.variant_id.clone(),
        model_provider: request.model_provider.clone(),
        model_name: request.model_name.clone(),
        prompt: variant.prompt,
        response: response.content,
        response_time_ms,
        tokens_used: response.tokens_used,
        temperature: request.temperature,
        bias_score: score.bias_score.clamp(0.0, 1.0),
        confidence: score.confidence.clamp(0.0, 1.0),
        created_at: Utc::now(),
        metadata,
    };

    info!(
        score = result.bias_score,
        confidence = result.confidence,
        "probe execution completed"
    );
    Ok(result)
}
