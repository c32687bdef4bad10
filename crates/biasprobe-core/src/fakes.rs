//! In-memory fakes for the external collaborators (testing only).
//!
//! - [`ScriptedResponder`]: canned responses, scripted failures and delays,
//!   with call and in-flight accounting for concurrency assertions.
//! - [`StaticProbe`]: a fixed catalog scored with a constant outcome.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{HarnessError, ProbeType, ProbeVariant, Result};
use crate::probe::{
    ExecutionMetadata, GenerationRequest, ModelResponse, ProbeProvider, Responder, ScoreOutcome,
};

/// Responder whose behaviour is keyed by prompt text.
#[derive(Debug, Default)]
pub struct ScriptedResponder {
    provider: String,
    model: String,
    default_response: Option<String>,
    responses: HashMap<String, String>,
    failures: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedResponder {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Response for prompts without a scripted answer. Unset means echo the prompt.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    pub fn with_response(mut self, prompt: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(prompt.into(), response.into());
        self
    }

    /// Fail every request for `prompt`.
    pub fn failing_on(mut self, prompt: impl Into<String>) -> Self {
        self.failures.insert(prompt.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_delay_for(mut self, prompt: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(prompt.into(), delay);
        self
    }

    /// Number of `generate_response` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently running calls observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_response(&self, request: &GenerationRequest) -> Result<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let delay = self
            .delays
            .get(&request.prompt)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failures.contains(&request.prompt) {
            return Err(HarnessError::Responder(format!(
                "scripted failure for prompt: {}",
                request.prompt
            )));
        }

        let content = self
            .responses
            .get(&request.prompt)
            .or(self.default_response.as_ref())
            .cloned()
            .unwrap_or_else(|| request.prompt.clone());
        let tokens_used = content.split_whitespace().count() as u32;

        Ok(ModelResponse {
            content,
            tokens_used,
            response_time_ms: delay.as_millis() as u64,
        })
    }
}

/// Provider with a fixed catalog and a constant score.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    probe_type: ProbeType,
    variants: Vec<ProbeVariant>,
    outcome: ScoreOutcome,
}

impl StaticProbe {
    pub fn new(probe_type: ProbeType, variants: Vec<ProbeVariant>) -> Self {
        Self {
            probe_type,
            variants,
            outcome: ScoreOutcome::new(0.5, 0.8),
        }
    }

    pub fn with_score(mut self, bias_score: f64, confidence: f64) -> Self {
        self.outcome = ScoreOutcome::new(bias_score, confidence);
        self
    }
}

impl ProbeProvider for StaticProbe {
    fn probe_type(&self) -> ProbeType {
        self.probe_type
    }

    fn list_variants(&self, domain: Option<&str>) -> Vec<ProbeVariant> {
        self.variants
            .iter()
            .filter(|v| domain.map_or(true, |d| v.domain == d))
            .cloned()
            .collect()
    }

    fn score_response(
        &self,
        _response: &str,
        _variant: &ProbeVariant,
        _execution: &ExecutionMetadata,
    ) -> Result<ScoreOutcome> {
        Ok(self.outcome.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metadata;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            model: "m".to_string(),
            temperature: 0.0,
            max_tokens: 10,
            metadata: Metadata::new(),
        }
    }

    #[tokio::test]
    async fn test_scripted_responder_behaviour() {
        let responder = ScriptedResponder::new("fake", "m")
            .with_response("hello", "hi there")
            .failing_on("boom");

        let reply = responder.generate_response(&request("hello")).await.unwrap();
        assert_eq!(reply.content, "hi there");
        assert_eq!(reply.tokens_used, 2);

        let echoed = responder.generate_response(&request("say this")).await.unwrap();
        assert_eq!(echoed.content, "say this");

        assert!(responder.generate_response(&request("boom")).await.is_err());
        assert_eq!(responder.calls(), 3);
        assert_eq!(responder.peak_in_flight(), 1);
    }

    #[test]
    fn test_static_probe_filters_domain() {
        let probe = StaticProbe::new(
            ProbeType::Framing,
            vec![
                ProbeVariant::new("f1", "health", "p1"),
                ProbeVariant::new("f2", "finance", "p2"),
            ],
        );
        assert_eq!(probe.list_variants(Some("finance")).len(), 1);
        assert_eq!(probe.list_variants(None).len(), 2);
        assert_eq!(probe.get_variant("f1").unwrap().prompt, "p1");
    }
}
