//! Execution requests, results and battery worklist entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::probe_type::ProbeType;
use super::variant::Metadata;

/// One worklist entry of a battery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BatteryItem {
    pub probe_type: ProbeType,
    pub variant_id: String,
}

impl BatteryItem {
    pub fn new(probe_type: ProbeType, variant_id: impl Into<String>) -> Self {
        Self {
            probe_type,
            variant_id: variant_id.into(),
        }
    }
}

/// Request to execute one probe variant against a responder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeRequest {
    pub probe_type: ProbeType,
    pub variant_id: String,
    pub model_provider: String,
    pub model_name: String,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Outcome of executing one probe variant.
///
/// Failed executions are represented as data: `response` holds
/// `"Error: <message>"`, both scores are zero and `metadata["error"]`
/// carries the message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    pub request_id: String,
    pub probe_type: ProbeType,
    pub variant_id: String,
    pub model_provider: String,
    pub model_name: String,
    pub prompt: String,
    pub response: String,
    pub response_time_ms: u64,
    pub tokens_used: u32,
    pub temperature: f64,
    /// Normalized bias score (0.0 - 1.0).
    pub bias_score: f64,
    /// Confidence in the bias score (0.0 - 1.0).
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ExecutionResult {
    /// Build the error row recorded for a failed worklist slot.
    pub fn failed(
        index: usize,
        item: &BatteryItem,
        model_provider: &str,
        model_name: &str,
        temperature: f64,
        error: &str,
    ) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("error".to_string(), serde_json::Value::from(error));
        Self {
            request_id: format!("error_{index}"),
            probe_type: item.probe_type,
            variant_id: item.variant_id.clone(),
            model_provider: model_provider.to_string(),
            model_name: model_name.to_string(),
            prompt: String::new(),
            response: format!("Error: {error}"),
            response_time_ms: 0,
            tokens_used: 0,
            temperature,
            bias_score: 0.0,
            confidence: 0.0,
            created_at: Utc::now(),
            metadata,
        }
    }

    /// The captured error message, if this row records a failure.
    pub fn error(&self) -> Option<&str> {
        self.metadata.get("error").and_then(|v| v.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.metadata.contains_key("error")
    }
}
