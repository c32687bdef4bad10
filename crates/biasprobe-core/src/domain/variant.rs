//! Probe variants: concrete prompt instances of a probe.

use serde::{Deserialize, Serialize};

use super::probe_type::ResponseFormat;

/// Opaque key/value map used for scoring parameters and metadata.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One concrete prompt instance of a probe, tagged with a domain.
///
/// Variants are owned by a probe provider and are read-only to the
/// randomization engine. `id` is unique within a provider's catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeVariant {
    /// Unique variant identifier.
    pub id: String,

    /// Domain context (health, finance, ...).
    pub domain: String,

    /// The prompt text presented to the model.
    pub prompt: String,

    /// Expected bias pattern, if any.
    #[serde(default)]
    pub expected_bias: Option<String>,

    #[serde(default)]
    pub response_format: ResponseFormat,

    #[serde(default)]
    pub scoring_params: Metadata,

    #[serde(default)]
    pub metadata: Metadata,
}

impl ProbeVariant {
    /// Create a free-text variant with empty scoring parameters and metadata.
    pub fn new(id: impl Into<String>, domain: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: domain.into(),
            prompt: prompt.into(),
            expected_bias: None,
            response_format: ResponseFormat::FreeText,
            scoring_params: Metadata::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_expected_bias(mut self, expected: impl Into<String>) -> Self {
        self.expected_bias = Some(expected.into());
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Set a single scoring parameter.
    pub fn with_scoring_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.scoring_params.insert(key.into(), value);
        self
    }
}
