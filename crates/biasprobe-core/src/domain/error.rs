//! Error taxonomy for the probe harness.

use super::probe_type::ProbeType;

/// Errors produced by selection, battery building, probe execution and export.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("no variants available for probe type {probe_type}{}", domain_suffix(.domain))]
    NoVariantsAvailable {
        probe_type: ProbeType,
        domain: Option<String>,
    },

    #[error("no active session; call create_session() first")]
    NoActiveSession,

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("probe type not registered: {0}")]
    ProbeNotRegistered(ProbeType),

    #[error("variant {variant_id} not found for probe {probe_type}")]
    VariantNotFound {
        probe_type: ProbeType,
        variant_id: String,
    },

    #[error("probe type mismatch: expected {expected}, got {actual}")]
    ProbeTypeMismatch {
        expected: ProbeType,
        actual: ProbeType,
    },

    #[error("responder error: {0}")]
    Responder(String),

    #[error("scoring error: {0}")]
    Scoring(String),

    #[error("task execution failed: {0}")]
    TaskExecution(String),

    #[error("deadline exceeded before probe completed")]
    DeadlineExceeded,

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn domain_suffix(domain: &Option<String>) -> String {
    domain
        .as_ref()
        .map(|d| format!(" in domain {d}"))
        .unwrap_or_default()
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
