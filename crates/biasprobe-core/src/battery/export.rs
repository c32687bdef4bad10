//! JSON and CSV export of battery results.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::domain::{ExecutionResult, HarnessError, Result};

/// CSV column order.
pub const CSV_HEADER: [&str; 11] = [
    "request_id",
    "probe_type",
    "variant_id",
    "model_provider",
    "model_name",
    "bias_score",
    "confidence",
    "response_time_ms",
    "tokens_used",
    "temperature",
    "created_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(HarnessError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

/// Rendered export.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutput {
    /// `{session_summary, battery_summary, execution_results}`.
    Json(Value),
    Csv(String),
}

impl ExportOutput {
    /// Text form suitable for writing to a file or stdout.
    pub fn render(&self) -> Result<String> {
        match self {
            Self::Json(value) => Ok(serde_json::to_string_pretty(value)?),
            Self::Csv(text) => Ok(text.clone()),
        }
    }
}

pub fn export(
    format: ExportFormat,
    session_summary: Value,
    battery_summary: Value,
    results: &[ExecutionResult],
) -> Result<ExportOutput> {
    match format {
        ExportFormat::Json => Ok(ExportOutput::Json(json!({
            "session_summary": session_summary,
            "battery_summary": battery_summary,
            "execution_results": results,
        }))),
        ExportFormat::Csv => Ok(ExportOutput::Csv(to_csv(results)?)),
    }
}

/// One header row, then one row per result.
pub fn to_csv(results: &[ExecutionResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for r in results {
        wtr.write_record([
            r.request_id.clone(),
            r.probe_type.as_str().to_string(),
            r.variant_id.clone(),
            r.model_provider.clone(),
            r.model_name.clone(),
            r.bias_score.to_string(),
            r.confidence.to_string(),
            r.response_time_ms.to_string(),
            r.tokens_used.to_string(),
            r.temperature.to_string(),
            r.created_at.to_rfc3339(),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| HarnessError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| HarnessError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
