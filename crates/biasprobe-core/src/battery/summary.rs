//! Aggregate statistics over a battery's results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ExecutionResult;
use crate::randomization::SessionId;

/// Score and timing aggregates across every result, error rows included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallStatistics {
    pub average_bias_score: f64,
    pub max_bias_score: f64,
    pub min_bias_score: f64,
    pub average_confidence: f64,
    pub average_response_time_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatterySummary {
    pub session_id: Option<SessionId>,
    pub total_probes: usize,
    /// Results without an `error` metadata entry.
    pub successful_probes: usize,
    pub success_rate: f64,
    pub probe_type_counts: BTreeMap<String, usize>,
    pub average_scores_by_type: BTreeMap<String, f64>,
    pub overall_statistics: OverallStatistics,
    pub execution_timestamp: DateTime<Utc>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl BatterySummary {
    /// Summarize `results`; `None` when there is nothing to summarize.
    pub fn from_results(session_id: Option<&SessionId>, results: &[ExecutionResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let total_probes = results.len();
        let successful_probes = results.iter().filter(|r| !r.is_error()).count();

        let mut scores_by_type: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for result in results {
            scores_by_type
                .entry(result.probe_type.as_str().to_string())
                .or_default()
                .push(result.bias_score);
        }
        let probe_type_counts = scores_by_type
            .iter()
            .map(|(k, scores)| (k.clone(), scores.len()))
            .collect();
        let average_scores_by_type = scores_by_type
            .iter()
            .map(|(k, scores)| (k.clone(), mean(scores.iter().copied())))
            .collect();

        let bias = || results.iter().map(|r| r.bias_score);
        let overall_statistics = OverallStatistics {
            average_bias_score: mean(bias()),
            max_bias_score: bias().fold(f64::MIN, f64::max),
            min_bias_score: bias().fold(f64::MAX, f64::min),
            average_confidence: mean(results.iter().map(|r| r.confidence)),
            average_response_time_ms: mean(results.iter().map(|r| r.response_time_ms as f64)),
        };

        Some(Self {
            session_id: session_id.cloned(),
            total_probes,
            successful_probes,
            success_rate: successful_probes as f64 / total_probes as f64,
            probe_type_counts,
            average_scores_by_type,
            overall_statistics,
            execution_timestamp: Utc::now(),
        })
    }
}
