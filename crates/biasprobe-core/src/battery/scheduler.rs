//! Bounded concurrent execution of a battery worklist.
//!
//! One tokio task per worklist slot, gated by a semaphore of
//! `concurrency_limit` permits. Every slot yields exactly one
//! [`ExecutionResult`]; failures become error rows and never abort the batch.
//! Slots live in a [`JoinSet`], so dropping the run future aborts them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{instrument, Instrument};

use crate::domain::{BatteryItem, ExecutionResult, HarnessError, Metadata, ProbeRequest, Result};
use crate::metrics::METRICS;
use crate::obs;
use crate::probe::{execute_probe, ProbeRegistry, Responder};
use crate::randomization::SessionId;

/// Per-run execution knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    /// Maximum slots in flight; 0 is treated as 1.
    pub concurrency_limit: usize,
    /// Bound on the whole run. Slots still pending when it elapses become
    /// [`HarnessError::DeadlineExceeded`] rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Duration>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            concurrency_limit: 3,
            deadline: None,
        }
    }
}

impl ExecutionOptions {
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Execute `items` against `responder`, returning one result per item in input order.
#[instrument(skip_all, fields(session_id = %session_id, items = items.len()))]
pub async fn run_battery(
    items: &[BatteryItem],
    registry: &ProbeRegistry,
    responder: Arc<dyn Responder>,
    options: &ExecutionOptions,
    session_id: &SessionId,
) -> Vec<ExecutionResult> {
    let limit = options.concurrency_limit.max(1);
    let started = Instant::now();
    obs::emit_battery_started(session_id.as_str(), items.len(), limit);

    let semaphore = Arc::new(Semaphore::new(limit));
    let deadline = options
        .deadline
        .map(|d| tokio::time::Instant::now() + d);

    let mut tasks = JoinSet::new();
    for (index, item) in items.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let responder = Arc::clone(&responder);
        let provider = registry.get(item.probe_type);
        let request = build_request(item, responder.as_ref(), options, session_id);

        let slot = async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| HarnessError::TaskExecution(e.to_string()))?;
            let provider = provider.ok_or(HarnessError::ProbeNotRegistered(request.probe_type))?;
            execute_probe(provider.as_ref(), &request, responder.as_ref()).await
        };

        tasks.spawn(
            async move {
                let outcome = match deadline {
                    Some(at) => tokio::time::timeout_at(at, slot)
                        .await
                        .unwrap_or(Err(HarnessError::DeadlineExceeded)),
                    None => slot.await,
                };
                (index, outcome)
            }
            .in_current_span(),
        );
    }

    let provider_name = responder.provider_name().to_string();
    let model_name = responder.model_name().to_string();

    // Dropping `tasks` (caller cancelled this future) aborts every slot still queued or running.
    let mut outcomes: Vec<Option<Result<ExecutionResult>>> = items.iter().map(|_| None).collect();
    let mut join_failure = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => join_failure = Some(e.to_string()),
        }
    }

    let mut failures = 0;
    let results: Vec<ExecutionResult> = outcomes
        .into_iter()
        .zip(items)
        .enumerate()
        .map(|(index, (outcome, item))| {
            let outcome = outcome.unwrap_or_else(|| {
                Err(HarnessError::TaskExecution(
                    join_failure.clone().unwrap_or_else(|| "task did not complete".to_string()),
                ))
            });
            match outcome {
                Ok(result) => {
                    METRICS.inc_probes_executed(false);
                    result
                }
                Err(error) => {
                    failures += 1;
                    METRICS.inc_probes_executed(true);
                    obs::emit_probe_failed(index, item.probe_type.as_str(), &item.variant_id, &error);
                    ExecutionResult::failed(
                        index,
                        item,
                        &provider_name,
                        &model_name,
                        options.temperature,
                        &error.to_string(),
                    )
                }
            }
        })
        .collect();

    obs::emit_battery_finished(
        session_id.as_str(),
        items.len(),
        failures,
        started.elapsed().as_millis() as u64,
    );
    results
}

fn build_request(
    item: &BatteryItem,
    responder: &dyn Responder,
    options: &ExecutionOptions,
    session_id: &SessionId,
) -> ProbeRequest {
    let mut metadata = Metadata::new();
    metadata.insert("session_id".to_string(), session_id.as_str().into());
    metadata.insert("battery_execution".to_string(), true.into());
    ProbeRequest {
        probe_type: item.probe_type,
        variant_id: item.variant_id.clone(),
        model_provider: responder.provider_name().to_string(),
        model_name: responder.model_name().to_string(),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        metadata,
    }
}
