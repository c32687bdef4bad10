//! Randomized test batteries: composition, execution, summary and export.
//!
//! A [`TestBattery`] ties a [`ProbeRandomizer`] to a [`ProbeRegistry`] and
//! tracks one current session plus the results of the last run.

pub mod export;
pub mod scheduler;
pub mod summary;

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{BatteryItem, ExecutionResult, HarnessError, Metadata, ProbeType, Result};
use crate::metrics::METRICS;
use crate::obs::{self, SessionSpan};
use crate::probe::{ProbeRegistry, Responder};
use crate::randomization::{ProbeRandomizer, RandomizationConfig, SessionId, SessionSummary};

pub use export::{ExportFormat, ExportOutput};
pub use scheduler::{run_battery, ExecutionOptions};
pub use summary::{BatterySummary, OverallStatistics};

/// Session-scoped battery manager.
#[derive(Debug)]
pub struct TestBattery {
    randomizer: Arc<ProbeRandomizer>,
    registry: ProbeRegistry,
    current_session: Option<SessionId>,
    results: Vec<ExecutionResult>,
    session_max_age_hours: Option<u32>,
}

impl TestBattery {
    pub fn new(registry: ProbeRegistry, config: RandomizationConfig) -> Self {
        Self::with_randomizer(registry, Arc::new(ProbeRandomizer::new(config)))
    }

    /// Share a randomizer (and its session registry) with other batteries.
    pub fn with_randomizer(registry: ProbeRegistry, randomizer: Arc<ProbeRandomizer>) -> Self {
        Self {
            randomizer,
            registry,
            current_session: None,
            results: Vec::new(),
            session_max_age_hours: None,
        }
    }

    /// Prune sessions older than `hours` whenever a new session is created.
    pub fn with_session_max_age(mut self, hours: u32) -> Self {
        self.session_max_age_hours = Some(hours);
        self
    }

    pub fn randomizer(&self) -> &Arc<ProbeRandomizer> {
        &self.randomizer
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// Start a new session, make it current, and drop accumulated results.
    pub fn create_session(&mut self, metadata: Metadata) -> SessionId {
        if let Some(hours) = self.session_max_age_hours {
            self.randomizer.cleanup_old_sessions(hours);
        }
        let id = self.randomizer.create_session(metadata);
        self.current_session = Some(id.clone());
        self.results.clear();
        info!(session_id = %id, "battery session created");
        id
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.current_session.as_ref()
    }

    fn require_session(&self) -> Result<SessionId> {
        self.current_session
            .clone()
            .ok_or(HarnessError::NoActiveSession)
    }

    /// Compose a randomized worklist for the current session.
    ///
    /// `probe_types` defaults to every registered type. Types without a
    /// provider or without (domain-matching) variants are skipped. Each type
    /// contributes up to `max_variants_per_probe` distinct variants; the first
    /// selection error for a type ends that type's contribution.
    pub fn create_randomized_battery(
        &self,
        probe_types: Option<&[ProbeType]>,
        max_variants_per_probe: usize,
        domain_filter: Option<&str>,
    ) -> Result<Vec<BatteryItem>> {
        let session_id = self.require_session()?;
        let _span = SessionSpan::enter(session_id.as_str());

        let requested = match probe_types {
            Some(types) => types.to_vec(),
            None => self.registry.probe_types(),
        };
        let ordered = self
            .randomizer
            .select_probe_order(&requested, Some(&session_id));

        let mut battery = Vec::new();
        for probe_type in &ordered {
            let Some(provider) = self.registry.get(*probe_type) else {
                debug!(probe_type = %probe_type, "no provider registered, skipping");
                continue;
            };
            let mut pool = provider.list_variants(domain_filter);
            if pool.is_empty() {
                debug!(probe_type = %probe_type, "no variants available, skipping");
                continue;
            }

            for _ in 0..max_variants_per_probe {
                if pool.is_empty() {
                    break;
                }
                let variant = match self.randomizer.select_variant(
                    *probe_type,
                    &pool,
                    Some(&session_id),
                    None,
                ) {
                    Ok(variant) => variant,
                    Err(e) => {
                        debug!(probe_type = %probe_type, error = %e, "selection stopped");
                        break;
                    }
                };
                pool.retain(|v| v.id != variant.id);
                battery.push(BatteryItem::new(*probe_type, variant.id));
            }
        }

        METRICS.inc_batteries_built();
        obs::emit_battery_built(session_id.as_str(), ordered.len(), battery.len());
        Ok(battery)
    }

    /// Execute `battery` and store the results on this battery.
    ///
    /// Returns one result per item, in item order. Individual failures are
    /// recorded as error rows.
    pub async fn execute_battery(
        &mut self,
        battery: &[BatteryItem],
        responder: Arc<dyn Responder>,
        options: &ExecutionOptions,
    ) -> Result<Vec<ExecutionResult>> {
        let session_id = self.require_session()?;
        let results = run_battery(battery, &self.registry, responder, options, &session_id).await;
        self.results.extend(results.iter().cloned());
        Ok(results)
    }

    /// Accumulated results since the last session change or reset.
    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn get_session_summary(&self) -> Option<SessionSummary> {
        self.current_session
            .as_ref()
            .and_then(|id| self.randomizer.session_summary(id))
    }

    /// Session summary as JSON, or `{"error": "No active session"}`.
    pub fn session_summary_json(&self) -> Result<serde_json::Value> {
        match self.get_session_summary() {
            Some(summary) => Ok(serde_json::to_value(summary)?),
            None => Ok(serde_json::json!({ "error": "No active session" })),
        }
    }

    /// Clear the current session's tracking and the accumulated results.
    ///
    /// Returns false when there is no current session.
    pub fn reset_session(&mut self) -> bool {
        let Some(id) = self.current_session.as_ref() else {
            return false;
        };
        let reset = self.randomizer.reset_session(id);
        self.results.clear();
        reset
    }

    pub fn configure_randomization(&self, config: RandomizationConfig) {
        self.randomizer.configure(config);
    }

    pub fn randomization_config(&self) -> RandomizationConfig {
        self.randomizer.config()
    }

    /// Statistics over the accumulated results, `None` before any run.
    pub fn get_battery_summary(&self) -> Option<BatterySummary> {
        BatterySummary::from_results(self.current_session.as_ref(), &self.results)
    }

    /// Battery summary as JSON, or `{"message": "No battery executed yet"}`.
    pub fn battery_summary_json(&self) -> Result<serde_json::Value> {
        match self.get_battery_summary() {
            Some(summary) => Ok(serde_json::to_value(summary)?),
            None => Ok(serde_json::json!({ "message": "No battery executed yet" })),
        }
    }

    /// Export accumulated results as `"json"` or `"csv"`.
    pub fn export_results(&self, format: &str) -> Result<ExportOutput> {
        let format: ExportFormat = format.parse()?;
        export::export(
            format,
            self.session_summary_json()?,
            self.battery_summary_json()?,
            &self.results,
        )
    }
}
