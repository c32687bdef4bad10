//! Structured lifecycle events for sessions and battery runs.
//!
//! - `SessionSpan`: RAII guard that tags everything logged inside it with the session id
//! - `emit_*`: one `info!`/`warn!` event per lifecycle step
//!
//! Verbosity is controlled through `BIASPROBE_LOG` / `RUST_LOG`; see
//! [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

/// RAII guard that enters a session-scoped tracing span.
///
/// ```ignore
/// let _span = SessionSpan::enter("4f1c...");
/// // every event logged here carries session_id = "4f1c..."
/// ```
pub struct SessionSpan {
    _span: tracing::span::EnteredSpan,
}

impl SessionSpan {
    pub fn enter(session_id: &str) -> Self {
        let span = tracing::info_span!("biasprobe.session", session_id = %session_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_session_created(session_id: &str) {
    info!(event = "session.created", session_id = %session_id);
}

/// Emit event: a randomized battery was composed.
pub fn emit_battery_built(session_id: &str, probe_types: usize, items: usize) {
    info!(
        event = "battery.built",
        session_id = %session_id,
        probe_types = probe_types,
        items = items,
    );
}

pub fn emit_battery_started(session_id: &str, items: usize, concurrency_limit: usize) {
    info!(
        event = "battery.started",
        session_id = %session_id,
        items = items,
        concurrency_limit = concurrency_limit,
    );
}

/// Emit event: battery run finished with its failure count and wall time.
pub fn emit_battery_finished(session_id: &str, items: usize, failures: usize, duration_ms: u64) {
    info!(
        event = "battery.finished",
        session_id = %session_id,
        items = items,
        failures = failures,
        duration_ms = duration_ms,
    );
}

/// Emit event: one worklist slot failed and was recorded as an error row (warning level).
pub fn emit_probe_failed(index: usize, probe_type: &str, variant_id: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "probe.failed",
        index = index,
        probe_type = %probe_type,
        variant_id = %variant_id,
        error = %error,
    );
}
