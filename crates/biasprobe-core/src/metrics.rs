//! Global atomic counters for harness observability.
//!
//! Counters are bumped silently at the call site. Call [`Metrics::flush`]
//! to log the current values as one `tracing::info!` event, e.g. after a
//! battery run.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lock-free counters.
pub struct Metrics {
    variants_selected: AtomicU64,
    batteries_built: AtomicU64,
    probes_executed: AtomicU64,
    probe_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            variants_selected: AtomicU64::new(0),
            batteries_built: AtomicU64::new(0),
            probes_executed: AtomicU64::new(0),
            probe_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_variants_selected(&self) {
        self.variants_selected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "variants_selected", "counter incremented");
    }

    pub fn inc_batteries_built(&self) {
        self.batteries_built.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "batteries_built", "counter incremented");
    }

    /// Count one executed worklist slot; failed slots count in both counters.
    pub fn inc_probes_executed(&self, failed: bool) {
        self.probes_executed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.probe_failures.fetch_add(1, Ordering::Relaxed);
        }
        tracing::trace!(metric = "probes_executed", failed, "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            variants_selected = self.variants_selected(),
            batteries_built = self.batteries_built(),
            probes_executed = self.probes_executed(),
            probe_failures = self.probe_failures(),
        );
    }

    pub fn variants_selected(&self) -> u64 {
        self.variants_selected.load(Ordering::Relaxed)
    }

    pub fn batteries_built(&self) -> u64 {
        self.batteries_built.load(Ordering::Relaxed)
    }

    pub fn probes_executed(&self) -> u64 {
        self.probes_executed.load(Ordering::Relaxed)
    }

    pub fn probe_failures(&self) -> u64 {
        self.probe_failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.variants_selected.store(0, Ordering::Relaxed);
        self.batteries_built.store(0, Ordering::Relaxed);
        self.probes_executed.store(0, Ordering::Relaxed);
        self.probe_failures.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_variants_selected();
        m.inc_variants_selected();
        assert_eq!(m.variants_selected(), 2);

        m.inc_batteries_built();
        assert_eq!(m.batteries_built(), 1);

        m.inc_probes_executed(false);
        m.inc_probes_executed(true);
        m.inc_probes_executed(true);
        assert_eq!(m.probes_executed(), 3);
        assert_eq!(m.probe_failures(), 2);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_variants_selected();
        m.inc_batteries_built();
        m.inc_probes_executed(true);
        m.reset();
        assert_eq!(m.variants_selected(), 0);
        assert_eq!(m.batteries_built(), 0);
        assert_eq!(m.probes_executed(), 0);
        assert_eq!(m.probe_failures(), 0);
    }
}
