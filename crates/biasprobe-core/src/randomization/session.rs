//! Session tracking state and the registry that owns it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Metadata, ProbeType, ProbeVariant};

/// Unique identifier of a probe session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Per-session record of what has been presented so far.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub used_variants: HashSet<String>,
    pub used_probe_types: HashSet<ProbeType>,
    /// Variant ids in selection order. Append-only between resets.
    pub execution_order: Vec<String>,
    pub domain_usage: HashMap<String, usize>,
    pub last_execution: Option<DateTime<Utc>>,
    pub metadata: Metadata,
}

impl SessionContext {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            session_id: SessionId::generate(),
            created_at: Utc::now(),
            used_variants: HashSet::new(),
            used_probe_types: HashSet::new(),
            execution_order: Vec::new(),
            domain_usage: HashMap::new(),
            last_execution: None,
            metadata,
        }
    }

    /// Override the creation timestamp (importing or back-dating a session).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn has_used(&self, variant_id: &str) -> bool {
        self.used_variants.contains(variant_id)
    }

    /// Usage count for `domain`; unseen domains count as zero.
    pub fn domain_count(&self, domain: &str) -> usize {
        self.domain_usage.get(domain).copied().unwrap_or(0)
    }

    /// Record a successful selection.
    pub fn record_selection(&mut self, variant: &ProbeVariant, probe_type: ProbeType) {
        self.used_variants.insert(variant.id.clone());
        self.used_probe_types.insert(probe_type);
        self.execution_order.push(variant.id.clone());
        *self.domain_usage.entry(variant.domain.clone()).or_insert(0) += 1;
        self.last_execution = Some(Utc::now());
    }

    /// Clear tracking state in place. Identity, `created_at` and metadata survive.
    pub fn reset(&mut self) {
        self.used_variants.clear();
        self.used_probe_types.clear();
        self.execution_order.clear();
        self.domain_usage.clear();
        self.last_execution = None;
    }

    pub fn summary(&self) -> SessionSummary {
        let probe_types_used: BTreeSet<ProbeType> = self.used_probe_types.iter().copied().collect();
        SessionSummary {
            session_id: self.session_id.clone(),
            created_at: self.created_at,
            last_execution: self.last_execution,
            total_variants_used: self.used_variants.len(),
            probe_types_used: probe_types_used.into_iter().collect(),
            domain_usage: self
                .domain_usage
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            execution_order: self.execution_order.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Serializable snapshot of a session's tracking state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_execution: Option<DateTime<Utc>>,
    pub total_variants_used: usize,
    pub probe_types_used: Vec<ProbeType>,
    pub domain_usage: BTreeMap<String, usize>,
    pub execution_order: Vec<String>,
    pub metadata: Metadata,
}

/// Process-wide store of session contexts.
///
/// The map and every in-place mutation of a session are serialized by one
/// mutex; selection borrows a session only for the duration of a closure.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionContext>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionContext>> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a fresh session and return its id.
    pub fn create_session(&self, metadata: Metadata) -> SessionId {
        self.insert(SessionContext::new(metadata))
    }

    /// Register an externally constructed context, replacing any session with the same id.
    pub fn insert(&self, context: SessionContext) -> SessionId {
        let id = context.session_id.clone();
        self.lock().insert(id.clone(), context);
        info!(session_id = %id, "created probe session");
        id
    }

    /// Snapshot of a session, if it exists.
    pub fn get_session(&self, id: &SessionId) -> Option<SessionContext> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn session_summary(&self, id: &SessionId) -> Option<SessionSummary> {
        self.lock().get(id).map(SessionContext::summary)
    }

    /// Clear a session's tracking state. Returns `false` if it does not exist.
    pub fn reset_session(&self, id: &SessionId) -> bool {
        match self.lock().get_mut(id) {
            Some(session) => {
                session.reset();
                info!(session_id = %id, "reset probe session");
                true
            }
            None => false,
        }
    }

    /// Remove every session created strictly before `cutoff`.
    pub fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at >= cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, "cleaned up old sessions");
        }
        removed
    }

    /// Remove every session older than `max_age_hours`.
    pub fn cleanup_old_sessions(&self, max_age_hours: u32) -> usize {
        let cutoff = Utc::now() - ChronoDuration::hours(i64::from(max_age_hours));
        self.cleanup_older_than(cutoff)
    }

    /// Record a selection on `id`. No-op without a session.
    pub fn update_tracking(
        &self,
        id: Option<&SessionId>,
        variant: &ProbeVariant,
        probe_type: ProbeType,
    ) {
        self.with_session(id, |session| {
            if let Some(session) = session {
                session.record_selection(variant, probe_type);
            }
        });
    }

    /// Run `f` with mutable access to the session, if `id` names one.
    ///
    /// An unknown id is passed through as `None`, so callers treat it like a
    /// sessionless call.
    pub fn with_session<R>(
        &self,
        id: Option<&SessionId>,
        f: impl FnOnce(Option<&mut SessionContext>) -> R,
    ) -> R {
        let mut sessions = self.lock();
        let session = match id {
            Some(id) => {
                let found = sessions.get_mut(id);
                if found.is_none() {
                    debug!(session_id = %id, "unknown session id, selecting without tracking");
                }
                found
            }
            None => None,
        };
        f(session)
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
