//! JSON-backed probe catalogs.
//!
//! A catalog file maps probe-type names to variant lists:
//!
//! ```json
//! { "anchoring": [ { "id": "anchoring_health_1", "domain": "health", "prompt": "..." } ] }
//! ```
//!
//! Each entry becomes a [`CatalogProbe`] that scores responses with the
//! indicator phrases listed in the variant's `scoring_params`
//! (`bias_indicators`, `neutral_indicators`).

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::{HarnessError, ProbeType, ProbeVariant, Result};
use crate::probe::{ExecutionMetadata, ProbeProvider, ProbeRegistry, ScoreOutcome};

/// Probe provider over an in-memory variant list.
#[derive(Debug, Clone)]
pub struct CatalogProbe {
    probe_type: ProbeType,
    variants: Vec<ProbeVariant>,
}

impl CatalogProbe {
    /// Build a provider, rejecting duplicate variant ids.
    pub fn new(probe_type: ProbeType, variants: Vec<ProbeVariant>) -> Result<Self> {
        let mut seen = HashSet::new();
        for variant in &variants {
            if !seen.insert(variant.id.as_str()) {
                return Err(HarnessError::Catalog(format!(
                    "duplicate variant id {} for probe {probe_type}",
                    variant.id
                )));
            }
        }
        Ok(Self {
            probe_type,
            variants,
        })
    }

    pub fn variants(&self) -> &[ProbeVariant] {
        &self.variants
    }
}

fn indicators(variant: &ProbeVariant, key: &str) -> Vec<String> {
    variant
        .scoring_params
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default()
}

impl ProbeProvider for CatalogProbe {
    fn probe_type(&self) -> ProbeType {
        self.probe_type
    }

    fn list_variants(&self, domain: Option<&str>) -> Vec<ProbeVariant> {
        self.variants
            .iter()
            .filter(|v| domain.map_or(true, |d| v.domain == d))
            .cloned()
            .collect()
    }

    /// Indicator-phrase score.
    ///
    /// bias = biased hits / all hits; confidence = all hits / all indicators.
    /// Both are zero when nothing matches.
    fn score_response(
        &self,
        response: &str,
        variant: &ProbeVariant,
        _execution: &ExecutionMetadata,
    ) -> Result<ScoreOutcome> {
        let text = response.to_lowercase();
        let biased = indicators(variant, "bias_indicators");
        let neutral = indicators(variant, "neutral_indicators");

        let biased_hits: Vec<&String> = biased.iter().filter(|p| text.contains(p.as_str())).collect();
        let neutral_hits: Vec<&String> = neutral.iter().filter(|p| text.contains(p.as_str())).collect();
        let hits = biased_hits.len() + neutral_hits.len();
        let total = biased.len() + neutral.len();

        let mut outcome = if hits == 0 {
            ScoreOutcome::default()
        } else {
            ScoreOutcome::new(
                biased_hits.len() as f64 / hits as f64,
                hits as f64 / total as f64,
            )
        };
        outcome
            .details
            .insert("bias_hits".to_string(), serde_json::json!(biased_hits));
        outcome
            .details
            .insert("neutral_hits".to_string(), serde_json::json!(neutral_hits));
        if let Some(expected) = &variant.expected_bias {
            outcome
                .details
                .insert("expected_bias".to_string(), expected.clone().into());
        }
        Ok(outcome)
    }
}

/// Parse a catalog document into a registry of [`CatalogProbe`]s.
pub fn parse_catalog(json: &str) -> Result<ProbeRegistry> {
    let raw: BTreeMap<String, Vec<ProbeVariant>> = serde_json::from_str(json)?;
    let mut registry = ProbeRegistry::new();
    for (name, variants) in raw {
        let probe_type: ProbeType = name
            .parse()
            .map_err(|_| HarnessError::Catalog(format!("unknown probe type in catalog: {name}")))?;
        registry.register(Arc::new(CatalogProbe::new(probe_type, variants)?));
    }
    Ok(registry)
}

/// Load a catalog file from disk.
pub fn load_catalog(path: &Path) -> Result<ProbeRegistry> {
    let json = std::fs::read_to_string(path)?;
    let registry = parse_catalog(&json)?;
    info!(path = %path.display(), probe_types = registry.len(), "loaded probe catalog");
    Ok(registry)
}
