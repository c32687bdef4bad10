//! Harness configuration: TOML file plus environment overrides.
//!
//! ```toml
//! [randomization]
//! strategy = "latin_square"
//! order_prevention = "counterbalanced"
//! seed = 42
//!
//! [execution]
//! concurrency_limit = 4
//! deadline_secs = 120
//!
//! [sessions]
//! max_age_hours = 24
//! ```
//!
//! Every section and field is optional. Environment variables
//! (`BIASPROBE_SEED`, `BIASPROBE_STRATEGY`, `BIASPROBE_ORDER_PREVENTION`,
//! `BIASPROBE_CONCURRENCY`) win over the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battery::{ExecutionOptions, TestBattery};
use crate::domain::{HarnessError, Result};
use crate::probe::ProbeRegistry;
use crate::randomization::RandomizationConfig;

pub const ENV_SEED: &str = "BIASPROBE_SEED";
pub const ENV_STRATEGY: &str = "BIASPROBE_STRATEGY";
pub const ENV_ORDER_PREVENTION: &str = "BIASPROBE_ORDER_PREVENTION";
pub const ENV_CONCURRENCY: &str = "BIASPROBE_CONCURRENCY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub temperature: f64,
    pub max_tokens: u32,
    pub concurrency_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        let options = ExecutionOptions::default();
        Self {
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            concurrency_limit: options.concurrency_limit,
            deadline_secs: None,
        }
    }
}

impl ExecutionSettings {
    pub fn to_options(&self) -> ExecutionOptions {
        ExecutionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            concurrency_limit: self.concurrency_limit,
            deadline: self.deadline_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Age threshold passed to session cleanup.
    pub max_age_hours: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { max_age_hours: 24 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub randomization: RandomizationConfig,
    pub execution: ExecutionSettings,
    pub sessions: SessionSettings,
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| HarnessError::Config(e.to_string()))
    }

    /// Read `path`, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env()?;
        debug!(path = %path.display(), "loaded harness config");
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Malformed values are a [`HarnessError::Config`].
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(seed) = lookup(ENV_SEED) {
            let seed = seed
                .trim()
                .parse()
                .map_err(|_| HarnessError::Config(format!("{ENV_SEED} must be an integer, got {seed:?}")))?;
            self.randomization.seed = Some(seed);
        }
        if let Some(strategy) = lookup(ENV_STRATEGY) {
            self.randomization.strategy = strategy.trim().parse()?;
        }
        if let Some(order) = lookup(ENV_ORDER_PREVENTION) {
            self.randomization.order_prevention = order.trim().parse()?;
        }
        if let Some(limit) = lookup(ENV_CONCURRENCY) {
            self.execution.concurrency_limit = limit.trim().parse().map_err(|_| {
                HarnessError::Config(format!("{ENV_CONCURRENCY} must be an integer, got {limit:?}"))
            })?;
        }
        Ok(())
    }

    /// A battery over `registry` using this randomization and session policy.
    pub fn build_battery(&self, registry: ProbeRegistry) -> TestBattery {
        TestBattery::new(registry, self.randomization.clone())
            .with_session_max_age(self.sessions.max_age_hours)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| HarnessError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metadata;
    use crate::randomization::{OrderEffectPrevention, RandomizationStrategy};
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = HarnessConfig::from_toml_str("").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.execution.concurrency_limit, 3);
        assert_eq!(config.sessions.max_age_hours, 24);
        assert_eq!(config.randomization.latin_square_size, 4);
    }

    #[test]
    fn test_built_battery_prunes_by_max_age() {
        use crate::randomization::SessionContext;
        use chrono::{Duration as ChronoDuration, Utc};

        let config = HarnessConfig::from_toml_str("[sessions]\nmax_age_hours = 2").unwrap();
        let mut battery = config.build_battery(ProbeRegistry::new());
        let sessions = std::sync::Arc::clone(battery.randomizer().sessions());
        let three_hours = sessions.insert(
            SessionContext::new(Metadata::new()).with_created_at(Utc::now() - ChronoDuration::hours(3)),
        );
        let one_hour = sessions.insert(
            SessionContext::new(Metadata::new()).with_created_at(Utc::now() - ChronoDuration::hours(1)),
        );

        battery.create_session(Metadata::new());
        assert!(!sessions.contains(&three_hours));
        assert!(sessions.contains(&one_hour));
        assert_eq!(battery.randomization_config(), config.randomization);
    }

    #[test]
    fn test_partial_sections() {
        let config = HarnessConfig::from_toml_str(
            r#"
            [randomization]
            strategy = "latin_square"
            seed = 42
            min_time_between_similar = 60

            [execution]
            deadline_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.randomization.strategy, RandomizationStrategy::LatinSquare);
        assert_eq!(config.randomization.seed, Some(42));
        assert_eq!(
            config.randomization.min_time_between_similar,
            Duration::from_secs(60)
        );
        assert_eq!(config.randomization.block_size, 6);
        let options = config.execution.to_options();
        assert_eq!(options.deadline, Some(Duration::from_secs(30)));
        assert_eq!(options.max_tokens, 500);
    }

    #[test]
    fn test_overrides_win() {
        let env: HashMap<&str, &str> = [
            (ENV_SEED, "7"),
            (ENV_STRATEGY, "block_randomized"),
            (ENV_ORDER_PREVENTION, "random_order"),
            (ENV_CONCURRENCY, "8"),
        ]
        .into_iter()
        .collect();
        let mut config = HarnessConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.randomization.seed, Some(7));
        assert_eq!(config.randomization.strategy, RandomizationStrategy::BlockRandomized);
        assert_eq!(config.randomization.order_prevention, OrderEffectPrevention::RandomOrder);
        assert_eq!(config.execution.concurrency_limit, 8);
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let mut config = HarnessConfig::default();
        let err = config
            .apply_overrides(|k| (k == ENV_SEED).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));

        let err = config
            .apply_overrides(|k| (k == ENV_STRATEGY).then(|| "astrology".to_string()))
            .unwrap_err();
        assert!(matches!(err, HarnessError::UnknownVariant { .. }));
    }

    #[test]
    fn test_load_and_round_trip_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sessions]\nmax_age_hours = 6").unwrap();
        let config = HarnessConfig::load(file.path()).unwrap();
        assert_eq!(config.sessions.max_age_hours, 6);

        let text = config.to_toml_string().unwrap();
        assert_eq!(HarnessConfig::from_toml_str(&text).unwrap().sessions.max_age_hours, 6);
    }
}
