//! Randomization strategies and their configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::HarnessError;

/// Strategy used to pick one variant out of a candidate list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RandomizationStrategy {
    SimpleRandom,
    #[default]
    DomainBalanced,
    Counterbalanced,
    LatinSquare,
    BlockRandomized,
}

impl RandomizationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RandomizationStrategy::SimpleRandom => "simple_random",
            RandomizationStrategy::DomainBalanced => "domain_balanced",
            RandomizationStrategy::Counterbalanced => "counterbalanced",
            RandomizationStrategy::LatinSquare => "latin_square",
            RandomizationStrategy::BlockRandomized => "block_randomized",
        }
    }
}

impl fmt::Display for RandomizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RandomizationStrategy {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple_random" => Ok(Self::SimpleRandom),
            "domain_balanced" => Ok(Self::DomainBalanced),
            "counterbalanced" => Ok(Self::Counterbalanced),
            "latin_square" => Ok(Self::LatinSquare),
            "block_randomized" => Ok(Self::BlockRandomized),
            other => Err(HarnessError::UnknownVariant {
                kind: "randomization strategy",
                value: other.to_string(),
            }),
        }
    }
}

/// Strategy used to order a list of probe types.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderEffectPrevention {
    None,
    RandomOrder,
    #[default]
    Counterbalanced,
    LatinSquare,
    BlockRandomized,
}

impl OrderEffectPrevention {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEffectPrevention::None => "none",
            OrderEffectPrevention::RandomOrder => "random_order",
            OrderEffectPrevention::Counterbalanced => "counterbalanced",
            OrderEffectPrevention::LatinSquare => "latin_square",
            OrderEffectPrevention::BlockRandomized => "block_randomized",
        }
    }
}

impl fmt::Display for OrderEffectPrevention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderEffectPrevention {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "random_order" => Ok(Self::RandomOrder),
            "counterbalanced" => Ok(Self::Counterbalanced),
            "latin_square" => Ok(Self::LatinSquare),
            "block_randomized" => Ok(Self::BlockRandomized),
            other => Err(HarnessError::UnknownVariant {
                kind: "order prevention strategy",
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration for variant selection and probe ordering.
///
/// `max_variants_per_domain`, `min_time_between_similar` and
/// `balance_domains` are carried for callers and reports; the selector
/// itself is driven by `strategy`, `order_prevention`, `prevent_repeats`,
/// `latin_square_size`, `block_size` and `seed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RandomizationConfig {
    pub strategy: RandomizationStrategy,
    pub order_prevention: OrderEffectPrevention,
    pub max_variants_per_domain: usize,
    #[serde(with = "duration_secs")]
    pub min_time_between_similar: Duration,
    pub prevent_repeats: bool,
    pub balance_domains: bool,
    pub latin_square_size: usize,
    pub block_size: usize,
    pub seed: Option<u64>,
}

impl Default for RandomizationConfig {
    fn default() -> Self {
        Self {
            strategy: RandomizationStrategy::DomainBalanced,
            order_prevention: OrderEffectPrevention::Counterbalanced,
            max_variants_per_domain: 3,
            min_time_between_similar: Duration::from_secs(5 * 60),
            prevent_repeats: true,
            balance_domains: true,
            latin_square_size: 4,
            block_size: 6,
            seed: None,
        }
    }
}

impl RandomizationConfig {
    pub fn with_strategy(mut self, strategy: RandomizationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_order_prevention(mut self, order_prevention: OrderEffectPrevention) -> Self {
        self.order_prevention = order_prevention;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_prevent_repeats(mut self, prevent_repeats: bool) -> Self {
        self.prevent_repeats = prevent_repeats;
        self
    }
}

/// Serialize a `Duration` as whole seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RandomizationConfig::default();
        assert_eq!(config.strategy, RandomizationStrategy::DomainBalanced);
        assert_eq!(config.order_prevention, OrderEffectPrevention::Counterbalanced);
        assert_eq!(config.max_variants_per_domain, 3);
        assert_eq!(config.min_time_between_similar, Duration::from_secs(300));
        assert!(config.prevent_repeats);
        assert!(config.balance_domains);
        assert_eq!(config.latin_square_size, 4);
        assert_eq!(config.block_size, 6);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "latin_square".parse::<RandomizationStrategy>().unwrap(),
            RandomizationStrategy::LatinSquare
        );
        assert_eq!(
            "random_order".parse::<OrderEffectPrevention>().unwrap(),
            OrderEffectPrevention::RandomOrder
        );
        assert!("shuffled".parse::<RandomizationStrategy>().is_err());
    }

    #[test]
    fn test_config_json_uses_seconds() {
        let config = RandomizationConfig::default().with_seed(7);
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["min_time_between_similar"], serde_json::json!(300));
        assert_eq!(json["strategy"], serde_json::json!("domain_balanced"));

        let back: RandomizationConfig = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RandomizationConfig =
            serde_json::from_str(r#"{"strategy": "block_randomized", "block_size": 2}"#)
                .expect("deserialize");
        assert_eq!(config.strategy, RandomizationStrategy::BlockRandomized);
        assert_eq!(config.block_size, 2);
        assert_eq!(config.latin_square_size, 4);
    }
}
