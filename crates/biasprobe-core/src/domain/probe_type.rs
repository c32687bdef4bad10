//! Closed enumerations for bias categories and response formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::HarnessError;

/// The ten supported cognitive-bias categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProbeType {
    ProspectTheory,
    Anchoring,
    Availability,
    Framing,
    SunkCost,
    Optimism,
    Confirmation,
    BaseRate,
    Conjunction,
    Overconfidence,
}

impl ProbeType {
    /// Every probe type, in canonical order.
    pub const ALL: [ProbeType; 10] = [
        ProbeType::ProspectTheory,
        ProbeType::Anchoring,
        ProbeType::Availability,
        ProbeType::Framing,
        ProbeType::SunkCost,
        ProbeType::Optimism,
        ProbeType::Confirmation,
        ProbeType::BaseRate,
        ProbeType::Conjunction,
        ProbeType::Overconfidence,
    ];

    /// Wire name (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeType::ProspectTheory => "prospect_theory",
            ProbeType::Anchoring => "anchoring",
            ProbeType::Availability => "availability",
            ProbeType::Framing => "framing",
            ProbeType::SunkCost => "sunk_cost",
            ProbeType::Optimism => "optimism",
            ProbeType::Confirmation => "confirmation",
            ProbeType::BaseRate => "base_rate",
            ProbeType::Conjunction => "conjunction",
            ProbeType::Overconfidence => "overconfidence",
        }
    }
}

impl fmt::Display for ProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeType {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProbeType::ALL
            .iter()
            .copied()
            .find(|pt| pt.as_str() == s)
            .ok_or_else(|| HarnessError::UnknownVariant {
                kind: "probe type",
                value: s.to_string(),
            })
    }
}

/// Expected shape of a model's answer to a variant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    FreeText,
    MultipleChoice,
    Numeric,
    Boolean,
}
