//! The model kinds the pipeline trains and serves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a model kind predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Continuous score in [0, 100].
    Regression,
    /// Probability of a binary outcome in [0, 1].
    Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LeadScoring,
    Churn,
    Engagement,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [Self::LeadScoring, Self::Churn, Self::Engagement];

    /// Stable name, also used as the registry artifact name.
    pub fn name(self) -> &'static str {
        match self {
            Self::LeadScoring => "lead_scoring",
            Self::Churn => "churn",
            Self::Engagement => "engagement",
        }
    }

    pub fn target(self) -> Target {
        match self {
            Self::LeadScoring => Target::Regression,
            Self::Churn | Self::Engagement => Target::Classification,
        }
    }

    /// Inclusive range of the raw score.
    pub fn score_range(self) -> (f64, f64) {
        match self.target() {
            Target::Regression => (0.0, 100.0),
            Target::Classification => (0.0, 1.0),
        }
    }

    /// Derive an independent split seed for this kind from the base seed.
    pub fn seed(self, base: u64) -> u64 {
        let salt: u64 = match self {
            Self::LeadScoring => 0x9E37_79B9_7F4A_7C15,
            Self::Churn => 0xC2B2_AE3D_27D4_EB4F,
            Self::Engagement => 0x1656_67B1_9E37_79F9,
        };
        base ^ salt
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "lead_scoring" | "lead" | "leads" => Ok(Self::LeadScoring),
            "churn" => Ok(Self::Churn),
            "engagement" => Ok(Self::Engagement),
            _ => Err(format!("Unknown model kind: {s}. Expected one of: lead_scoring, churn, engagement")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
        assert_eq!("lead-scoring".parse::<ModelKind>().unwrap(), ModelKind::LeadScoring);
        assert!("upsell".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_kind_seeds_are_independent() {
        let seeds: Vec<u64> = ModelKind::ALL.iter().map(|k| k.seed(42)).collect();
        assert_ne!(seeds[0], seeds[1]);
        assert_ne!(seeds[1], seeds[2]);
        assert_eq!(ModelKind::Churn.seed(42), ModelKind::Churn.seed(42));
    }
}
