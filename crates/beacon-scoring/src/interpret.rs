//! Fixed band tables that turn raw scores into labels and actions.
//!
//! Bands are half-open `[lower, upper)`; a score equal to a boundary belongs to
//! the higher band.

use crate::kind::ModelKind;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadTier {
    Hot,
    Warm,
    Cold,
    Unqualified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
}

/// Categorical label for a score, tagged by the kind that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScoreLabel {
    Lead(LeadTier),
    Churn(RiskLevel),
    Engagement(EngagementLevel),
}

impl ScoreLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead(LeadTier::Hot) => "HOT",
            Self::Lead(LeadTier::Warm) => "WARM",
            Self::Lead(LeadTier::Cold) => "COLD",
            Self::Lead(LeadTier::Unqualified) => "UNQUALIFIED",
            Self::Churn(RiskLevel::High) | Self::Engagement(EngagementLevel::High) => "HIGH",
            Self::Churn(RiskLevel::Medium) | Self::Engagement(EngagementLevel::Medium) => "MEDIUM",
            Self::Churn(RiskLevel::Low) | Self::Engagement(EngagementLevel::Low) => "LOW",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a band table. The first action is the representative one.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub lower: f64,
    pub label: ScoreLabel,
    pub actions: &'static [&'static str],
}

const LEAD_BANDS: &[Band] = &[
    Band {
        lower: 80.0,
        label: ScoreLabel::Lead(LeadTier::Hot),
        actions: &["contact immediately", "assign to a senior rep", "prepare a tailored offer"],
    },
    Band {
        lower: 60.0,
        label: ScoreLabel::Lead(LeadTier::Warm),
        actions: &["follow up soon", "share relevant case studies"],
    },
    Band {
        lower: 40.0,
        label: ScoreLabel::Lead(LeadTier::Cold),
        actions: &["nurture via automation", "add to drip campaign"],
    },
    Band {
        lower: f64::NEG_INFINITY,
        label: ScoreLabel::Lead(LeadTier::Unqualified),
        actions: &["minimal effort", "re-evaluate next quarter"],
    },
];

const CHURN_BANDS: &[Band] = &[
    Band {
        lower: 0.7,
        label: ScoreLabel::Churn(RiskLevel::High),
        actions: &["urgent retention outreach", "offer an incentive", "escalate to account owner"],
    },
    Band {
        lower: 0.4,
        label: ScoreLabel::Churn(RiskLevel::Medium),
        actions: &["scheduled check-in", "send a satisfaction survey"],
    },
    Band {
        lower: f64::NEG_INFINITY,
        label: ScoreLabel::Churn(RiskLevel::Low),
        actions: &["routine monitoring"],
    },
];

const ENGAGEMENT_BANDS: &[Band] = &[
    Band {
        lower: 0.7,
        label: ScoreLabel::Engagement(EngagementLevel::High),
        actions: &["send now"],
    },
    Band {
        lower: 0.4,
        label: ScoreLabel::Engagement(EngagementLevel::Medium),
        actions: &["reschedule to a better slot", "shorten the message"],
    },
    Band {
        lower: f64::NEG_INFINITY,
        label: ScoreLabel::Engagement(EngagementLevel::Low),
        actions: &["rewrite message and retry", "add a clear question"],
    },
];

pub fn bands(kind: ModelKind) -> &'static [Band] {
    match kind {
        ModelKind::LeadScoring => LEAD_BANDS,
        ModelKind::Churn => CHURN_BANDS,
        ModelKind::Engagement => ENGAGEMENT_BANDS,
    }
}

/// Band for a clamped, finite score. Tables are ordered highest first.
pub fn interpret(kind: ModelKind, score: f64) -> &'static Band {
    let table = bands(kind);
    table
        .iter()
        .find(|band| score >= band.lower)
        .unwrap_or(&table[table.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(kind: ModelKind, score: f64) -> &'static str {
        interpret(kind, score).label.as_str()
    }

    #[test]
    fn test_lead_boundaries_go_up() {
        assert_eq!(label(ModelKind::LeadScoring, 80.0), "HOT");
        assert_eq!(label(ModelKind::LeadScoring, 79.999), "WARM");
        assert_eq!(label(ModelKind::LeadScoring, 60.0), "WARM");
        assert_eq!(label(ModelKind::LeadScoring, 40.0), "COLD");
        assert_eq!(label(ModelKind::LeadScoring, 39.9), "UNQUALIFIED");
        assert_eq!(label(ModelKind::LeadScoring, 0.0), "UNQUALIFIED");
        assert_eq!(label(ModelKind::LeadScoring, 100.0), "HOT");
    }

    #[test]
    fn test_probability_boundaries_go_up() {
        for kind in [ModelKind::Churn, ModelKind::Engagement] {
            assert_eq!(label(kind, 0.7), "HIGH");
            assert_eq!(label(kind, 0.6999), "MEDIUM");
            assert_eq!(label(kind, 0.4), "MEDIUM");
            assert_eq!(label(kind, 0.3999), "LOW");
            assert_eq!(label(kind, 0.0), "LOW");
        }
    }

    #[test]
    fn test_representative_actions() {
        assert_eq!(interpret(ModelKind::LeadScoring, 95.0).actions[0], "contact immediately");
        assert_eq!(interpret(ModelKind::LeadScoring, 65.0).actions[0], "follow up soon");
        assert_eq!(interpret(ModelKind::LeadScoring, 45.0).actions[0], "nurture via automation");
        assert_eq!(interpret(ModelKind::LeadScoring, 5.0).actions[0], "minimal effort");
        assert_eq!(interpret(ModelKind::Churn, 0.9).actions[0], "urgent retention outreach");
        assert_eq!(interpret(ModelKind::Churn, 0.5).actions[0], "scheduled check-in");
        assert_eq!(interpret(ModelKind::Churn, 0.1).actions[0], "routine monitoring");
        assert_eq!(interpret(ModelKind::Engagement, 0.8).actions[0], "send now");
        assert_eq!(interpret(ModelKind::Engagement, 0.5).actions[0], "reschedule to a better slot");
        assert_eq!(interpret(ModelKind::Engagement, 0.2).actions[0], "rewrite message and retry");
    }

    #[test]
    fn test_tables_are_ordered_and_total() {
        for kind in ModelKind::ALL {
            let table = bands(kind);
            assert!(table.windows(2).all(|w| w[0].lower > w[1].lower));
            assert_eq!(table[table.len() - 1].lower, f64::NEG_INFINITY);
            assert!(table.iter().all(|b| !b.actions.is_empty()));
        }
    }
}
