//! Fitted model wrapper over the `gbdt` gradient-boosted trees.

use crate::dataset::TrainingExample;
use crate::error::{ScoringError, ScoringResult};
use crate::features::FeatureVector;
use crate::kind::{ModelKind, Target};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Learning algorithm and its hyper-parameters. Chosen per kind, never from data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Algorithm {
    GradientBoostedRegressor { max_depth: u32, rounds: usize, shrinkage: f32 },
    GradientBoostedClassifier { max_depth: u32, rounds: usize, shrinkage: f32 },
}

impl Algorithm {
    pub fn for_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::LeadScoring => Self::GradientBoostedRegressor { max_depth: 5, rounds: 120, shrinkage: 0.1 },
            ModelKind::Churn => Self::GradientBoostedClassifier { max_depth: 4, rounds: 80, shrinkage: 0.1 },
            ModelKind::Engagement => Self::GradientBoostedClassifier { max_depth: 3, rounds: 60, shrinkage: 0.1 },
        }
    }

    pub fn target(self) -> Target {
        match self {
            Self::GradientBoostedRegressor { .. } => Target::Regression,
            Self::GradientBoostedClassifier { .. } => Target::Classification,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GradientBoostedRegressor { .. } => "gradient_boosted_regressor",
            Self::GradientBoostedClassifier { .. } => "gradient_boosted_classifier",
        }
    }

    fn config(self, feature_size: usize) -> Config {
        let (max_depth, rounds, shrinkage, loss) = match self {
            Self::GradientBoostedRegressor { max_depth, rounds, shrinkage } => {
                (max_depth, rounds, shrinkage, "SquaredError")
            }
            Self::GradientBoostedClassifier { max_depth, rounds, shrinkage } => {
                (max_depth, rounds, shrinkage, "LogLikelyhood")
            }
        };

        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_max_depth(max_depth);
        config.set_iterations(rounds);
        config.set_shrinkage(shrinkage);
        config.set_loss(loss);
        config.set_debug(false);
        // Sampling would pull from an unseeded RNG.
        config.set_data_sample_ratio(1.0);
        config.set_feature_sample_ratio(1.0);
        config.set_training_optimization_level(2);
        config
    }

    /// Label encoding the booster expects: raw scores, or ±1 for outcomes.
    fn encode_label(self, label: f64) -> f32 {
        match self.target() {
            Target::Regression => label as f32,
            Target::Classification => {
                if label >= 0.5 { 1.0 } else { -1.0 }
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct FittedModel {
    algorithm: Algorithm,
    feature_count: usize,
    booster: GBDT,
}

impl FittedModel {
    pub fn fit(kind: ModelKind, algorithm: Algorithm, train: &[&TrainingExample]) -> ScoringResult<Self> {
        let feature_count = train
            .first()
            .map(|ex| ex.features.len())
            .ok_or_else(|| ScoringError::training_failed(kind, "empty training partition"))?;

        let mut data: DataVec = train
            .iter()
            .map(|ex| Data::new_training_data(ex.features.to_row(), 1.0, algorithm.encode_label(ex.label.value()), None))
            .collect();

        let mut booster = GBDT::new(&algorithm.config(feature_count));
        booster.fit(&mut data);

        Ok(Self { algorithm, feature_count, booster })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Raw model outputs: scores for regressors, positive-class
    /// probabilities for classifiers.
    pub fn predict(&self, rows: &[&FeatureVector]) -> ScoringResult<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != self.feature_count) {
            return Err(ScoringError::InvalidFeatures(format!(
                "model expects {} features, got {}",
                self.feature_count,
                bad.len()
            )));
        }
        let data: DataVec = rows.iter().map(|r| Data::new_training_data(r.to_row(), 1.0, 0.0, None)).collect();
        Ok(self.booster.predict(&data).into_iter().map(f64::from).collect())
    }
}

impl fmt::Debug for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedModel")
            .field("algorithm", &self.algorithm)
            .field("feature_count", &self.feature_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Label;

    fn churn_example(days_quiet: f64, churned: bool) -> TrainingExample {
        let features = FeatureVector::defaults(ModelKind::Churn)
            .with("days_since_last_message", days_quiet)
            .unwrap();
        TrainingExample::new(features, Label::Outcome(churned))
    }

    #[test]
    fn test_algorithm_matches_kind_target() {
        for kind in ModelKind::ALL {
            assert_eq!(Algorithm::for_kind(kind).target(), kind.target());
        }
    }

    #[test]
    fn test_classifier_separates_obvious_classes() {
        let examples: Vec<_> = (0..40).map(|i| churn_example(f64::from(i) * 2.0, i >= 20)).collect();
        let refs: Vec<_> = examples.iter().collect();
        let model = FittedModel::fit(ModelKind::Churn, Algorithm::for_kind(ModelKind::Churn), &refs).unwrap();

        let quiet = churn_example(75.0, true).features;
        let active = churn_example(2.0, false).features;
        let probs = model.predict(&[&quiet, &active]).unwrap();
        assert!(probs[0] > 0.5, "quiet contact should look like churn: {probs:?}");
        assert!(probs[1] < 0.5, "active contact should not: {probs:?}");
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let examples: Vec<_> = (0..10).map(|i| churn_example(f64::from(i), i % 2 == 0)).collect();
        let refs: Vec<_> = examples.iter().collect();
        let model = FittedModel::fit(ModelKind::Churn, Algorithm::for_kind(ModelKind::Churn), &refs).unwrap();
        let lead = FeatureVector::defaults(ModelKind::LeadScoring);
        assert!(matches!(model.predict(&[&lead]), Err(ScoringError::InvalidFeatures(_))));
    }
}
