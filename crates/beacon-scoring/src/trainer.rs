use crate::artifacts::ModelArtifact;
use crate::dataset::{compute_dataset_id, split, validate_examples, TrainingExample};
use crate::error::{ScoringError, ScoringResult};
use crate::kind::{ModelKind, Target};
use crate::metrics::{self, Scores, TrainingMetrics};
use crate::model::{Algorithm, FittedModel};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Cancellation and deadline shared by every kind in one training run.
#[derive(Debug, Clone, Default)]
pub struct TrainControl {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl TrainControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deadline(mut self, budget: Duration) -> Self {
        self.deadline = Some(Instant::now() + budget);
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail `kind` if the run was cancelled or ran past its deadline.
    pub fn check(&self, kind: ModelKind) -> ScoringResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ScoringError::training_failed(kind, "training cancelled"));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(ScoringError::training_failed(kind, "training deadline exceeded"));
        }
        Ok(())
    }
}

/// Fits one model kind on an ordered set of examples.
#[derive(Debug, Clone, Copy)]
pub struct ModelTrainer {
    seed: u64,
}

impl ModelTrainer {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Split, fit, evaluate and wrap. Identical examples and seed give identical
    /// partitions, parameters and metrics.
    pub fn train(
        &self,
        kind: ModelKind,
        examples: &[TrainingExample],
        control: &TrainControl,
    ) -> ScoringResult<ModelArtifact> {
        control.check(kind)?;
        validate_examples(kind, examples)?;

        let seed = kind.seed(self.seed);
        let parts = split(examples, seed);
        if kind.target() == Target::Classification {
            require_both_classes(kind, "training", &parts.train)?;
            require_both_classes(kind, "validation", &parts.validation)?;
        }

        let algorithm = Algorithm::for_kind(kind);
        debug!(
            kind = %kind,
            algorithm = algorithm.name(),
            train = parts.train.len(),
            validation = parts.validation.len(),
            "Fitting model"
        );
        let model = FittedModel::fit(kind, algorithm, &parts.train)?;
        control.check(kind)?;

        let rows: Vec<_> = parts.validation.iter().map(|ex| &ex.features).collect();
        let predicted = model.predict(&rows)?;
        if predicted.iter().any(|p| !p.is_finite()) {
            return Err(ScoringError::training_failed(kind, "model produced non-finite validation scores"));
        }

        let scores = match kind.target() {
            Target::Regression => {
                let actual: Vec<f64> = parts.validation.iter().map(|ex| ex.label.value()).collect();
                metrics::regression(&actual, &predicted).map(Scores::Regression).ok_or_else(|| {
                    ScoringError::training_failed(kind, "validation labels are constant; R² is undefined")
                })?
            }
            Target::Classification => {
                let actual: Vec<bool> = parts.validation.iter().map(|ex| ex.label.value() >= 0.5).collect();
                metrics::classification(&actual, &predicted).map(Scores::Classification).ok_or_else(|| {
                    ScoringError::training_failed(kind, "validation split holds a single class")
                })?
            }
        };

        let metrics = TrainingMetrics {
            train_examples: parts.train.len(),
            validation_examples: parts.validation.len(),
            scores,
        };
        info!(kind = %kind, metrics = ?metrics.scores, "Model trained");

        Ok(ModelArtifact::new(kind, model, metrics, compute_dataset_id(examples)?, seed))
    }
}

fn require_both_classes(kind: ModelKind, partition: &str, examples: &[&TrainingExample]) -> ScoringResult<()> {
    let positives = examples.iter().filter(|ex| ex.label.value() >= 0.5).count();
    if positives == 0 || positives == examples.len() {
        return Err(ScoringError::training_failed(
            kind,
            format!("{partition} split holds a single class ({positives} of {} positive)", examples.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Label;
    use crate::features::FeatureVector;

    fn engagement_examples(n: usize, engaged: impl Fn(usize) -> bool) -> Vec<TrainingExample> {
        (0..n)
            .map(|i| {
                let features = FeatureVector::defaults(ModelKind::Engagement)
                    .with("hour_of_day", (i % 24) as f64)
                    .unwrap()
                    .with("past_engagement_rate", (i % 10) as f64 / 10.0)
                    .unwrap();
                TrainingExample::new(features, Label::Outcome(engaged(i)))
            })
            .collect()
    }

    #[test]
    fn test_single_class_fails_training() {
        let examples = engagement_examples(120, |_| false);
        let err = ModelTrainer::new(42).train(ModelKind::Engagement, &examples, &TrainControl::new()).unwrap_err();
        assert!(matches!(err, ScoringError::TrainingFailed { kind: ModelKind::Engagement, .. }));
    }

    #[test]
    fn test_cancelled_run_fails_before_fitting() {
        let examples = engagement_examples(120, |i| i % 10 >= 5);
        let control = TrainControl::new();
        control.cancel();
        let err = ModelTrainer::new(42).train(ModelKind::Engagement, &examples, &control).unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_expired_deadline_fails() {
        let examples = engagement_examples(120, |i| i % 10 >= 5);
        let control = TrainControl::new().with_deadline(Duration::ZERO);
        let err = ModelTrainer::new(42).train(ModelKind::Engagement, &examples, &control).unwrap_err();
        assert!(err.to_string().contains("deadline"));
    }

    #[test]
    fn test_classification_metrics_in_unit_range() {
        let examples = engagement_examples(200, |i| i % 10 >= 5);
        let artifact = ModelTrainer::new(42).train(ModelKind::Engagement, &examples, &TrainControl::new()).unwrap();
        let Scores::Classification(m) = artifact.metrics().scores else {
            panic!("expected classification metrics");
        };
        for value in [m.accuracy, m.precision, m.recall, m.f1, m.roc_auc] {
            assert!((0.0..=1.0).contains(&value), "metric out of range: {m:?}");
        }
        assert_eq!(artifact.metrics().train_examples, 160);
        assert_eq!(artifact.metrics().validation_examples, 40);
    }
}
