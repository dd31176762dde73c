use crate::error::{ScoringError, ScoringResult};
use crate::features::FeatureVector;
use crate::kind::{ModelKind, Target};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Share of examples held out for validation.
pub const VALIDATION_RATIO: f64 = 0.2;

/// Stable identifier for a training set (content hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(pub String);

/// Known outcome attached to a training example.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Label {
    /// Continuous score, for regression kinds.
    Score(f64),
    /// Binary outcome, for classification kinds.
    Outcome(bool),
}

impl Label {
    pub fn target(self) -> Target {
        match self {
            Self::Score(_) => Target::Regression,
            Self::Outcome(_) => Target::Classification,
        }
    }

    /// Numeric form: the score itself, or 1.0 / 0.0 for outcomes.
    pub fn value(self) -> f64 {
        match self {
            Self::Score(v) => v,
            Self::Outcome(true) => 1.0,
            Self::Outcome(false) => 0.0,
        }
    }
}

/// A feature vector paired with its known outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: Label,
}

impl TrainingExample {
    #[must_use]
    pub fn new(features: FeatureVector, label: Label) -> Self {
        Self { features, label }
    }
}

pub fn compute_dataset_id(examples: &[TrainingExample]) -> ScoringResult<DatasetId> {
    let mut hasher = Sha256::new();

    for ex in examples {
        let bytes = serde_json::to_vec(ex)?;
        hasher.update(bytes);
        hasher.update(b"\n");
    }

    Ok(DatasetId(hex::encode(hasher.finalize())))
}

/// Reject sets that cannot be fitted for `kind`.
pub fn validate_examples(kind: ModelKind, examples: &[TrainingExample]) -> ScoringResult<()> {
    if examples.len() < 2 {
        return Err(ScoringError::training_failed(kind, "need at least 2 examples to split"));
    }
    for (idx, ex) in examples.iter().enumerate() {
        if ex.features.kind() != kind {
            return Err(ScoringError::training_failed(
                kind,
                format!("example[{idx}] holds {} features", ex.features.kind()),
            ));
        }
        if ex.label.target() != kind.target() {
            return Err(ScoringError::training_failed(kind, format!("example[{idx}] label does not match target")));
        }
        if !ex.features.is_finite() || !ex.label.value().is_finite() {
            return Err(ScoringError::training_failed(kind, format!("example[{idx}] has a non-finite value")));
        }
    }
    Ok(())
}

/// Train/validation partition over borrowed examples.
#[derive(Debug)]
pub struct Split<'a> {
    pub train: Vec<&'a TrainingExample>,
    pub validation: Vec<&'a TrainingExample>,
}

/// Shuffle with `seed` and hold out [`VALIDATION_RATIO`] for validation.
///
/// The same input order and seed always give the same partition. Both sides
/// get at least one example when there are two or more.
pub fn split(examples: &[TrainingExample], seed: u64) -> Split<'_> {
    let mut order: Vec<usize> = (0..examples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let n = examples.len();
    let holdout = if n < 2 { 0 } else { ((n as f64 * VALIDATION_RATIO).round() as usize).clamp(1, n - 1) };
    let (train_idx, validation_idx) = order.split_at(n - holdout);

    Split {
        train: train_idx.iter().map(|&i| &examples[i]).collect(),
        validation: validation_idx.iter().map(|&i| &examples[i]).collect(),
    }
}
