use crate::dataset::DatasetId;
use crate::error::{ScoringError, ScoringResult};
use crate::features::{feature_names, FeatureVector};
use crate::kind::ModelKind;
use crate::metrics::TrainingMetrics;
use crate::model::{Algorithm, FittedModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Bumped whenever the serialized layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// The immutable result of one training run.
///
/// Fields are only reachable through accessors; retraining produces a new
/// artifact rather than mutating an existing one.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    format_version: u32,
    kind: ModelKind,
    feature_names: Vec<String>,
    metrics: TrainingMetrics,
    dataset_id: DatasetId,
    seed: u64,
    created_at: DateTime<Utc>,
    model: FittedModel,
}

impl ModelArtifact {
    pub(crate) fn new(
        kind: ModelKind,
        model: FittedModel,
        metrics: TrainingMetrics,
        dataset_id: DatasetId,
        seed: u64,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            kind,
            feature_names: feature_names(kind).into_iter().map(str::to_string).collect(),
            metrics,
            dataset_id,
            seed,
            created_at: Utc::now(),
            model,
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn algorithm(&self) -> Algorithm {
        self.model.algorithm()
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn dataset_id(&self) -> &DatasetId {
        &self.dataset_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Raw score for one feature vector of this artifact's kind.
    pub fn predict(&self, features: &FeatureVector) -> ScoringResult<f64> {
        Ok(self.predict_batch(&[features])?.into_iter().next().unwrap_or(f64::NAN))
    }

    pub fn predict_batch(&self, rows: &[&FeatureVector]) -> ScoringResult<Vec<f64>> {
        if let Some(other) = rows.iter().map(|r| r.kind()).find(|&k| k != self.kind) {
            return Err(ScoringError::InvalidFeatures(format!(
                "{} model cannot score {other} features",
                self.kind
            )));
        }
        self.model.predict(rows)
    }

    pub fn to_json_bytes(&self) -> ScoringResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and check an artifact written by [`Self::to_json_bytes`].
    ///
    /// The error string names what is wrong; the registry wraps it as corruption.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, String> {
        let artifact: Self = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "unsupported artifact format version {} (expected {ARTIFACT_FORMAT_VERSION})",
                artifact.format_version
            ));
        }
        let expected = feature_names(artifact.kind);
        if artifact.feature_names != expected || artifact.model.feature_count() != expected.len() {
            return Err(format!("feature layout does not match current {} features", artifact.kind));
        }
        if artifact.model.algorithm().target() != artifact.kind.target() {
            return Err(format!("algorithm {} cannot serve {}", artifact.algorithm().name(), artifact.kind));
        }
        Ok(artifact)
    }
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn sha256_file(path: &Path) -> ScoringResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(sha256_bytes(&bytes))
}
