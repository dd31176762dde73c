use crate::artifacts::ModelArtifact;
use crate::error::{ScoringError, ScoringResult};
use crate::features::{extractor_for, FeatureVector};
use crate::interpret::{interpret, ScoreLabel};
use crate::kind::{ModelKind, Target};
use crate::registry::ModelRegistry;
use beacon_store::EntityStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A scored entity with its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub kind: ModelKind,
    pub entity_id: Option<String>,
    /// Clamped to the kind's score range.
    pub raw_score: f64,
    pub label: ScoreLabel,
    /// Representative action first.
    pub recommended_actions: Vec<String>,
    /// Positive-class probability, classification kinds only.
    pub probability: Option<f64>,
    pub confidence: f64,
}

/// Scores entities against the artifacts currently in the registry.
///
/// Artifacts are loaded per call, so a retrain is picked up immediately.
pub struct Predictor {
    store: Arc<dyn EntityStore>,
    registry: Arc<dyn ModelRegistry>,
    as_of: DateTime<Utc>,
}

impl Predictor {
    pub fn new(store: Arc<dyn EntityStore>, registry: Arc<dyn ModelRegistry>, as_of: DateTime<Utc>) -> Self {
        Self { store, registry, as_of }
    }

    pub fn load(&self, kind: ModelKind) -> ScoringResult<ModelArtifact> {
        let artifact = self.registry.load(kind.name())?;
        if artifact.kind() != kind {
            return Err(ScoringError::Persistence(format!(
                "artifact '{}' holds a {} model",
                kind.name(),
                artifact.kind()
            )));
        }
        Ok(artifact)
    }

    /// Load the artifact, extract the entity's features and interpret the score.
    pub fn predict(&self, kind: ModelKind, entity_id: &str) -> ScoringResult<PredictionResult> {
        let artifact = self.load(kind)?;
        self.predict_with(&artifact, entity_id)
    }

    /// Like [`Self::predict`] with an artifact the caller already holds.
    pub fn predict_with(&self, artifact: &ModelArtifact, entity_id: &str) -> ScoringResult<PredictionResult> {
        let features = extractor_for(artifact.kind(), self.as_of).extract(self.store.as_ref(), entity_id)?;
        let mut result = score_with(artifact, &features)?;
        result.entity_id = Some(entity_id.to_string());
        debug!(kind = %artifact.kind(), entity_id, score = result.raw_score, label = %result.label, "Scored entity");
        Ok(result)
    }

    /// Score caller-supplied features without touching the store.
    pub fn score(&self, kind: ModelKind, features: &FeatureVector) -> ScoringResult<PredictionResult> {
        if features.kind() != kind {
            return Err(ScoringError::InvalidFeatures(format!(
                "expected {kind} features, got {}",
                features.kind()
            )));
        }
        let artifact = self.load(kind)?;
        score_with(&artifact, features)
    }
}

/// Score `features` with `artifact` and interpret the result.
pub fn score_with(artifact: &ModelArtifact, features: &FeatureVector) -> ScoringResult<PredictionResult> {
    let kind = artifact.kind();
    if !features.is_finite() {
        return Err(ScoringError::InvalidFeatures(format!("{kind} features contain non-finite values")));
    }
    let raw = artifact.predict(features)?;
    if !raw.is_finite() {
        return Err(ScoringError::InvalidScore { kind, value: raw });
    }
    let (lo, hi) = kind.score_range();
    let score = raw.clamp(lo, hi);

    let (probability, confidence) = match kind.target() {
        Target::Classification => (Some(score), score.max(1.0 - score)),
        Target::Regression => (None, artifact.metrics().r2().unwrap_or(0.0).clamp(0.0, 1.0)),
    };
    let band = interpret(kind, score);

    Ok(PredictionResult {
        kind,
        entity_id: None,
        raw_score: score,
        label: band.label,
        recommended_actions: band.actions.iter().map(|a| (*a).to_string()).collect(),
        probability,
        confidence,
    })
}
