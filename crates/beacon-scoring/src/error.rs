use crate::kind::ModelKind;
use beacon_store::{EntityType, StoreError};
use thiserror::Error;

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: EntityType, id: String },

    #[error("not enough training data for {kind}: {count} examples, {required} required")]
    DataInsufficient { kind: ModelKind, count: usize, required: usize },

    #[error("training failed for {kind}: {reason}")]
    TrainingFailed { kind: ModelKind, reason: String },

    #[error("no trained model named '{0}' (train it first)")]
    ModelNotFound(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invalid feature vector: {0}")]
    InvalidFeatures(String),

    #[error("model for {kind} produced a non-finite score ({value})")]
    InvalidScore { kind: ModelKind, value: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn training_failed(kind: ModelKind, reason: impl Into<String>) -> Self {
        Self::TrainingFailed { kind, reason: reason.into() }
    }
}

impl From<StoreError> for ScoringError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::EntityNotFound { entity, id },
            other => Self::Persistence(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_becomes_entity_not_found() {
        let err: ScoringError = StoreError::not_found(EntityType::Lead, "lead-9").into();
        match err {
            ScoringError::EntityNotFound { entity, id } => {
                assert_eq!(entity, EntityType::Lead);
                assert_eq!(id, "lead-9");
            }
            other => panic!("Expected EntityNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_store_outage_becomes_persistence() {
        let err: ScoringError = StoreError::Unavailable("connection refused".to_string()).into();
        assert!(matches!(err, ScoringError::Persistence(msg) if msg.contains("connection refused")));
    }
}
