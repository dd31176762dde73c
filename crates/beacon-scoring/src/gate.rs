use crate::error::{ScoringError, ScoringResult};
use crate::features::extractor_for;
use crate::kind::ModelKind;
use beacon_store::EntityStore;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Labeled examples a kind needs before training is attempted.
pub const MIN_TRAINING_EXAMPLES: usize = 100;

/// Gate verdict for one model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    pub kind: ModelKind,
    pub example_count: usize,
    pub is_ready: bool,
}

impl GateStatus {
    #[must_use]
    pub fn from_count(kind: ModelKind, example_count: usize) -> Self {
        Self { kind, example_count, is_ready: example_count >= MIN_TRAINING_EXAMPLES }
    }

    /// `DataInsufficient` unless the kind is ready.
    pub fn require(self) -> ScoringResult<Self> {
        if self.is_ready {
            Ok(self)
        } else {
            Err(ScoringError::DataInsufficient {
                kind: self.kind,
                count: self.example_count,
                required: MIN_TRAINING_EXAMPLES,
            })
        }
    }
}

/// Counts labeled examples without building any features.
pub struct DataSufficiencyGate<'a> {
    store: &'a dyn EntityStore,
    as_of: DateTime<Utc>,
}

impl<'a> DataSufficiencyGate<'a> {
    pub fn new(store: &'a dyn EntityStore, as_of: DateTime<Utc>) -> Self {
        Self { store, as_of }
    }

    pub fn check(&self, kind: ModelKind) -> ScoringResult<GateStatus> {
        let count = extractor_for(kind, self.as_of).count_examples(self.store)?;
        Ok(GateStatus::from_count(kind, count))
    }

    pub fn check_all(&self) -> ScoringResult<Vec<GateStatus>> {
        ModelKind::ALL.into_iter().map(|kind| self.check(kind)).collect()
    }
}
