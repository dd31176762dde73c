//! Feature extraction: entity history in, fixed-shape feature vector out.
//!
//! One extractor per model kind. Extractors only read from the store and
//! always produce every declared key; sparse history falls back to the
//! per-feature defaults declared alongside each key.

mod churn;
mod engagement;
mod history;
mod lead;

pub use churn::ChurnFeatures;
pub use engagement::EngagementFeatures;
pub use lead::LeadFeatures;

use crate::dataset::TrainingExample;
use crate::error::{ScoringError, ScoringResult};
use crate::kind::ModelKind;
use beacon_store::{EntityStore, Page, StoreResult};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Stand-in for "never responded": one week, in minutes.
pub const RESPONSE_TIME_SENTINEL_MINUTES: f64 = 10_080.0;

/// Stand-in for "no activity on record", in days.
pub const DAYS_SENTINEL: f64 = 365.0;

/// A declared feature key and the value used when history is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub default: f64,
}

const fn spec(name: &'static str, default: f64) -> FeatureSpec {
    FeatureSpec { name, default }
}

pub(crate) const LEAD_SPECS: [FeatureSpec; 8] = [
    spec("response_rate", 0.0),
    spec("avg_response_time_minutes", RESPONSE_TIME_SENTINEL_MINUTES),
    spec("message_count", 0.0),
    spec("engagement_score", 0.0),
    spec("sentiment_score", 0.0),
    spec("days_since_last_contact", DAYS_SENTINEL),
    spec("conversation_count", 0.0),
    spec("inbound_ratio", 0.0),
];

pub(crate) const CHURN_SPECS: [FeatureSpec; 7] = [
    spec("days_since_last_message", DAYS_SENTINEL),
    spec("message_frequency_30d", 0.0),
    spec("avg_sentiment", 0.0),
    spec("engagement_trend", 0.0),
    spec("unsubscribe_mentions", 0.0),
    spec("response_rate", 0.0),
    spec("tenure_days", 0.0),
];

pub(crate) const ENGAGEMENT_SPECS: [FeatureSpec; 7] = [
    spec("hour_of_day", 0.0),
    spec("day_of_week", 0.0),
    spec("message_length", 0.0),
    spec("past_engagement_rate", 0.0),
    spec("contains_question", 0.0),
    spec("contains_link", 0.0),
    spec("days_since_last_inbound", DAYS_SENTINEL),
];

/// Declared features for `kind`, in model column order.
pub fn feature_specs(kind: ModelKind) -> &'static [FeatureSpec] {
    match kind {
        ModelKind::LeadScoring => &LEAD_SPECS,
        ModelKind::Churn => &CHURN_SPECS,
        ModelKind::Engagement => &ENGAGEMENT_SPECS,
    }
}

pub fn feature_names(kind: ModelKind) -> Vec<&'static str> {
    feature_specs(kind).iter().map(|s| s.name).collect()
}

/// Named numeric features with a fixed key set per model kind.
#[derive(Clone, PartialEq)]
pub struct FeatureVector {
    kind: ModelKind,
    values: Vec<f64>,
}

impl FeatureVector {
    /// The vector an entity with no history gets.
    #[must_use]
    pub fn defaults(kind: ModelKind) -> Self {
        Self { kind, values: feature_specs(kind).iter().map(|s| s.default).collect() }
    }

    /// Build from values in column order.
    pub fn from_values(kind: ModelKind, values: Vec<f64>) -> ScoringResult<Self> {
        let expected = feature_specs(kind).len();
        if values.len() != expected {
            return Err(ScoringError::InvalidFeatures(format!(
                "{kind} expects {expected} features, got {}",
                values.len()
            )));
        }
        Ok(Self { kind, values })
    }

    /// Build from `(name, value)` pairs. Every declared key must be present.
    pub fn from_pairs<'a>(
        kind: ModelKind,
        pairs: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> ScoringResult<Self> {
        let specs = feature_specs(kind);
        let mut values: Vec<Option<f64>> = vec![None; specs.len()];
        for (name, value) in pairs {
            let idx = index_of(kind, name)?;
            values[idx] = Some(value);
        }
        let values = values
            .into_iter()
            .zip(specs)
            .map(|(v, s)| {
                v.ok_or_else(|| ScoringError::InvalidFeatures(format!("{kind} feature '{}' is missing", s.name)))
            })
            .collect::<ScoringResult<Vec<_>>>()?;
        Ok(Self { kind, values })
    }

    /// Replace one feature, builder style.
    pub fn with(mut self, name: &str, value: f64) -> ScoringResult<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn set(&mut self, name: &str, value: f64) -> ScoringResult<()> {
        let idx = index_of(self.kind, name)?;
        self.values[idx] = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        index_of(self.kind, name).ok().map(|i| self.values[i])
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        feature_specs(self.kind).iter().map(|s| s.name).zip(self.values.iter().copied())
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Model input row (the tree booster works in f32).
    pub fn to_row(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

fn index_of(kind: ModelKind, name: &str) -> ScoringResult<usize> {
    feature_specs(kind)
        .iter()
        .position(|s| s.name == name)
        .ok_or_else(|| ScoringError::InvalidFeatures(format!("'{name}' is not a {kind} feature")))
}

impl fmt::Debug for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Turns entity history into features for one model kind.
pub trait FeatureExtractor: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Features for a single entity. Fails with `EntityNotFound` when the id
    /// does not resolve.
    fn extract(&self, store: &dyn EntityStore, entity_id: &str) -> ScoringResult<FeatureVector>;

    /// Every labeled entity as a training example, in store order.
    fn training_examples(&self, store: &dyn EntityStore, page_size: usize) -> ScoringResult<Vec<TrainingExample>>;

    /// Exact number of labeled entities, without building any features.
    fn count_examples(&self, store: &dyn EntityStore) -> ScoringResult<usize>;
}

/// The extractor for `kind`, measuring recency against `as_of`.
pub fn extractor_for(kind: ModelKind, as_of: DateTime<Utc>) -> Box<dyn FeatureExtractor> {
    match kind {
        ModelKind::LeadScoring => Box::new(LeadFeatures::new(as_of)),
        ModelKind::Churn => Box::new(ChurnFeatures::new(as_of)),
        ModelKind::Engagement => Box::new(EngagementFeatures::new(as_of)),
    }
}

/// Walk a paginated listing until an empty or short page.
pub(crate) fn for_each_page<T>(
    page_size: usize,
    mut fetch: impl FnMut(Page) -> StoreResult<Vec<T>>,
    mut visit: impl FnMut(T) -> ScoringResult<()>,
) -> ScoringResult<()> {
    if page_size == 0 {
        return Err(ScoringError::Config("page_size must be >= 1".to_string()));
    }
    let mut page = Page::first(page_size);
    loop {
        let batch = fetch(page)?;
        let len = batch.len();
        for item in batch {
            visit(item)?;
        }
        if len < page_size {
            return Ok(());
        }
        page = page.next();
    }
}
