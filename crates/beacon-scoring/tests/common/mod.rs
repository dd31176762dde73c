//! Shared fixtures: seeded training sets whose labels follow a latent
//! variable, and a progress sink that records what it sees.

#![allow(dead_code)]

use beacon_scoring::{FeatureVector, Label, ModelKind, ProgressEvent, ProgressSink, TrainingExample};
use beacon_store::{generate, EntitySnapshot, SyntheticConfig};
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

pub fn synthetic(seed: u64, contacts: usize) -> EntitySnapshot {
    generate(&SyntheticConfig { seed, contacts, as_of: as_of(), lead_ratio: 0.6 })
}

/// Lead features for a lead whose latent quality is `q` in [0, 1].
pub fn lead_features(q: f64) -> FeatureVector {
    FeatureVector::from_pairs(
        ModelKind::LeadScoring,
        [
            ("response_rate", q),
            ("avg_response_time_minutes", 15.0 + (1.0 - q) * 900.0),
            ("message_count", (5.0 + 40.0 * q).round()),
            ("engagement_score", 100.0 * q),
            ("sentiment_score", 2.0 * q - 1.0),
            ("days_since_last_contact", 60.0 * (1.0 - q)),
            ("conversation_count", (1.0 + 5.0 * q).round()),
            ("inbound_ratio", 0.5 * q),
        ],
    )
    .unwrap()
}

pub fn lead_examples(n: usize, seed: u64) -> Vec<TrainingExample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let q: f64 = rng.gen_range(0.0..1.0);
            let noisy = (q + rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0);
            let score = (100.0 * (1.25 * q - 0.1)).clamp(0.0, 100.0);
            TrainingExample::new(lead_features(noisy), Label::Score(score))
        })
        .collect()
}

/// Churn features for a contact whose latent risk is `r` in [0, 1].
pub fn churn_features(r: f64, tenure_days: f64) -> FeatureVector {
    FeatureVector::from_pairs(
        ModelKind::Churn,
        [
            ("days_since_last_message", 90.0 * r),
            ("message_frequency_30d", (20.0 * (1.0 - r)).round()),
            ("avg_sentiment", 0.6 - 1.2 * r),
            ("engagement_trend", (0.8 - 1.6 * r).clamp(-1.0, 1.0)),
            ("unsubscribe_mentions", (6.0 * r - 2.0).round().max(0.0)),
            ("response_rate", 0.9 - 0.8 * r),
            ("tenure_days", tenure_days),
        ],
    )
    .unwrap()
}

pub fn churn_examples(n: usize, seed: u64) -> Vec<TrainingExample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let r: f64 = rng.gen_range(0.0..1.0);
            let tenure = rng.gen_range(30.0..700.0);
            TrainingExample::new(churn_features(r, tenure), Label::Outcome(r > 0.5))
        })
        .collect()
}

pub fn engagement_features(hour: f64, past_rate: f64, length: f64) -> FeatureVector {
    FeatureVector::from_pairs(
        ModelKind::Engagement,
        [
            ("hour_of_day", hour),
            ("day_of_week", 2.0),
            ("message_length", length),
            ("past_engagement_rate", past_rate),
            ("contains_question", 0.0),
            ("contains_link", 0.0),
            ("days_since_last_inbound", 10.0),
        ],
    )
    .unwrap()
}

/// Messages engage when the contact engages often and the send hour is sociable.
pub fn engagement_examples(n: usize, seed: u64) -> Vec<TrainingExample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let hour = f64::from(rng.gen_range(0u32..24));
            let rate: f64 = rng.gen_range(0.0..1.0);
            let length = f64::from(rng.gen_range(20u32..300));
            let features = engagement_features(hour, rate, length)
                .with("day_of_week", f64::from(rng.gen_range(0u32..7)))
                .unwrap()
                .with("contains_question", if rng.gen_bool(0.4) { 1.0 } else { 0.0 })
                .unwrap()
                .with("days_since_last_inbound", rng.gen_range(0.0..60.0))
                .unwrap();
            let engaged = rate > 0.5 && (8.0..=20.0).contains(&hour);
            TrainingExample::new(features, Label::Outcome(engaged))
        })
        .collect()
}

pub fn examples_for(kind: ModelKind, n: usize, seed: u64) -> Vec<TrainingExample> {
    match kind {
        ModelKind::LeadScoring => lead_examples(n, seed),
        ModelKind::Churn => churn_examples(n, seed),
        ModelKind::Engagement => engagement_examples(n, seed),
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
