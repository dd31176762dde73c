use super::history::days_since_latest;
use super::{for_each_page, FeatureExtractor, FeatureVector};
use crate::dataset::{Label, TrainingExample};
use crate::error::{ScoringError, ScoringResult};
use crate::kind::ModelKind;
use beacon_store::{EntityStore, MessageRecord};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::HashMap;

/// Engagement features, keyed by outbound message id.
///
/// Everything is measured relative to the message's own send time, so only
/// history that existed when the message went out is used.
#[derive(Debug, Clone)]
pub struct EngagementFeatures {
    as_of: DateTime<Utc>,
}

impl EngagementFeatures {
    #[must_use]
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self { as_of }
    }

    fn features_for(&self, message: &MessageRecord, history: &[MessageRecord]) -> ScoringResult<FeatureVector> {
        let sent_at = message.sent_at.min(self.as_of);
        let earlier = history.iter().filter(|m| m.sent_at < sent_at && m.id != message.id);

        let (engaged, labeled) = earlier
            .clone()
            .filter(|m| m.is_outbound())
            .filter_map(|m| m.engaged)
            .fold((0usize, 0usize), |(e, n), outcome| (e + usize::from(outcome), n + 1));
        let past_engagement_rate = if labeled == 0 { 0.0 } else { engaged as f64 / labeled as f64 };

        let body = message.body.as_str();
        FeatureVector::from_values(
            ModelKind::Engagement,
            vec![
                f64::from(message.sent_at.hour()),
                f64::from(message.sent_at.weekday().num_days_from_monday()),
                body.chars().count() as f64,
                past_engagement_rate,
                flag(body.contains('?')),
                flag(contains_link(body)),
                days_since_latest(earlier.filter(|m| m.is_inbound()).map(|m| m.sent_at), sent_at),
            ],
        )
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn contains_link(body: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("http://") || body.contains("https://") || body.contains("www.")
}

impl FeatureExtractor for EngagementFeatures {
    fn kind(&self) -> ModelKind {
        ModelKind::Engagement
    }

    fn extract(&self, store: &dyn EntityStore, entity_id: &str) -> ScoringResult<FeatureVector> {
        let message = store.message(entity_id)?;
        if !message.is_outbound() {
            return Err(ScoringError::InvalidFeatures(format!("message '{entity_id}' is not an outbound send")));
        }
        let history = store.messages_for_contact(&message.contact_id)?;
        self.features_for(&message, &history)
    }

    fn training_examples(&self, store: &dyn EntityStore, page_size: usize) -> ScoringResult<Vec<TrainingExample>> {
        let mut histories: HashMap<String, Vec<MessageRecord>> = HashMap::new();
        let mut examples = Vec::new();
        for_each_page(
            page_size,
            |page| store.messages(page),
            |message| {
                let Some(engaged) = message.engaged.filter(|_| message.is_outbound()) else {
                    return Ok(());
                };
                if message.sent_at > self.as_of {
                    return Ok(());
                }
                if !histories.contains_key(&message.contact_id) {
                    let history = store.messages_for_contact(&message.contact_id)?;
                    histories.insert(message.contact_id.clone(), history);
                }
                let history = histories.get(&message.contact_id).map_or(&[][..], Vec::as_slice);
                examples.push(TrainingExample::new(self.features_for(&message, history)?, Label::Outcome(engaged)));
                Ok(())
            },
        )?;
        Ok(examples)
    }

    fn count_examples(&self, store: &dyn EntityStore) -> ScoringResult<usize> {
        Ok(store.count_labeled_outbound_messages(self.as_of)?)
    }
}
