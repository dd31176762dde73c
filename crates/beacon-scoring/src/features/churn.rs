use super::history::{days_between, days_since_latest, mean_inbound_sentiment, messages_until, ReplyStats};
use super::{for_each_page, FeatureExtractor, FeatureVector};
use crate::dataset::{Label, TrainingExample};
use crate::error::ScoringResult;
use crate::kind::ModelKind;
use beacon_store::{ContactRecord, EntityStore, MessageRecord};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Whole-word phrases in inbound messages that signal a contact wants out.
static UNSUBSCRIBE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:unsubscribe|stop|remove me|opt[ -]out|cancel)\b")
        .expect("unsubscribe regex should be valid")
});

/// Churn features, keyed by contact id.
#[derive(Debug, Clone)]
pub struct ChurnFeatures {
    as_of: DateTime<Utc>,
}

impl ChurnFeatures {
    #[must_use]
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self { as_of }
    }

    fn features_for(&self, store: &dyn EntityStore, contact: &ContactRecord) -> ScoringResult<FeatureVector> {
        let messages = messages_until(store, &contact.id, self.as_of)?;
        let recent = self.count_between(&messages, 0, 30);
        let previous = self.count_between(&messages, 30, 60);
        let unsubscribe_mentions = messages.iter().filter(|m| m.is_inbound() && mentions_unsubscribe(&m.body)).count();

        FeatureVector::from_values(
            ModelKind::Churn,
            vec![
                days_since_latest(messages.iter().map(|m| m.sent_at), self.as_of),
                recent as f64,
                mean_inbound_sentiment(&messages),
                engagement_trend(recent, previous),
                unsubscribe_mentions as f64,
                ReplyStats::from_messages(&messages).response_rate(),
                days_between(contact.created_at, self.as_of),
            ],
        )
    }

    /// Messages sent between `from_days` (exclusive) and `to_days` (inclusive) before `as_of`.
    fn count_between(&self, messages: &[MessageRecord], from_days: i64, to_days: i64) -> usize {
        let newest = self.as_of - Duration::days(from_days);
        let oldest = self.as_of - Duration::days(to_days);
        messages.iter().filter(|m| m.sent_at > oldest && m.sent_at <= newest).count()
    }
}

/// Relative change in activity between the last 30 days and the 30 before, in [-1, 1].
fn engagement_trend(recent: usize, previous: usize) -> f64 {
    let scale = recent.max(previous).max(1) as f64;
    (recent as f64 - previous as f64) / scale
}

fn mentions_unsubscribe(body: &str) -> bool {
    UNSUBSCRIBE_REGEX.is_match(body)
}

impl FeatureExtractor for ChurnFeatures {
    fn kind(&self) -> ModelKind {
        ModelKind::Churn
    }

    fn extract(&self, store: &dyn EntityStore, entity_id: &str) -> ScoringResult<FeatureVector> {
        let contact = store.contact(entity_id)?;
        self.features_for(store, &contact)
    }

    fn training_examples(&self, store: &dyn EntityStore, page_size: usize) -> ScoringResult<Vec<TrainingExample>> {
        let mut examples = Vec::new();
        for_each_page(
            page_size,
            |page| store.contacts(page),
            |contact| {
                if let Some(churned) = contact.churned {
                    examples.push(TrainingExample::new(self.features_for(store, &contact)?, Label::Outcome(churned)));
                }
                Ok(())
            },
        )?;
        Ok(examples)
    }

    fn count_examples(&self, store: &dyn EntityStore) -> ScoringResult<usize> {
        Ok(store.count_labeled_contacts()?)
    }
}
