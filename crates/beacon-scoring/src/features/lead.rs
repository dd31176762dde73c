use super::history::{days_since_latest, mean_inbound_sentiment, messages_until, ReplyStats};
use super::{for_each_page, FeatureExtractor, FeatureVector};
use crate::dataset::{Label, TrainingExample};
use crate::error::ScoringResult;
use crate::kind::ModelKind;
use beacon_store::{EntityStore, LeadRecord};
use chrono::{DateTime, Utc};

/// Lead-scoring features, keyed by lead id.
#[derive(Debug, Clone)]
pub struct LeadFeatures {
    as_of: DateTime<Utc>,
}

impl LeadFeatures {
    #[must_use]
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self { as_of }
    }

    fn features_for(&self, store: &dyn EntityStore, lead: &LeadRecord) -> ScoringResult<FeatureVector> {
        let messages = messages_until(store, &lead.contact_id, self.as_of)?;
        let conversations = store.conversations_for_contact(&lead.contact_id)?;
        let replies = ReplyStats::from_messages(&messages);
        let inbound = messages.iter().filter(|m| m.is_inbound()).count();
        let inbound_ratio = if messages.is_empty() { 0.0 } else { inbound as f64 / messages.len() as f64 };

        FeatureVector::from_values(
            ModelKind::LeadScoring,
            vec![
                replies.response_rate(),
                replies.avg_response_minutes(),
                messages.len() as f64,
                lead.engagement_score.unwrap_or(0.0).clamp(0.0, 100.0),
                mean_inbound_sentiment(&messages),
                days_since_latest(messages.iter().map(|m| m.sent_at), self.as_of),
                conversations.iter().filter(|c| c.started_at <= self.as_of).count() as f64,
                inbound_ratio,
            ],
        )
    }
}

impl FeatureExtractor for LeadFeatures {
    fn kind(&self) -> ModelKind {
        ModelKind::LeadScoring
    }

    fn extract(&self, store: &dyn EntityStore, entity_id: &str) -> ScoringResult<FeatureVector> {
        let lead = store.lead(entity_id)?;
        self.features_for(store, &lead)
    }

    fn training_examples(&self, store: &dyn EntityStore, page_size: usize) -> ScoringResult<Vec<TrainingExample>> {
        let mut examples = Vec::new();
        for_each_page(
            page_size,
            |page| store.leads(page),
            |lead| {
                if let Some(score) = lead.quality_score {
                    examples.push(TrainingExample::new(self.features_for(store, &lead)?, Label::Score(score)));
                }
                Ok(())
            },
        )?;
        Ok(examples)
    }

    fn count_examples(&self, store: &dyn EntityStore) -> ScoringResult<usize> {
        Ok(store.count_labeled_leads()?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::history::fixtures::{as_of, msg};
    use super::super::RESPONSE_TIME_SENTINEL_MINUTES;
    use super::*;
    use crate::error::ScoringError;
    use beacon_store::{Direction, EntitySnapshot, MemoryStore};

    fn lead(id: &str, contact: &str, quality: Option<f64>) -> LeadRecord {
        LeadRecord {
            id: id.to_string(),
            contact_id: contact.to_string(),
            created_at: as_of(),
            engagement_score: Some(82.0),
            quality_score: quality,
        }
    }

    #[test]
    fn test_lead_without_history_gets_defaults() {
        let store = MemoryStore::new(EntitySnapshot { leads: vec![lead("l1", "ghost", None)], ..Default::default() });
        let v = LeadFeatures::new(as_of()).extract(&store, "l1").unwrap();
        assert_eq!(v.get("response_rate"), Some(0.0));
        assert_eq!(v.get("avg_response_time_minutes"), Some(RESPONSE_TIME_SENTINEL_MINUTES));
        assert_eq!(v.get("message_count"), Some(0.0));
        assert_eq!(v.get("engagement_score"), Some(82.0));
        assert_eq!(v.len(), 8);
    }

    #[test]
    fn test_lead_features_from_history() {
        let messages = vec![
            msg("1", "a", Direction::Outbound, 2 * 1440, None),
            msg("2", "a", Direction::Inbound, 2 * 1440 - 20, Some(0.6)),
            msg("3", "a", Direction::Outbound, 1440, None),
            msg("4", "a", Direction::Inbound, 1440 - 40, Some(0.8)),
        ];
        let store = MemoryStore::new(EntitySnapshot {
            leads: vec![lead("l1", "c1", Some(90.0))],
            messages,
            ..Default::default()
        });
        let v = LeadFeatures::new(as_of()).extract(&store, "l1").unwrap();
        assert_eq!(v.get("response_rate"), Some(1.0));
        assert!((v.get("avg_response_time_minutes").unwrap() - 30.0).abs() < 1e-9);
        assert!((v.get("sentiment_score").unwrap() - 0.7).abs() < 1e-9);
        assert_eq!(v.get("inbound_ratio"), Some(0.5));
        assert!(v.get("days_since_last_contact").unwrap() < 1.0);
    }

    #[test]
    fn test_unknown_lead_is_entity_not_found() {
        let store = MemoryStore::new(EntitySnapshot::default());
        let err = LeadFeatures::new(as_of()).extract(&store, "missing").unwrap_err();
        assert!(matches!(err, ScoringError::EntityNotFound { .. }));
    }

    #[test]
    fn test_only_labeled_leads_become_examples() {
        let store = MemoryStore::new(EntitySnapshot {
            leads: vec![lead("l1", "c1", Some(70.0)), lead("l2", "c2", None), lead("l3", "c3", Some(10.0))],
            ..Default::default()
        });
        let extractor = LeadFeatures::new(as_of());
        let examples = extractor.training_examples(&store, 2).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(extractor.count_examples(&store).unwrap(), 2);
        assert_eq!(examples[1].label, Label::Score(10.0));
    }
}
