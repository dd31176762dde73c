//! Signals shared by several extractors.

use super::{DAYS_SENTINEL, RESPONSE_TIME_SENTINEL_MINUTES};
use beacon_store::{Direction, EntityStore, MessageRecord, StoreResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A contact's messages up to and including `until`, oldest first.
pub(super) fn messages_until(
    store: &dyn EntityStore,
    contact_id: &str,
    until: DateTime<Utc>,
) -> StoreResult<Vec<MessageRecord>> {
    let mut messages = store.messages_for_contact(contact_id)?;
    messages.retain(|m| m.sent_at <= until);
    Ok(messages)
}

/// Outbound messages and whether the contact answered them.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct ReplyStats {
    pub outbound: usize,
    pub replied: usize,
    pub reply_minutes: f64,
}

impl ReplyStats {
    /// An outbound message counts as replied when a later inbound message
    /// exists in the same conversation; the delay is measured to the first one.
    pub fn from_messages(messages: &[MessageRecord]) -> Self {
        let mut next_inbound: HashMap<&str, DateTime<Utc>> = HashMap::new();
        let mut stats = Self::default();
        for msg in messages.iter().rev() {
            match msg.direction {
                Direction::Inbound => {
                    next_inbound.insert(msg.conversation_id.as_str(), msg.sent_at);
                }
                Direction::Outbound => {
                    stats.outbound += 1;
                    if let Some(reply_at) = next_inbound.get(msg.conversation_id.as_str()) {
                        stats.replied += 1;
                        stats.reply_minutes += minutes_between(msg.sent_at, *reply_at);
                    }
                }
            }
        }
        stats
    }

    pub fn response_rate(&self) -> f64 {
        if self.outbound == 0 { 0.0 } else { self.replied as f64 / self.outbound as f64 }
    }

    pub fn avg_response_minutes(&self) -> f64 {
        if self.replied == 0 {
            RESPONSE_TIME_SENTINEL_MINUTES
        } else {
            self.reply_minutes / self.replied as f64
        }
    }
}

/// Mean sentiment of inbound messages that carry one; neutral when none do.
pub(super) fn mean_inbound_sentiment(messages: &[MessageRecord]) -> f64 {
    let (sum, n) = messages
        .iter()
        .filter(|m| m.is_inbound())
        .filter_map(|m| m.sentiment)
        .fold((0.0, 0usize), |(sum, n), s| (sum + s, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

pub(super) fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_seconds() as f64 / 60.0).max(0.0)
}

pub(super) fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_seconds() as f64 / 86_400.0).max(0.0)
}

/// Days from the most recent timestamp to `as_of`, or the sentinel.
pub(super) fn days_since_latest(
    times: impl Iterator<Item = DateTime<Utc>>,
    as_of: DateTime<Utc>,
) -> f64 {
    times.max().map_or(DAYS_SENTINEL, |t| days_between(t, as_of).min(DAYS_SENTINEL))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_reply_stats_pairs_within_conversation() {
        let messages = vec![
            msg("1", "a", Direction::Outbound, 100, None),
            msg("2", "b", Direction::Outbound, 90, None),
            msg("3", "a", Direction::Inbound, 70, Some(0.5)),
            msg("4", "a", Direction::Outbound, 60, None),
        ];
        let stats = ReplyStats::from_messages(&messages);
        assert_eq!(stats.outbound, 3);
        assert_eq!(stats.replied, 1);
        assert!((stats.response_rate() - 1.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_response_minutes() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history_defaults() {
        let stats = ReplyStats::from_messages(&[]);
        assert_eq!(stats.response_rate(), 0.0);
        assert_eq!(stats.avg_response_minutes(), RESPONSE_TIME_SENTINEL_MINUTES);
        assert_eq!(mean_inbound_sentiment(&[]), 0.0);
        assert_eq!(days_since_latest(std::iter::empty(), as_of()), DAYS_SENTINEL);
    }

    #[test]
    fn test_sentiment_ignores_outbound_and_unscored() {
        let messages = vec![
            msg("1", "a", Direction::Outbound, 10, Some(-1.0)),
            msg("2", "a", Direction::Inbound, 9, Some(0.8)),
            msg("3", "a", Direction::Inbound, 8, None),
            msg("4", "a", Direction::Inbound, 7, Some(0.2)),
        ];
        assert!((mean_inbound_sentiment(&messages) - 0.5).abs() < 1e-9);
    }
}
