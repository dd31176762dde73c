//! Read-only entity records.
//!
//! Records are owned by the persistence layer. The scoring pipeline only ever
//! reads them, so every type here is a plain data carrier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person the platform has talked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Known outcome: did this contact disengage? `None` when unknown.
    #[serde(default)]
    pub churned: Option<bool>,
}

/// A thread of messages with a single contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub contact_id: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sent by the contact.
    Inbound,
    /// Sent by us.
    Outbound,
}

/// A single message inside a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub conversation_id: String,
    pub contact_id: String,
    pub direction: Direction,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    /// Sentiment in [-1, 1] as scored upstream.
    #[serde(default)]
    pub sentiment: Option<f64>,
    /// Known outcome for outbound messages: did the contact respond positively?
    #[serde(default)]
    pub engaged: Option<bool>,
}

impl MessageRecord {
    pub fn is_inbound(&self) -> bool {
        self.direction == Direction::Inbound
    }

    pub fn is_outbound(&self) -> bool {
        self.direction == Direction::Outbound
    }
}

/// A sales lead attached to a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: String,
    pub contact_id: String,
    pub created_at: DateTime<Utc>,
    /// CRM engagement score in [0, 100].
    #[serde(default)]
    pub engagement_score: Option<f64>,
    /// Known lead quality in [0, 100], assigned after the sales outcome.
    #[serde(default)]
    pub quality_score: Option<f64>,
}
