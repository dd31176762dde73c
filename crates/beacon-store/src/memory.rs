//! In-memory entity store backed by a JSON snapshot.

use crate::error::{EntityType, StoreError, StoreResult};
use crate::records::{ContactRecord, ConversationRecord, LeadRecord, MessageRecord};
use crate::store::{EntityStore, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A full dump of the entities the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    #[serde(default)]
    pub contacts: Vec<ContactRecord>,
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    #[serde(default)]
    pub leads: Vec<LeadRecord>,
}

impl EntitySnapshot {
    pub fn load_json(path: &Path) -> StoreResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save_json(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Indexed, immutable view over an [`EntitySnapshot`].
///
/// Listings follow snapshot order. Per-contact message lists are sorted by
/// `sent_at` (ties broken by id) once at construction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: EntitySnapshot,
    contact_idx: HashMap<String, usize>,
    lead_idx: HashMap<String, usize>,
    message_idx: HashMap<String, usize>,
    conversations_by_contact: HashMap<String, Vec<usize>>,
    messages_by_contact: HashMap<String, Vec<usize>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(snapshot: EntitySnapshot) -> Self {
        let contact_idx = index_by(&snapshot.contacts, |c| &c.id);
        let lead_idx = index_by(&snapshot.leads, |l| &l.id);
        let message_idx = index_by(&snapshot.messages, |m| &m.id);

        let mut conversations_by_contact: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, conv) in snapshot.conversations.iter().enumerate() {
            conversations_by_contact.entry(conv.contact_id.clone()).or_default().push(i);
        }

        let mut messages_by_contact: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, msg) in snapshot.messages.iter().enumerate() {
            messages_by_contact.entry(msg.contact_id.clone()).or_default().push(i);
        }
        for indices in messages_by_contact.values_mut() {
            indices.sort_by(|&a, &b| {
                let (ma, mb) = (&snapshot.messages[a], &snapshot.messages[b]);
                ma.sent_at.cmp(&mb.sent_at).then_with(|| ma.id.cmp(&mb.id))
            });
        }

        debug!(
            contacts = snapshot.contacts.len(),
            conversations = snapshot.conversations.len(),
            messages = snapshot.messages.len(),
            leads = snapshot.leads.len(),
            "Indexed entity snapshot"
        );

        Self {
            snapshot,
            contact_idx,
            lead_idx,
            message_idx,
            conversations_by_contact,
            messages_by_contact,
        }
    }

    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self::new(EntitySnapshot::load_json(path)?))
    }

    pub fn snapshot(&self) -> &EntitySnapshot {
        &self.snapshot
    }
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    items.iter().enumerate().map(|(i, item)| (key(item).clone(), i)).collect()
}

fn page_of<T: Clone>(items: &[T], page: Page) -> Vec<T> {
    items.iter().skip(page.skip).take(page.limit).cloned().collect()
}

impl EntityStore for MemoryStore {
    fn contact(&self, id: &str) -> StoreResult<ContactRecord> {
        self.contact_idx
            .get(id)
            .map(|&i| self.snapshot.contacts[i].clone())
            .ok_or_else(|| StoreError::not_found(EntityType::Contact, id))
    }

    fn lead(&self, id: &str) -> StoreResult<LeadRecord> {
        self.lead_idx
            .get(id)
            .map(|&i| self.snapshot.leads[i].clone())
            .ok_or_else(|| StoreError::not_found(EntityType::Lead, id))
    }

    fn message(&self, id: &str) -> StoreResult<MessageRecord> {
        self.message_idx
            .get(id)
            .map(|&i| self.snapshot.messages[i].clone())
            .ok_or_else(|| StoreError::not_found(EntityType::Message, id))
    }

    fn conversations_for_contact(&self, contact_id: &str) -> StoreResult<Vec<ConversationRecord>> {
        Ok(self
            .conversations_by_contact
            .get(contact_id)
            .map(|idx| idx.iter().map(|&i| self.snapshot.conversations[i].clone()).collect())
            .unwrap_or_default())
    }

    fn messages_for_contact(&self, contact_id: &str) -> StoreResult<Vec<MessageRecord>> {
        Ok(self
            .messages_by_contact
            .get(contact_id)
            .map(|idx| idx.iter().map(|&i| self.snapshot.messages[i].clone()).collect())
            .unwrap_or_default())
    }

    fn contacts(&self, page: Page) -> StoreResult<Vec<ContactRecord>> {
        Ok(page_of(&self.snapshot.contacts, page))
    }

    fn leads(&self, page: Page) -> StoreResult<Vec<LeadRecord>> {
        Ok(page_of(&self.snapshot.leads, page))
    }

    fn messages(&self, page: Page) -> StoreResult<Vec<MessageRecord>> {
        Ok(page_of(&self.snapshot.messages, page))
    }

    fn count_labeled_contacts(&self) -> StoreResult<usize> {
        Ok(self.snapshot.contacts.iter().filter(|c| c.churned.is_some()).count())
    }

    fn count_labeled_leads(&self) -> StoreResult<usize> {
        Ok(self.snapshot.leads.iter().filter(|l| l.quality_score.is_some()).count())
    }

    fn count_labeled_outbound_messages(&self, until: DateTime<Utc>) -> StoreResult<usize> {
        Ok(self
            .snapshot
            .messages
            .iter()
            .filter(|m| m.is_outbound() && m.engaged.is_some() && m.sent_at <= until)
            .count())
    }
}
