//! The read interface the scoring pipeline consumes.

use crate::error::StoreResult;
use crate::records::{ContactRecord, ConversationRecord, LeadRecord, MessageRecord};
use chrono::{DateTime, Utc};

/// A `skip`/`limit` window over an ordered entity listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Page {
    #[must_use]
    pub fn first(limit: usize) -> Self {
        Self { skip: 0, limit }
    }

    /// The page immediately after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self { skip: self.skip + self.limit, limit: self.limit }
    }
}

/// Read-only access to platform entities.
///
/// Listings are stable: the same store contents always yield the same order,
/// which keeps training-set assembly reproducible. Implementations never
/// expose a write path to the pipeline.
pub trait EntityStore: Send + Sync {
    fn contact(&self, id: &str) -> StoreResult<ContactRecord>;

    fn lead(&self, id: &str) -> StoreResult<LeadRecord>;

    fn message(&self, id: &str) -> StoreResult<MessageRecord>;

    fn conversations_for_contact(&self, contact_id: &str) -> StoreResult<Vec<ConversationRecord>>;

    /// Every message exchanged with the contact, oldest first.
    fn messages_for_contact(&self, contact_id: &str) -> StoreResult<Vec<MessageRecord>>;

    fn contacts(&self, page: Page) -> StoreResult<Vec<ContactRecord>>;

    fn leads(&self, page: Page) -> StoreResult<Vec<LeadRecord>>;

    fn messages(&self, page: Page) -> StoreResult<Vec<MessageRecord>>;

    /// Contacts with a known churn outcome.
    fn count_labeled_contacts(&self) -> StoreResult<usize>;

    /// Leads with a known quality score.
    fn count_labeled_leads(&self) -> StoreResult<usize>;

    /// Outbound messages with a known engagement outcome sent at or before `until`.
    fn count_labeled_outbound_messages(&self, until: DateTime<Utc>) -> StoreResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_advances_by_limit() {
        let page = Page::first(50);
        assert_eq!(page.next(), Page { skip: 50, limit: 50 });
        assert_eq!(page.next().next().skip, 100);
    }
}
