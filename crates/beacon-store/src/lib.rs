//! Beacon Store
//!
//! Read-only access to the communication platform's entities:
//! - Entity records (contacts, conversations, messages, leads)
//! - The paginated `EntityStore` interface the scoring pipeline reads through
//! - `MemoryStore`, an indexed store over a JSON snapshot
//! - A seeded synthetic-history generator for bootstrapping training sets

pub mod error;
pub mod memory;
pub mod records;
pub mod store;
pub mod synthetic;

pub use error::{EntityType, StoreError, StoreResult};
pub use memory::{EntitySnapshot, MemoryStore};
pub use records::{ContactRecord, ConversationRecord, Direction, LeadRecord, MessageRecord};
pub use store::{EntityStore, Page};
pub use synthetic::{generate, SyntheticConfig};
