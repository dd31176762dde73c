//! Error types for the entity store.

use std::fmt;
use thiserror::Error;

/// Entity families held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Contact,
    Conversation,
    Message,
    Lead,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Contact => "contact",
            Self::Conversation => "conversation",
            Self::Message => "message",
            Self::Lead => "lead",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while reading entities.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityType, id: String },

    /// The backing store could not be reached or answered with garbage.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(entity: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
