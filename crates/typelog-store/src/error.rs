//! Error types for typelog-store
//!
//! Every failure is returned to the immediate caller. Nothing is retried
//! or logged in place of being returned.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur in event log operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be opened
    #[error("Open error: {0}")]
    Open(String),

    /// The backing store failed to flush on close
    #[error("Close error: {0}")]
    Close(String),

    /// An event payload could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// A stored record could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// A namespace could not be created or opened inside a transaction
    #[error("Namespace error for '{event_type}': {message}")]
    Namespace { event_type: String, message: String },

    /// Iteration was requested for an event type that was never logged
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    /// A write transaction failed; nothing it wrote is visible
    #[error("Commit error: {0}")]
    Commit(String),

    /// A transaction could not be started
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The store failed while reading
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored key is not an 8-byte sequence number
    #[error("Invalid sequence key of length {0}")]
    InvalidKey(usize),

    /// The sequence counter of a namespace has no next value
    #[error("Sequence exhausted for '{0}'")]
    SequenceExhausted(String),

    /// I/O error while preparing the store location
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type alias for event log operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Create a new Encode error
    pub fn encode(message: impl Display) -> Self {
        Self::Encode(message.to_string())
    }

    /// Create a new Decode error
    pub fn decode(message: impl Display) -> Self {
        Self::Decode(message.to_string())
    }

    /// Create a new Namespace error for an event type
    pub fn namespace(event_type: impl Into<String>, message: impl Display) -> Self {
        Self::Namespace {
            event_type: event_type.into(),
            message: message.to_string(),
        }
    }

    /// Create a new NamespaceNotFound error
    pub fn namespace_not_found(event_type: impl Into<String>) -> Self {
        Self::NamespaceNotFound(event_type.into())
    }

    /// Create a new Commit error
    pub fn commit(message: impl Display) -> Self {
        Self::Commit(message.to_string())
    }

    /// Whether this error reports an event type that was never logged
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NamespaceNotFound(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::Transaction(err.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::Commit(err.to_string())
    }
}
