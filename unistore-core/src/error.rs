//! Error types and result types for document store operations.
//!
//! Every fallible operation returns [`DocumentStoreResult<T>`]. A record that is
//! simply absent is not an error: reads report it as `Ok(None)` and deletes as a
//! zero count.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between record formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The store address is malformed or unreachable, or the liveness check failed.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The deadline established at connect time elapsed before the operation completed.
    #[error("Deadline exceeded while running {0}")]
    DeadlineExceeded(String),
    /// A filter expression cannot be expressed by the backend.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    /// An update description is empty or malformed.
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),
    /// A record, batch or index definition cannot be turned into a valid request.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The store rejected a write (constraint violation, duplicate key, ...).
    #[error("Write error: {0}")]
    Write(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Missing or unusable client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
