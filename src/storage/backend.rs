//! Persistence port
//!
//! A backend stores the whole aggregate atomically. It knows nothing about
//! dirty flags or debouncing; it only reads and writes complete documents.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Document, ValidationError};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error("Stored data is malformed: {0}")]
    Malformed(String),

    #[error("Document rejected: {0}")]
    Rejected(#[from] ValidationError),
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Io(e.to_string())
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::Io(e.to_string())
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Reads the stored document; `Ok(None)` means nothing has been seeded yet
    async fn read(&self) -> Result<Option<Document>, BackendError>;

    /// Replaces the stored document
    async fn write(&self, document: &Document) -> Result<(), BackendError>;

    /// Short label for logs and `wiki status`
    fn describe(&self) -> String;
}
