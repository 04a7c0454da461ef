//! In-process backend
//!
//! Keeps the document in memory. Besides embedding, it is the test double for
//! the coordinator: it records every write, can fail on demand, can delay
//! writes to simulate a slow store, and tracks how many writes overlapped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::backend::{Backend, BackendError};
use crate::domain::{schema, Document};

#[derive(Default)]
struct MemoryState {
    document: Option<Document>,
    written: Vec<Document>,
    write_attempts: usize,
    failing_writes: usize,
    failing_reads: usize,
}

/// Backend holding the document in process memory
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryBackend {
    /// Empty (unseeded) backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds a document
    pub fn with_document(document: Document) -> Self {
        let backend = Self::new();
        backend.lock().document = Some(document);
        backend
    }

    /// Delays every write by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock can only come from a failing test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next `n` writes fail with an I/O error
    pub fn fail_next_writes(&self, n: usize) {
        self.lock().failing_writes = n;
    }

    /// Makes the next `n` reads fail with an I/O error
    pub fn fail_next_reads(&self, n: usize) {
        self.lock().failing_reads = n;
    }

    /// The currently stored document
    pub fn stored(&self) -> Option<Document> {
        self.lock().document.clone()
    }

    /// Successful writes, oldest first
    pub fn written(&self) -> Vec<Document> {
        self.lock().written.clone()
    }

    pub fn write_count(&self) -> usize {
        self.lock().written.len()
    }

    /// Writes attempted, failed ones included
    pub fn write_attempts(&self) -> usize {
        self.lock().write_attempts
    }

    /// Highest number of writes that were in progress at the same time
    pub fn peak_concurrent_writes(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self) -> Result<Option<Document>, BackendError> {
        let mut state = self.lock();
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(BackendError::Io("simulated read failure".to_string()));
        }
        Ok(state.document.clone())
    }

    async fn write(&self, document: &Document) -> Result<(), BackendError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = {
            let mut state = self.lock();
            state.write_attempts += 1;
            if state.failing_writes > 0 {
                state.failing_writes -= 1;
                Err(BackendError::Io("simulated write failure".to_string()))
            } else {
                match schema::check(document) {
                    Ok(()) => {
                        state.document = Some(document.clone());
                        state.written.push(document.clone());
                        Ok(())
                    }
                    Err(e) => Err(BackendError::Rejected(e)),
                }
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_unseeded() {
        let backend = MemoryBackend::new();
        assert!(backend.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn records_writes() {
        let backend = MemoryBackend::new();
        let doc = Document::seed();
        backend.write(&doc).await.unwrap();

        assert_eq!(backend.write_count(), 1);
        assert_eq!(backend.stored(), Some(doc.clone()));
        assert_eq!(backend.read().await.unwrap(), Some(doc));
        assert_eq!(backend.peak_concurrent_writes(), 1);
    }

    #[tokio::test]
    async fn scripted_failures() {
        let backend = MemoryBackend::with_document(Document::seed());
        backend.fail_next_writes(1);
        backend.fail_next_reads(1);

        assert!(matches!(backend.write(&Document::seed()).await, Err(BackendError::Io(_))));
        assert!(backend.read().await.is_err());

        backend.write(&Document::seed()).await.unwrap();
        assert!(backend.read().await.unwrap().is_some());
        assert_eq!(backend.write_attempts(), 2);
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_document() {
        let backend = MemoryBackend::new();
        let mut doc = Document::seed();
        doc.settings.name.clear();
        assert!(matches!(backend.write(&doc).await, Err(BackendError::Rejected(_))));
        assert!(backend.stored().is_none());
    }
}
