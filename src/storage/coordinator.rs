//! Persistence coordinator
//!
//! Owns the live [`DocumentStore`] and keeps it in sync with a [`Backend`]:
//!
//! - `load` reads the backend once; an empty backend is seeded with
//!   [`Document::seed`], a failing one leaves the store absent.
//! - `edit` applies synchronous store mutations. Each applied mutation wakes
//!   the autosave worker, which waits for a quiet period (the debounce) and
//!   restarts that wait on every further mutation, so bursts of edits are
//!   coalesced into a single write of the latest state.
//! - Writes are single-flight: a save requested while another is running
//!   waits for it, then writes whatever is still unsaved.
//! - A failed write keeps the dirty flag and records the error. There is no
//!   automatic retry; the next edit or an explicit `save_now` tries again.
//!
//! Progress is published as a [`SyncStatus`] on a watch channel.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{Backend, BackendError};
use crate::domain::{Document, DocumentStore};

/// Default quiet period before an autosave
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveOptions {
    pub debounce: Duration,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Failed to load wiki: {0}")]
    Load(#[source] BackendError),

    #[error("Failed to save wiki: {0}")]
    Save(#[source] BackendError),

    #[error("Wiki is not loaded")]
    NotLoaded,
}

/// Startup state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Runtime persistence state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    Clean,
    Dirty,
    Saving,
    Error,
}

/// Snapshot of the coordinator's state, e.g. for a save indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    pub load: LoadState,
    pub save: SaveState,
    /// Unsaved changes exist
    pub dirty: bool,
    pub load_error: Option<String>,
    pub save_error: Option<String>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            load: LoadState::Idle,
            save: SaveState::Clean,
            dirty: false,
            load_error: None,
            save_error: None,
        }
    }
}

struct Shared {
    backend: Arc<dyn Backend>,
    options: AutosaveOptions,
    store: Mutex<Option<DocumentStore>>,
    /// Signalled by every applied mutation
    changed: Notify,
    /// Held for the duration of a backend write
    flight: tokio::sync::Mutex<()>,
    status: watch::Sender<SyncStatus>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn store(&self) -> MutexGuard<'_, Option<DocumentStore>> {
        // Store mutations never panic midway, so a poisoned lock still holds
        // a consistent document.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update_status(&self, update: impl FnOnce(&mut SyncStatus)) {
        self.status.send_modify(update);
    }

    fn adopt(&self, document: Document) {
        *self.store() = Some(DocumentStore::new(document));
        self.update_status(|s| {
            *s = SyncStatus {
                load: LoadState::Ready,
                ..SyncStatus::default()
            }
        });
    }

    /// Reads the backend, seeding it when empty
    async fn fetch(&self) -> Result<Document, BackendError> {
        match self.backend.read().await? {
            Some(document) => {
                info!(backend = %self.backend.describe(), pages = document.pages.len(), "loaded wiki");
                Ok(document)
            }
            None => {
                let seed = Document::seed();
                self.backend.write(&seed).await?;
                info!(backend = %self.backend.describe(), "backend was empty, wrote seed document");
                Ok(seed)
            }
        }
    }

    /// Writes the current document if dirty; the caller holds `flight`
    async fn write_dirty(&self) -> Result<bool, CoordinatorError> {
        let (document, generation) = {
            let guard = self.store();
            let store = guard.as_ref().ok_or(CoordinatorError::NotLoaded)?;
            if !store.is_dirty() {
                return Ok(false);
            }
            (store.document().clone(), store.generation())
        };

        self.update_status(|s| s.save = SaveState::Saving);

        match self.backend.write(&document).await {
            Ok(()) => {
                let still_dirty = {
                    let mut guard = self.store();
                    match guard.as_mut() {
                        Some(store) => !store.mark_saved(generation),
                        None => false,
                    }
                };
                self.update_status(|s| {
                    s.dirty = still_dirty;
                    s.save = if still_dirty { SaveState::Dirty } else { SaveState::Clean };
                    s.save_error = None;
                });
                info!(generation, still_dirty, "saved wiki");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "saving wiki failed, changes kept in memory");
                self.update_status(|s| {
                    s.dirty = true;
                    s.save = SaveState::Error;
                    s.save_error = Some(e.to_string());
                });
                Err(CoordinatorError::Save(e))
            }
        }
    }

    async fn save(&self) -> Result<bool, CoordinatorError> {
        let _flight = self.flight.lock().await;
        self.write_dirty().await
    }
}

async fn autosave(shared: Arc<Shared>) {
    loop {
        shared.changed.notified().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(shared.options.debounce) => break,
                _ = shared.changed.notified() => {
                    debug!("change during debounce window, timer re-armed");
                }
            }
        }

        // Errors are recorded in the status; the next change retries.
        let _ = shared.save().await;
    }
}

/// Loads, edits and autosaves one wiki document
pub struct Coordinator {
    shared: Arc<Shared>,
}

impl Coordinator {
    pub fn new(backend: Arc<dyn Backend>, options: AutosaveOptions) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                options,
                store: Mutex::new(None),
                changed: Notify::new(),
                flight: tokio::sync::Mutex::new(()),
                status,
                worker: Mutex::new(None),
            }),
        }
    }

    /// Reads the document from the backend (seeding an empty one)
    ///
    /// Does nothing once loaded. On failure the store stays absent and the
    /// error is recorded; call again to retry.
    pub async fn load(&self) -> Result<(), CoordinatorError> {
        if self.shared.store().is_some() {
            return Ok(());
        }

        self.shared.update_status(|s| {
            s.load = LoadState::Loading;
            s.load_error = None;
        });

        match self.shared.fetch().await {
            Ok(document) => {
                self.shared.adopt(document);
                self.spawn_worker();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "loading wiki failed");
                self.shared.update_status(|s| {
                    s.load = LoadState::Failed;
                    s.load_error = Some(e.to_string());
                });
                Err(CoordinatorError::Load(e))
            }
        }
    }

    /// Discards the in-memory document and re-reads the backend
    ///
    /// If the read fails the current document is kept.
    pub async fn reload(&self) -> Result<(), CoordinatorError> {
        let _flight = self.shared.flight.lock().await;

        match self.shared.fetch().await {
            Ok(document) => {
                self.shared.adopt(document);
                self.spawn_worker();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "reloading wiki failed");
                self.shared.update_status(|s| s.load_error = Some(e.to_string()));
                Err(CoordinatorError::Load(e))
            }
        }
    }

    fn spawn_worker(&self) {
        let mut worker = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if worker.is_none() {
            *worker = Some(tokio::spawn(autosave(Arc::clone(&self.shared))));
        }
    }

    fn stop_worker(&self) {
        let handle = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// Applies a mutation to the store and arms the autosave if it changed
    /// anything
    pub fn edit<R>(&self, mutate: impl FnOnce(&mut DocumentStore) -> R) -> Result<R, CoordinatorError> {
        let (result, changed) = {
            let mut guard = self.shared.store();
            let store = guard.as_mut().ok_or(CoordinatorError::NotLoaded)?;
            let before = store.generation();
            let result = mutate(store);
            (result, store.generation() != before)
        };

        if changed {
            debug!("document changed, autosave armed");
            self.shared.update_status(|s| {
                s.dirty = true;
                if s.save != SaveState::Saving {
                    s.save = SaveState::Dirty;
                }
            });
            self.shared.changed.notify_one();
        }

        Ok(result)
    }

    /// Read-only access to the store
    pub fn read<R>(&self, view: impl FnOnce(&DocumentStore) -> R) -> Result<R, CoordinatorError> {
        let guard = self.shared.store();
        let store = guard.as_ref().ok_or(CoordinatorError::NotLoaded)?;
        Ok(view(store))
    }

    /// Saves immediately if dirty, waiting for any save in flight first
    ///
    /// Returns whether a write happened.
    pub async fn save_now(&self) -> Result<bool, CoordinatorError> {
        self.shared.save().await
    }

    pub fn status(&self) -> SyncStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.shared.backend
    }

    /// Stops the autosave timer and flushes unsaved changes once
    pub async fn close(&self) -> Result<(), CoordinatorError> {
        let _flight = self.shared.flight.lock().await;
        self.stop_worker();

        if self.shared.store().is_none() {
            return Ok(());
        }
        self.shared.write_dirty().await.map(|_| ())
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SettingsPatch;
    use crate::storage::MemoryBackend;

    fn rename(name: &str) -> impl FnOnce(&mut DocumentStore) -> bool + '_ {
        move |store| {
            store.update_settings(SettingsPatch {
                name: Some(name.to_string()),
                ..SettingsPatch::default()
            })
        }
    }

    fn coordinator(backend: &Arc<MemoryBackend>) -> Coordinator {
        Coordinator::new(backend.clone(), AutosaveOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn edit_before_load_fails() {
        let backend = Arc::new(MemoryBackend::new());
        let coord = coordinator(&backend);
        assert!(matches!(coord.edit(rename("x")), Err(CoordinatorError::NotLoaded)));
        assert_eq!(coord.status().load, LoadState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn load_adopts_stored_document() {
        let mut doc = Document::seed();
        doc.settings.name = "Stored".to_string();
        let backend = Arc::new(MemoryBackend::with_document(doc));
        let coord = coordinator(&backend);

        coord.load().await.unwrap();
        assert_eq!(coord.read(|s| s.document().settings.name.clone()).unwrap(), "Stored");
        assert_eq!(backend.write_count(), 0);
        assert_eq!(coord.status().load, LoadState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn noop_edit_does_not_arm_autosave() {
        let backend = Arc::new(MemoryBackend::with_document(Document::seed()));
        let coord = coordinator(&backend);
        coord.load().await.unwrap();

        coord.edit(|s| s.delete_page("missing")).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(backend.write_count(), 0);
        assert!(!coord.status().dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn save_now_bypasses_debounce() {
        let backend = Arc::new(MemoryBackend::with_document(Document::seed()));
        let coord = coordinator(&backend);
        coord.load().await.unwrap();

        coord.edit(rename("Now")).unwrap();
        assert!(coord.save_now().await.unwrap());
        assert_eq!(backend.write_count(), 1);
        assert_eq!(coord.status().save, SaveState::Clean);

        // the pending timer finds nothing left to save
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn close_flushes_pending_changes() {
        let backend = Arc::new(MemoryBackend::with_document(Document::seed()));
        let coord = coordinator(&backend);
        coord.load().await.unwrap();

        coord.edit(rename("Closing")).unwrap();
        coord.close().await.unwrap();

        assert_eq!(backend.write_count(), 1);
        assert_eq!(backend.stored().unwrap().settings.name, "Closing");

        // the autosave worker is gone
        coord.edit(rename("After")).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn status_is_published() {
        let backend = Arc::new(MemoryBackend::with_document(Document::seed()));
        let coord = coordinator(&backend);
        let mut rx = coord.subscribe();

        coord.load().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().load, LoadState::Ready);

        coord.edit(rename("Watched")).unwrap();
        assert_eq!(rx.borrow_and_update().save, SaveState::Dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_discards_unsaved_edits() {
        let backend = Arc::new(MemoryBackend::with_document(Document::seed()));
        let coord = coordinator(&backend);
        coord.load().await.unwrap();

        coord.edit(rename("Draft")).unwrap();
        coord.reload().await.unwrap();

        assert_eq!(coord.read(|s| s.document().settings.name.clone()).unwrap(), "CraftQuest Wiki");
        assert!(!coord.status().dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reload_keeps_current_document() {
        let backend = Arc::new(MemoryBackend::with_document(Document::seed()));
        let coord = coordinator(&backend);
        coord.load().await.unwrap();

        coord.edit(rename("Kept")).unwrap();
        backend.fail_next_reads(1);
        assert!(matches!(coord.reload().await, Err(CoordinatorError::Load(_))));

        assert_eq!(coord.read(|s| s.document().settings.name.clone()).unwrap(), "Kept");
        let status = coord.status();
        assert_eq!(status.load, LoadState::Ready);
        assert!(status.load_error.is_some());
        assert!(status.dirty);
    }
}
