//! Autosave behaviour of the persistence coordinator
//!
//! Runs on tokio's paused clock, so debounce windows are exact and the tests
//! take no wall time.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::sleep;
use wiki_store::domain::{DocumentStore, SettingsPatch};
use wiki_store::storage::{
    AutosaveOptions, Backend, Coordinator, CoordinatorError, FileBackend, LoadState, MemoryBackend,
    SaveState,
};
use wiki_store::Document;

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn rename(name: &str) -> impl FnOnce(&mut DocumentStore) -> bool + '_ {
    move |store| {
        store.update_settings(SettingsPatch {
            name: Some(name.to_string()),
            ..SettingsPatch::default()
        })
    }
}

async fn loaded(backend: &Arc<MemoryBackend>) -> Coordinator {
    let coord = Coordinator::new(backend.clone(), AutosaveOptions::default());
    coord.load().await.unwrap();
    coord
}

fn seeded() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::with_document(Document::seed()))
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test(start_paused = true)]
async fn empty_backend_is_seeded_once() {
    let backend = Arc::new(MemoryBackend::new());
    let coord = loaded(&backend).await;

    assert_eq!(backend.write_count(), 1);
    let current = coord.read(|s| s.document().clone()).unwrap();
    assert_eq!(backend.stored(), Some(current));
    assert_eq!(coord.status().load, LoadState::Ready);
    assert!(!coord.status().dirty);

    // a second load is a no-op
    coord.load().await.unwrap();
    assert_eq!(backend.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn read_failure_leaves_document_absent() {
    let backend = Arc::new(MemoryBackend::new());
    backend.fail_next_reads(1);
    let coord = Coordinator::new(backend.clone(), AutosaveOptions::default());

    assert!(matches!(coord.load().await, Err(CoordinatorError::Load(_))));
    let status = coord.status();
    assert_eq!(status.load, LoadState::Failed);
    assert!(status.load_error.is_some());

    // no seed was written for a failed read
    assert_eq!(backend.write_attempts(), 0);
    assert!(matches!(coord.edit(rename("x")), Err(CoordinatorError::NotLoaded)));

    // retrying succeeds once the backend recovers
    coord.load().await.unwrap();
    assert_eq!(coord.status().load, LoadState::Ready);
    assert_eq!(coord.status().load_error, None);
}

// =============================================================================
// Debounce
// =============================================================================

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_one_write() {
    let backend = seeded();
    let coord = loaded(&backend).await;

    coord.edit(rename("First")).unwrap();
    sleep(secs(1.0)).await;
    coord.edit(rename("Second")).unwrap();

    // the second edit re-armed the timer: nothing at t=2.9
    sleep(secs(1.9)).await;
    assert_eq!(backend.write_count(), 0);
    assert_eq!(coord.status().save, SaveState::Dirty);

    sleep(secs(0.2)).await;
    assert_eq!(backend.write_count(), 1);
    assert_eq!(backend.written()[0].settings.name, "Second");
    assert_eq!(coord.status().save, SaveState::Clean);
    assert!(!coord.status().dirty);
}

#[tokio::test(start_paused = true)]
async fn quiet_store_never_writes() {
    let backend = seeded();
    let _coord = loaded(&backend).await;

    sleep(secs(60.0)).await;
    assert_eq!(backend.write_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn custom_debounce_is_respected() {
    let backend = seeded();
    let coord = Coordinator::new(
        backend.clone(),
        AutosaveOptions {
            debounce: Duration::from_millis(300),
        },
    );
    coord.load().await.unwrap();

    coord.edit(rename("Quick")).unwrap();
    sleep(secs(0.25)).await;
    assert_eq!(backend.write_count(), 0);
    sleep(secs(0.1)).await;
    assert_eq!(backend.write_count(), 1);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn failed_saves_keep_changes_until_a_later_success() {
    let backend = seeded();
    let coord = loaded(&backend).await;
    backend.fail_next_writes(3);

    for attempt in 1..=3 {
        coord.edit(rename(&format!("Attempt {}", attempt))).unwrap();
        sleep(secs(2.5)).await;

        assert_eq!(backend.write_attempts(), attempt);
        let status = coord.status();
        assert_eq!(status.save, SaveState::Error);
        assert!(status.dirty);
        assert!(status.save_error.is_some());
        assert!(coord.read(|s| s.is_dirty()).unwrap());
    }

    // no automatic retry
    sleep(secs(60.0)).await;
    assert_eq!(backend.write_attempts(), 3);
    assert_eq!(backend.write_count(), 0);

    coord.edit(rename("Final")).unwrap();
    sleep(secs(2.5)).await;

    assert_eq!(backend.write_count(), 1);
    assert_eq!(backend.stored().unwrap().settings.name, "Final");
    let status = coord.status();
    assert_eq!(status.save, SaveState::Clean);
    assert_eq!(status.save_error, None);
    assert!(!status.dirty);
}

#[tokio::test(start_paused = true)]
async fn manual_save_after_failure_writes_latest_state() {
    let backend = seeded();
    let coord = loaded(&backend).await;
    backend.fail_next_writes(1);

    coord.edit(rename("Kept")).unwrap();
    assert!(matches!(coord.save_now().await, Err(CoordinatorError::Save(_))));
    assert!(coord.status().dirty);

    assert!(coord.save_now().await.unwrap());
    assert_eq!(backend.stored().unwrap().settings.name, "Kept");
    assert!(!coord.status().dirty);
}

#[tokio::test(start_paused = true)]
async fn invalid_document_is_rejected_and_stays_dirty() {
    let backend = seeded();
    let coord = loaded(&backend).await;

    coord.edit(rename("")).unwrap();
    sleep(secs(2.5)).await;

    assert_eq!(backend.write_count(), 0);
    let status = coord.status();
    assert_eq!(status.save, SaveState::Error);
    assert!(status.save_error.unwrap().contains("settings.name"));
}

// =============================================================================
// Single flight
// =============================================================================

#[tokio::test(start_paused = true)]
async fn concurrent_saves_never_overlap() {
    let backend = Arc::new(MemoryBackend::with_document(Document::seed()).with_latency(secs(0.5)));
    let coord = loaded(&backend).await;

    coord.edit(rename("A")).unwrap();
    // autosave starts at t=2 and runs until t=2.5
    sleep(secs(2.1)).await;
    coord.edit(rename("B")).unwrap();

    let (first, second) = tokio::join!(coord.save_now(), coord.save_now());
    assert!(first.unwrap());
    assert!(!second.unwrap());

    assert_eq!(backend.peak_concurrent_writes(), 1);
    let names: Vec<_> = backend.written().into_iter().map(|d| d.settings.name).collect();
    assert_eq!(names, vec!["A", "B"]);

    sleep(secs(10.0)).await;
    assert_eq!(backend.write_count(), 2);
    assert_eq!(backend.peak_concurrent_writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn edit_during_write_is_saved_afterwards() {
    let backend = Arc::new(MemoryBackend::with_document(Document::seed()).with_latency(secs(0.5)));
    let coord = loaded(&backend).await;

    coord.edit(rename("A")).unwrap();
    sleep(secs(2.1)).await;
    coord.edit(rename("B")).unwrap();

    // first write (A) lands at t=2.5 but B is still unsaved
    sleep(secs(0.5)).await;
    assert_eq!(backend.write_count(), 1);
    assert!(coord.status().dirty);

    // B was scheduled after the first write resolved
    sleep(secs(3.0)).await;
    assert_eq!(backend.write_count(), 2);
    assert_eq!(backend.stored().unwrap().settings.name, "B");
    assert!(!coord.status().dirty);
    assert_eq!(backend.peak_concurrent_writes(), 1);
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test(start_paused = true)]
async fn close_flushes_once() {
    let backend = seeded();
    let coord = loaded(&backend).await;

    coord.edit(rename("Closing")).unwrap();
    coord.close().await.unwrap();
    assert_eq!(backend.write_count(), 1);

    coord.close().await.unwrap();
    assert_eq!(backend.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_coordinator_stops_autosave() {
    let backend = seeded();
    let coord = loaded(&backend).await;

    coord.edit(rename("Dropped")).unwrap();
    drop(coord);

    sleep(secs(10.0)).await;
    assert_eq!(backend.write_count(), 0);
}

// =============================================================================
// File backend
// =============================================================================

#[tokio::test]
async fn file_backend_autosaves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wiki.json");
    let backend = Arc::new(FileBackend::new(&path));
    let coord = Coordinator::new(
        backend.clone(),
        AutosaveOptions {
            debounce: Duration::from_millis(50),
        },
    );

    coord.load().await.unwrap();
    assert!(path.exists());

    coord.edit(rename("On disk")).unwrap();
    for _ in 0..100 {
        if !coord.status().dirty {
            break;
        }
        sleep(Duration::from_millis(20)).await;
    }

    let stored = backend.read().await.unwrap().unwrap();
    assert_eq!(stored.settings.name, "On disk");
    coord.close().await.unwrap();
}
