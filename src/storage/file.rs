//! Flat JSON file backend
//!
//! The document lives in one pretty-printed JSON file, by default
//! `.wiki/wiki.json`. Access is coordinated through a sibling lock file
//! (`wiki.json.lock`): readers hold it shared, a writer holds it exclusively
//! while it fills a temp file and renames it over the target. A missing or
//! blank file means the wiki has not been seeded.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::debug;

use super::backend::{Backend, BackendError};
use crate::domain::{schema, Document};

/// Backend storing the document as a JSON file
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocking read
    pub fn read_blocking(&self) -> Result<Option<Document>, BackendError> {
        read_file(&self.path)
    }

    /// Blocking write
    pub fn write_blocking(&self, document: &Document) -> Result<(), BackendError> {
        write_file(&self.path, document)
    }
}

fn lock_path(path: &Path) -> PathBuf {
    path.with_extension("json.lock")
}

/// Opens the lock file and takes the lock; released when the file is dropped
fn acquire_lock(path: &Path, exclusive: bool) -> Result<File, BackendError> {
    let lock_path = lock_path(path);
    let lock = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| BackendError::Io(format!("Failed to open {}: {}", lock_path.display(), e)))?;

    let locked = if exclusive {
        lock.lock_exclusive()
    } else {
        lock.lock_shared()
    };
    locked.map_err(|e| BackendError::Io(format!("Failed to lock {}: {}", lock_path.display(), e)))?;
    Ok(lock)
}

fn read_file(path: &Path) -> Result<Option<Document>, BackendError> {
    if !path.exists() {
        return Ok(None);
    }

    let _lock = acquire_lock(path, false)?;
    let mut file = File::open(path)
        .map_err(|e| BackendError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| BackendError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    if content.trim().is_empty() {
        return Ok(None);
    }

    let raw: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| BackendError::Malformed(format!("{}: {}", path.display(), e)))?;
    let document = schema::validate(&raw)
        .map_err(|e| BackendError::Malformed(format!("{}: {}", path.display(), e)))?;

    Ok(Some(document))
}

fn write_file(path: &Path, document: &Document) -> Result<(), BackendError> {
    schema::check(document)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BackendError::Io(format!("Failed to create directory {}: {}", parent.display(), e))
        })?;
    }

    // Held until the rename completes
    let _lock = acquire_lock(path, true)?;

    let temp_path = path.with_extension("json.tmp");
    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| {
                BackendError::Io(format!("Failed to create temp file {}: {}", temp_path.display(), e))
            })?;

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, document)
            .map_err(|e| BackendError::Io(format!("Failed to serialize document: {}", e)))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        BackendError::Io(format!(
            "Failed to rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        ))
    })?;

    debug!(path = %path.display(), "wrote document");
    Ok(())
}

#[async_trait]
impl Backend for FileBackend {
    async fn read(&self) -> Result<Option<Document>, BackendError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_file(&path))
            .await
            .map_err(|e| BackendError::Io(e.to_string()))?
    }

    async fn write(&self, document: &Document) -> Result<(), BackendError> {
        let path = self.path.clone();
        let document = document.clone();
        tokio::task::spawn_blocking(move || write_file(&path, &document))
            .await
            .map_err(|e| BackendError::Io(e.to_string()))?
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
