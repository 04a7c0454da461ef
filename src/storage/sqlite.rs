//! SQLite backend
//!
//! Stores the whole document as JSON text in a single row (`id = 1`) of the
//! `wiki_data` table, with the time of the last write. No row means the wiki
//! has not been seeded.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::backend::{Backend, BackendError};
use crate::domain::{schema, Document};

/// Backend storing the document in a single SQLite row
#[derive(Clone)]
pub struct SqliteBackend {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Schema version - bump when the table layout changes
    const SCHEMA_VERSION: i32 = 1;

    /// Opens (creating if needed) the database at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_connection(path, conn)
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(PathBuf::from(":memory:"), conn)
    }

    fn with_connection(path: PathBuf, conn: Connection) -> Result<Self, BackendError> {
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()?
            .unwrap_or(0);

        if version != Self::SCHEMA_VERSION {
            conn.execute_batch(&format!(
                "
                CREATE TABLE IF NOT EXISTS wiki_data (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    data TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                PRAGMA user_version = {};
                ",
                Self::SCHEMA_VERSION
            ))?;
        }

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time of the last successful write, if any
    pub fn updated_at(&self) -> Result<Option<String>, BackendError> {
        let conn = lock(&self.conn)?;
        let updated = conn
            .query_row("SELECT updated_at FROM wiki_data WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(updated)
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>, BackendError> {
    conn.lock()
        .map_err(|_| BackendError::Io("SQLite connection lock poisoned".to_string()))
}

fn read_row(conn: &Mutex<Connection>) -> Result<Option<Document>, BackendError> {
    let conn = lock(conn)?;
    let data: Option<String> = conn
        .query_row("SELECT data FROM wiki_data WHERE id = 1", [], |row| row.get(0))
        .optional()?;

    let Some(data) = data else {
        return Ok(None);
    };

    let raw: serde_json::Value =
        serde_json::from_str(&data).map_err(|e| BackendError::Malformed(e.to_string()))?;
    let document = schema::validate(&raw).map_err(|e| BackendError::Malformed(e.to_string()))?;
    Ok(Some(document))
}

fn write_row(conn: &Mutex<Connection>, document: &Document) -> Result<(), BackendError> {
    schema::check(document)?;
    let data = serde_json::to_string(document)
        .map_err(|e| BackendError::Io(format!("Failed to serialize document: {}", e)))?;

    let conn = lock(conn)?;
    conn.execute(
        "INSERT INTO wiki_data (id, data, updated_at) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        params![data, Utc::now().to_rfc3339()],
    )?;

    debug!(bytes = data.len(), "wrote document row");
    Ok(())
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn read(&self) -> Result<Option<Document>, BackendError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || read_row(&conn))
            .await
            .map_err(|e| BackendError::Io(e.to_string()))?
    }

    async fn write(&self, document: &Document) -> Result<(), BackendError> {
        let conn = Arc::clone(&self.conn);
        let document = document.clone();
        tokio::task::spawn_blocking(move || write_row(&conn, &document))
            .await
            .map_err(|e| BackendError::Io(e.to_string()))?
    }

    fn describe(&self) -> String {
        format!("sqlite {}", self.path.display())
    }
}
