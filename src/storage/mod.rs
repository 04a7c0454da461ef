//! # Storage Layer
//!
//! Persistence for the wiki document.
//!
//! ## Backends
//!
//! | Backend | Format | Location |
//! |---------|--------|----------|
//! | [`FileBackend`] | Pretty JSON | `.wiki/wiki.json` |
//! | [`SqliteBackend`] | JSON text in one row of `wiki_data` | `.wiki/wiki.db` |
//! | [`MemoryBackend`] | In process | - |
//! | Config | TOML | `.wiki/config.toml` |
//!
//! Every backend stores the whole document at once and refuses to write a
//! document that fails validation.
//!
//! ## Concurrency Safety
//!
//! - [`FileBackend`] locks with `fs2` and writes via temp file + rename
//! - [`SqliteBackend`] upserts a single row inside SQLite's own locking
//! - [`Coordinator`] never runs two writes at once
//!
//! ## Project Structure
//!
//! ```text
//! .wiki/
//! ├── config.toml    # Project configuration
//! ├── wiki.json      # Document (file backend)
//! ├── wiki.db        # Document (sqlite backend)
//! └── .gitignore
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for a wiki project directory
//! - [`Backend`] - Read/write the whole document
//! - [`Coordinator`] - Load, edit and autosave through a backend
//! - [`Config`] - Project and global configuration

mod backend;
pub mod config;
mod coordinator;
mod file;
mod memory;
mod project;
mod sqlite;

pub use backend::{Backend, BackendError};
pub use config::{BackendKind, Config, ConfigError, OutputFormat};
pub use coordinator::{
    AutosaveOptions, Coordinator, CoordinatorError, LoadState, SaveState, SyncStatus,
    DEFAULT_DEBOUNCE,
};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use project::{Project, ProjectError};
pub use sqlite::SqliteBackend;
