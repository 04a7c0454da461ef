//! Wiki Store - document model and persistence for a block-based wiki
//!
//! A wiki is one JSON document: site settings, a navigation tree and a map
//! of pages made of typed content blocks. This crate validates that document,
//! edits it through a [`DocumentStore`] and keeps it saved through a
//! debounced, single-flight [`Coordinator`] over a file, SQLite or in-memory
//! backend.

pub mod cli;
pub mod domain;
pub mod logging;
pub mod storage;

pub use domain::{BlockType, ContentBlock, Document, DocumentStore, NavNode, PageDocument, Settings};
pub use storage::{Backend, Coordinator};
