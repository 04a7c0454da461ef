//! Domain model of the wiki
//!
//! The aggregate, its validator and the store that mutates it. Nothing in
//! here performs I/O.

pub mod block;
pub mod document;
pub mod factory;
pub mod id;
pub mod nav;
pub mod page;
mod patch;
pub mod schema;
mod seed;
pub mod settings;
pub mod store;

pub use block::{BlockBody, BlockType, ContentBlock};
pub use document::{Document, DOCUMENT_VERSION};
pub use id::{BlockId, IdError, NodeId, PageId};
pub use nav::{NavEntry, NavKind, NavNode, NavNodePatch, NewNavNode};
pub use page::{NewPage, PageDocument, PageMeta, PageMetaPatch, PageStatus, PatchError};
pub use schema::ValidationError;
pub use settings::{AccentColor, NavbarLink, Settings, SettingsPatch, UiLabels};
pub use store::{DocumentStore, ImportError, PageResolution};
