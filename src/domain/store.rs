//! Document store: the single mutation surface over a [`Document`]
//!
//! Every operation is synchronous and in-memory, and either applies fully or
//! changes nothing. An operation that changes the document sets the dirty
//! flag and bumps a generation counter; operations that turn out to be
//! no-ops (missing ids, boundary moves, identical patches) leave both alone.
//!
//! The generation lets a saver clear the dirty flag only for the exact state
//! it wrote: see [`DocumentStore::mark_saved`].

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use super::block::{BlockType, ContentBlock};
use super::document::Document;
use super::factory;
use super::id::{BlockId, NodeId, PageId};
use super::nav::{self, NavEntry, NavNodePatch, NewNavNode};
use super::page::{NewPage, PageDocument, PageMetaPatch, PatchError};
use super::schema::{self, ValidationError};
use super::settings::{SettingsPatch, UiLabels};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Import failed validation: {0}")]
    Validation(#[from] ValidationError),
}

/// What a navigation node's page reference resolves to
#[derive(Debug, PartialEq)]
pub enum PageResolution<'a> {
    Found(&'a PageDocument),
    /// Page node whose slug has no page
    Dangling(&'a str),
    /// Group or link node
    NotAPage,
    /// No node with that id
    NoSuchNode,
}

/// Owner of the live document plus its unsaved-changes state
#[derive(Debug, Clone)]
pub struct DocumentStore {
    document: Document,
    dirty: bool,
    generation: u64,
}

impl DocumentStore {
    /// Wraps a document that matches what the backend holds (clean)
    pub fn new(document: Document) -> Self {
        Self {
            document,
            dirty: false,
            generation: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Counter bumped by every applied mutation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Clears the dirty flag if nothing changed since `generation` was taken
    ///
    /// Returns false (and stays dirty) when a newer mutation landed meanwhile.
    pub fn mark_saved(&mut self, generation: u64) -> bool {
        if generation == self.generation {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    fn touched<T>(&mut self, result: Option<T>) -> Option<T> {
        if result.is_some() {
            self.touch();
        }
        result
    }

    fn touched_if(&mut self, changed: bool) -> bool {
        if changed {
            self.touch();
        }
        changed
    }

    // === Whole document ===

    /// Substitutes the whole document after validating it
    pub fn replace(&mut self, document: Document) -> Result<(), ValidationError> {
        schema::check(&document)?;
        self.document = document;
        self.touch();
        Ok(())
    }

    /// Validates an untyped value and substitutes it
    pub fn replace_value(&mut self, raw: &Value) -> Result<(), ValidationError> {
        let document = schema::validate(raw)?;
        self.document = document;
        self.touch();
        Ok(())
    }

    /// Parses and validates exported bytes, then substitutes them
    ///
    /// On any error the current document is untouched.
    pub fn import_json(&mut self, bytes: &[u8]) -> Result<(), ImportError> {
        let raw: Value = serde_json::from_slice(bytes)?;
        self.replace_value(&raw)?;
        Ok(())
    }

    /// Pretty JSON of the current document
    pub fn export_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.document)
    }

    /// Suggested name for an export taken on `date`
    pub fn export_file_name(date: NaiveDate) -> String {
        format!("wiki-export-{}.json", date.format("%Y-%m-%d"))
    }

    // === Settings ===

    pub fn update_settings(&mut self, patch: SettingsPatch) -> bool {
        let before = self.document.settings.clone();
        self.document.settings.apply(patch);
        let changed = self.document.settings != before;
        self.touched_if(changed)
    }

    /// Replaces the UI label bundle wholesale
    pub fn update_ui_labels(&mut self, labels: UiLabels) -> bool {
        if self.document.settings.ui_labels == labels {
            return false;
        }
        self.document.settings.ui_labels = labels;
        self.touch();
        true
    }

    // === Navigation ===

    pub fn add_nav_node(&mut self, parent: Option<&NodeId>, node: NewNavNode) -> Option<NodeId> {
        let id = nav::insert(&mut self.document.navigation, parent, node);
        self.touched(id)
    }

    pub fn update_nav_node(&mut self, id: &NodeId, patch: NavNodePatch) -> bool {
        let Some(mut found) = nav::find_mut(&mut self.document.navigation, id) else {
            return false;
        };
        let node = found.node();
        let before = node.clone();
        node.apply(patch);
        let changed = *node != before;
        self.touched_if(changed)
    }

    pub fn delete_nav_node(&mut self, id: &NodeId) -> bool {
        let removed = nav::delete(&mut self.document.navigation, id);
        self.touched(removed).is_some()
    }

    pub fn move_nav_node_up(&mut self, id: &NodeId) -> bool {
        let moved = nav::move_up(&mut self.document.navigation, id);
        self.touched_if(moved)
    }

    pub fn move_nav_node_down(&mut self, id: &NodeId) -> bool {
        let moved = nav::move_down(&mut self.document.navigation, id);
        self.touched_if(moved)
    }

    /// Visible pages in reading order
    pub fn flatten_pages(&self) -> Vec<NavEntry> {
        nav::flatten_pages(&self.document.navigation)
    }

    pub fn prev_next(&self, slug: &str) -> (Option<NavEntry>, Option<NavEntry>) {
        nav::prev_next(&self.document.navigation, slug)
    }

    /// Follows a navigation node to its page, tolerating dangling slugs
    pub fn resolve_page(&self, node_id: &NodeId) -> PageResolution<'_> {
        let Some(node) = nav::find(&self.document.navigation, node_id) else {
            return PageResolution::NoSuchNode;
        };
        match node.slug() {
            Some(slug) => match self.document.pages.get(slug) {
                Some(page) => PageResolution::Found(page),
                None => PageResolution::Dangling(slug),
            },
            None => PageResolution::NotAPage,
        }
    }

    // === Pages ===

    pub fn page(&self, slug: &str) -> Option<&PageDocument> {
        self.document.pages.get(slug)
    }

    /// Adds a page under its slug with a fresh id
    ///
    /// An existing page with the same slug is replaced.
    pub fn add_page(&mut self, page: NewPage) -> PageId {
        let page = PageDocument::from_new(page);
        let id = page.id.clone();
        self.document.pages.insert(page.meta.slug.clone(), page);
        self.touch();
        id
    }

    /// Merges a metadata patch into a page
    ///
    /// A slug change re-keys the page. Renaming onto another page's slug is
    /// refused, as is a patch for a missing page.
    pub fn update_page_meta(&mut self, slug: &str, patch: PageMetaPatch) -> bool {
        let Some(page) = self.document.pages.get(slug) else {
            return false;
        };

        let mut meta = page.meta.clone();
        meta.apply(patch);
        if meta == page.meta {
            return false;
        }
        if meta.slug != slug && self.document.pages.contains_key(&meta.slug) {
            return false;
        }

        let Some(mut page) = self.document.pages.remove(slug) else {
            return false;
        };
        page.meta = meta;
        self.document.pages.insert(page.meta.slug.clone(), page);
        self.touch();
        true
    }

    /// Removes a page; navigation nodes pointing at it are left dangling
    pub fn delete_page(&mut self, slug: &str) -> Option<PageDocument> {
        let removed = self.document.pages.remove(slug);
        self.touched(removed)
    }

    // === Blocks ===
    //
    // `section` selects the block sequence: None for the page's top level,
    // Some(id) for the children of that section block.

    fn page_mut(&mut self, slug: &str) -> Option<&mut PageDocument> {
        self.document.pages.get_mut(slug)
    }

    /// Inserts a block after `after`, or appends it
    pub fn add_block(
        &mut self,
        slug: &str,
        section: Option<&BlockId>,
        block: ContentBlock,
        after: Option<&BlockId>,
    ) -> Option<BlockId> {
        let id = self
            .page_mut(slug)
            .and_then(|page| page.insert_block(section, block, after));
        self.touched(id)
    }

    /// Inserts a fresh placeholder block of the given type
    pub fn create_block(
        &mut self,
        slug: &str,
        section: Option<&BlockId>,
        block_type: BlockType,
        after: Option<&BlockId>,
    ) -> Option<BlockId> {
        self.add_block(slug, section, factory::create_block(block_type), after)
    }

    /// Merges JSON fields into a block; see [`PageDocument::patch_block`]
    pub fn update_block(
        &mut self,
        slug: &str,
        section: Option<&BlockId>,
        id: &BlockId,
        patch: &Map<String, Value>,
    ) -> Result<bool, PatchError> {
        let Some(page) = self.page_mut(slug) else {
            return Ok(false);
        };

        let before = page.find_block(id).cloned();
        let applied = page.patch_block(section, id, patch)?;
        let changed = applied && page.find_block(id) != before.as_ref();
        Ok(self.touched_if(changed))
    }

    /// Typed in-process edit of a block anywhere in the page
    pub fn edit_block(&mut self, slug: &str, id: &BlockId, edit: impl FnOnce(&mut ContentBlock)) -> bool {
        let edited = self
            .page_mut(slug)
            .is_some_and(|page| page.edit_block(id, edit));
        self.touched_if(edited)
    }

    pub fn delete_block(&mut self, slug: &str, section: Option<&BlockId>, id: &BlockId) -> bool {
        let removed = self
            .page_mut(slug)
            .is_some_and(|page| page.remove_block(section, id));
        self.touched_if(removed)
    }

    /// Moves a block within its sequence; the index is clamped
    pub fn move_block(
        &mut self,
        slug: &str,
        section: Option<&BlockId>,
        id: &BlockId,
        new_index: usize,
    ) -> bool {
        let Some(page) = self.page_mut(slug) else {
            return false;
        };
        let before = page.blocks_in(section).map(|b| b.iter().map(|b| b.id.clone()).collect::<Vec<_>>());
        if !page.move_block(section, id, new_index) {
            return false;
        }
        let after = page.blocks_in(section).map(|b| b.iter().map(|b| b.id.clone()).collect::<Vec<_>>());
        let changed = before != after;
        self.touched_if(changed)
    }

    /// Clones a block (fresh ids throughout) right after the original
    pub fn duplicate_block(&mut self, slug: &str, section: Option<&BlockId>, id: &BlockId) -> Option<BlockId> {
        let copy = self
            .page_mut(slug)
            .and_then(|page| page.duplicate_block(section, id));
        self.touched(copy)
    }
}
