//! Page document model
//!
//! A page is metadata plus an ordered sequence of content blocks. Block order
//! is positional; moving a block physically relocates it in the sequence.
//!
//! Every block operation takes an optional section id: `None` addresses the
//! page's top-level sequence, `Some(id)` the `children` of that section
//! (found at any depth). Sections follow the same rules as the page itself.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::{collect_ids, ContentBlock};
use super::id::{BlockId, PageId};
use super::patch::{double_option, merge};
use super::schema;

/// Publication status of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }
}

/// Page metadata; `slug` doubles as the page's key in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub status: PageStatus,
    /// ISO date, e.g. `2026-02-24`
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Slugs of related pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PageMeta {
    /// Creates draft metadata stamped with today's date
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: None,
            tags: None,
            status: PageStatus::Draft,
            updated_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            author: None,
            related: None,
            badge: None,
            category: None,
        }
    }

    /// Shallow-merges a patch into this metadata
    pub fn apply(&mut self, patch: PageMetaPatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.slug, patch.slug);
        merge(&mut self.description, patch.description);
        merge(&mut self.tags, patch.tags);
        merge(&mut self.status, patch.status);
        merge(&mut self.updated_at, patch.updated_at);
        merge(&mut self.author, patch.author);
        merge(&mut self.related, patch.related);
        merge(&mut self.badge, patch.badge);
        merge(&mut self.category, patch.category);
    }
}

/// Partial update for [`PageMeta`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageMetaPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Option<Option<Vec<String>>>,
    #[serde(default)]
    pub status: Option<PageStatus>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub related: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub badge: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

/// A page before it has been assigned an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPage {
    pub meta: PageMeta,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

impl NewPage {
    pub fn new(meta: PageMeta) -> Self {
        Self {
            meta,
            blocks: Vec::new(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("Patched block {id} is not a valid block: {message}")]
    Invalid { id: BlockId, message: String },

    #[error("Patched block {id} would duplicate block id {duplicate}")]
    DuplicateId { id: BlockId, duplicate: BlockId },
}

/// A page: metadata plus an ordered block sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    pub id: PageId,
    pub meta: PageMeta,
    pub blocks: Vec<ContentBlock>,
}

impl PageDocument {
    /// Creates a page with a fresh id, re-identifying any colliding blocks
    pub fn from_new(page: NewPage) -> Self {
        let mut doc = Self {
            id: PageId::generate(),
            meta: page.meta,
            blocks: Vec::new(),
        };
        for block in page.blocks {
            doc.insert_block(None, block, None);
        }
        doc
    }

    pub fn slug(&self) -> &str {
        &self.meta.slug
    }

    /// Returns the sequence addressed by `section` (None = top level)
    pub fn blocks_in(&self, section: Option<&BlockId>) -> Option<&Vec<ContentBlock>> {
        match section {
            None => Some(&self.blocks),
            Some(id) => find_block(&self.blocks, id).and_then(ContentBlock::children),
        }
    }

    fn blocks_in_mut(&mut self, section: Option<&BlockId>) -> Option<&mut Vec<ContentBlock>> {
        match section {
            None => Some(&mut self.blocks),
            Some(id) => find_block_mut(&mut self.blocks, id).and_then(ContentBlock::children_mut),
        }
    }

    /// Finds a block anywhere in the page
    pub fn find_block(&self, id: &BlockId) -> Option<&ContentBlock> {
        find_block(&self.blocks, id)
    }

    /// All block ids in the page, sections included, in document order
    pub fn block_ids(&self) -> Vec<&BlockId> {
        let mut ids = Vec::new();
        collect_ids(&self.blocks, &mut ids);
        ids
    }

    /// Returns the first block id that occurs more than once, if any
    pub fn duplicate_block_id(&self) -> Option<&BlockId> {
        let mut seen = HashSet::new();
        self.block_ids().into_iter().find(|id| !seen.insert(*id))
    }

    /// Inserts a block after `after` (or appends when `after` is None or
    /// missing). Returns the inserted id, or None if the section is missing.
    ///
    /// If the block (or anything nested in it) reuses an id already present
    /// in the page, the whole inserted subtree gets fresh ids.
    pub fn insert_block(
        &mut self,
        section: Option<&BlockId>,
        mut block: ContentBlock,
        after: Option<&BlockId>,
    ) -> Option<BlockId> {
        if self.blocks_in(section).is_none() {
            return None;
        }

        if self.collides(&block) {
            block.regenerate_ids();
        }
        let id = block.id.clone();

        let blocks = self.blocks_in_mut(section)?;
        let position = after
            .and_then(|after| blocks.iter().position(|b| &b.id == after))
            .map(|idx| idx + 1)
            .unwrap_or(blocks.len());
        blocks.insert(position, block);

        Some(id)
    }

    fn collides(&self, block: &ContentBlock) -> bool {
        let existing: HashSet<&BlockId> = self.block_ids().into_iter().collect();
        let mut incoming = Vec::new();
        collect_ids(std::slice::from_ref(block), &mut incoming);

        let mut seen = HashSet::new();
        incoming
            .into_iter()
            .any(|id| existing.contains(id) || !seen.insert(id))
    }

    /// Removes a block (and its nested children) from the addressed sequence
    pub fn remove_block(&mut self, section: Option<&BlockId>, id: &BlockId) -> bool {
        let Some(blocks) = self.blocks_in_mut(section) else {
            return false;
        };
        let before = blocks.len();
        blocks.retain(|b| &b.id != id);
        blocks.len() != before
    }

    /// Moves a block to `new_index` within its sequence
    ///
    /// The index is clamped to the end of the sequence.
    pub fn move_block(&mut self, section: Option<&BlockId>, id: &BlockId, new_index: usize) -> bool {
        let Some(blocks) = self.blocks_in_mut(section) else {
            return false;
        };
        let Some(idx) = blocks.iter().position(|b| &b.id == id) else {
            return false;
        };

        let block = blocks.remove(idx);
        let target = new_index.min(blocks.len());
        blocks.insert(target, block);
        true
    }

    /// Clones a block with fresh ids and inserts it right after the original
    pub fn duplicate_block(&mut self, section: Option<&BlockId>, id: &BlockId) -> Option<BlockId> {
        let blocks = self.blocks_in_mut(section)?;
        let idx = blocks.iter().position(|b| &b.id == id)?;

        let mut copy = blocks[idx].clone();
        copy.regenerate_ids();
        let new_id = copy.id.clone();
        blocks.insert(idx + 1, copy);

        Some(new_id)
    }

    /// Shallow-merges JSON fields into a block of the addressed sequence
    ///
    /// `id` and `type` keys in the patch are ignored. The merged block must
    /// still be a valid block and must not introduce duplicate ids; otherwise
    /// the page is left untouched. Returns Ok(false) if the block is missing.
    pub fn patch_block(
        &mut self,
        section: Option<&BlockId>,
        id: &BlockId,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<bool, PatchError> {
        let Some(current) = self
            .blocks_in(section)
            .and_then(|blocks| blocks.iter().find(|b| &b.id == id))
        else {
            return Ok(false);
        };

        let invalid = |message: String| PatchError::Invalid {
            id: id.clone(),
            message,
        };

        let mut value = serde_json::to_value(current).map_err(|e| invalid(e.to_string()))?;
        if let Some(fields) = value.as_object_mut() {
            for (key, field) in patch {
                if key == "id" || key == "type" {
                    continue;
                }
                fields.insert(key.clone(), field.clone());
            }
        }

        let merged = schema::validate_block(&value).map_err(|e| invalid(e.to_string()))?;

        let mut old_ids = Vec::new();
        collect_ids(std::slice::from_ref(current), &mut old_ids);
        let old_ids: HashSet<&BlockId> = old_ids.into_iter().collect();
        let mut outside: HashSet<&BlockId> = self.block_ids().into_iter().collect();
        outside.retain(|id| !old_ids.contains(id));

        let mut merged_ids = Vec::new();
        collect_ids(std::slice::from_ref(&merged), &mut merged_ids);
        let mut seen = HashSet::new();
        if let Some(duplicate) = merged_ids
            .into_iter()
            .find(|candidate| outside.contains(candidate) || !seen.insert(*candidate))
        {
            return Err(PatchError::DuplicateId {
                id: id.clone(),
                duplicate: duplicate.clone(),
            });
        }

        let blocks = self
            .blocks_in_mut(section)
            .ok_or_else(|| invalid("block disappeared".to_string()))?;
        if let Some(slot) = blocks.iter_mut().find(|b| &b.id == id) {
            *slot = merged;
        }
        Ok(true)
    }

    /// Applies an in-process edit to a block anywhere in the page
    pub fn edit_block(&mut self, id: &BlockId, edit: impl FnOnce(&mut ContentBlock)) -> bool {
        match find_block_mut(&mut self.blocks, id) {
            Some(block) => {
                edit(block);
                true
            }
            None => false,
        }
    }
}

fn find_block<'a>(blocks: &'a [ContentBlock], id: &BlockId) -> Option<&'a ContentBlock> {
    for block in blocks {
        if &block.id == id {
            return Some(block);
        }
        if let Some(found) = block.children().and_then(|c| find_block(c, id)) {
            return Some(found);
        }
    }
    None
}

fn find_block_mut<'a>(blocks: &'a mut [ContentBlock], id: &BlockId) -> Option<&'a mut ContentBlock> {
    for block in blocks.iter_mut() {
        if &block.id == id {
            return Some(block);
        }
        if let Some(children) = block.children_mut() {
            if let Some(found) = find_block_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::{count_blocks, BlockBody, BlockType};
    use crate::domain::factory::create_block;
    use serde_json::json;

    fn paragraph(id: &str) -> ContentBlock {
        ContentBlock::new(
            id.parse().unwrap(),
            BlockBody::Paragraph {
                content: id.to_string(),
            },
        )
    }

    fn section(id: &str, children: Vec<ContentBlock>) -> ContentBlock {
        ContentBlock::new(
            id.parse().unwrap(),
            BlockBody::Section {
                title: "S".to_string(),
                description: None,
                children,
            },
        )
    }

    fn page(blocks: Vec<ContentBlock>) -> PageDocument {
        PageDocument {
            id: "page-1".parse().unwrap(),
            meta: PageMeta::new("Page", "page"),
            blocks,
        }
    }

    fn bid(s: &str) -> BlockId {
        s.parse().unwrap()
    }

    fn ids(page: &PageDocument, section: Option<&BlockId>) -> Vec<String> {
        page.blocks_in(section)
            .unwrap()
            .iter()
            .map(|b| b.id.to_string())
            .collect()
    }

    #[test]
    fn insert_appends_without_anchor() {
        let mut p = page(vec![paragraph("a")]);
        p.insert_block(None, paragraph("b"), None);
        assert_eq!(ids(&p, None), vec!["a", "b"]);
    }

    #[test]
    fn insert_after_anchor() {
        let mut p = page(vec![paragraph("a"), paragraph("c")]);
        p.insert_block(None, paragraph("b"), Some(&bid("a")));
        assert_eq!(ids(&p, None), vec!["a", "b", "c"]);
    }

    #[test]
    fn insert_after_missing_anchor_appends() {
        let mut p = page(vec![paragraph("a")]);
        p.insert_block(None, paragraph("b"), Some(&bid("zzz")));
        assert_eq!(ids(&p, None), vec!["a", "b"]);
    }

    #[test]
    fn insert_into_section() {
        let mut p = page(vec![section("s", vec![])]);
        let id = p.insert_block(Some(&bid("s")), paragraph("a"), None).unwrap();
        assert_eq!(id, bid("a"));
        assert_eq!(ids(&p, Some(&bid("s"))), vec!["a"]);
        assert_eq!(count_blocks(&p.blocks), 2);
    }

    #[test]
    fn insert_into_missing_section_is_noop() {
        let mut p = page(vec![paragraph("a")]);
        assert!(p.insert_block(Some(&bid("nope")), paragraph("b"), None).is_none());
        assert_eq!(count_blocks(&p.blocks), 1);
    }

    #[test]
    fn insert_reidentifies_colliding_block() {
        let mut p = page(vec![section("s", vec![paragraph("a")])]);
        let id = p.insert_block(None, paragraph("a"), None).unwrap();
        assert_ne!(id, bid("a"));
        assert!(p.duplicate_block_id().is_none());
    }

    #[test]
    fn remove_block_drops_nested_children() {
        let mut p = page(vec![paragraph("a"), section("s", vec![paragraph("b")])]);
        assert!(p.remove_block(None, &bid("s")));
        assert_eq!(count_blocks(&p.blocks), 1);
        assert!(p.find_block(&bid("b")).is_none());
    }

    #[test]
    fn remove_missing_block_is_noop() {
        let mut p = page(vec![paragraph("a")]);
        assert!(!p.remove_block(None, &bid("x")));
    }

    #[test]
    fn move_block_to_index() {
        let mut p = page(vec![paragraph("a"), paragraph("b"), paragraph("c")]);
        assert!(p.move_block(None, &bid("a"), 2));
        assert_eq!(ids(&p, None), vec!["b", "c", "a"]);

        assert!(p.move_block(None, &bid("a"), 0));
        assert_eq!(ids(&p, None), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_block_clamps_out_of_range() {
        let mut p = page(vec![paragraph("a"), paragraph("b")]);
        assert!(p.move_block(None, &bid("a"), 99));
        assert_eq!(ids(&p, None), vec!["b", "a"]);
    }

    #[test]
    fn duplicate_inserts_after_original() {
        let mut p = page(vec![paragraph("a"), paragraph("b")]);
        let copy = p.duplicate_block(None, &bid("a")).unwrap();
        let order = ids(&p, None);
        assert_eq!(order[0], "a");
        assert_eq!(order[1], copy.to_string());
        assert_eq!(order[2], "b");
        assert_eq!(p.blocks[0].body, p.blocks[1].body);
    }

    #[test]
    fn duplicate_section_keeps_ids_unique() {
        let mut p = page(vec![section("s", vec![paragraph("a"), paragraph("b")])]);
        p.duplicate_block(None, &bid("s")).unwrap();
        assert_eq!(count_blocks(&p.blocks), 6);
        assert!(p.duplicate_block_id().is_none());
    }

    #[test]
    fn patch_block_merges_fields() {
        let mut p = page(vec![paragraph("a")]);
        let patch = json!({"content": "Updated", "id": "hijack", "type": "quote"});
        let changed = p.patch_block(None, &bid("a"), patch.as_object().unwrap()).unwrap();

        assert!(changed);
        assert_eq!(p.blocks[0].id, bid("a"));
        assert_eq!(
            p.blocks[0].body,
            BlockBody::Paragraph {
                content: "Updated".to_string()
            }
        );
    }

    #[test]
    fn patch_block_rejects_invalid_shape() {
        let mut p = page(vec![paragraph("a")]);
        let before = p.clone();
        let patch = json!({"content": 42});
        let err = p.patch_block(None, &bid("a"), patch.as_object().unwrap()).unwrap_err();

        assert!(matches!(err, PatchError::Invalid { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn patch_block_rejects_duplicate_children() {
        let mut p = page(vec![paragraph("a"), section("s", vec![])]);
        let patch = json!({"children": [{"id": "a", "type": "divider"}]});
        let err = p.patch_block(None, &bid("s"), patch.as_object().unwrap()).unwrap_err();

        assert_eq!(
            err,
            PatchError::DuplicateId {
                id: bid("s"),
                duplicate: bid("a")
            }
        );
    }

    #[test]
    fn patch_section_can_replace_its_own_children() {
        let mut p = page(vec![section("s", vec![paragraph("a")])]);
        let patch = json!({"children": [{"id": "a", "type": "paragraph", "content": "kept"}]});
        assert!(p.patch_block(None, &bid("s"), patch.as_object().unwrap()).unwrap());
    }

    #[test]
    fn patch_missing_block_is_noop() {
        let mut p = page(vec![]);
        let patch = json!({"content": "x"});
        assert!(!p.patch_block(None, &bid("a"), patch.as_object().unwrap()).unwrap());
    }

    #[test]
    fn from_new_assigns_id_and_fixes_duplicates() {
        let block = create_block(BlockType::Paragraph);
        let new = NewPage {
            meta: PageMeta::new("T", "t"),
            blocks: vec![block.clone(), block],
        };
        let doc = PageDocument::from_new(new);
        assert_eq!(doc.blocks.len(), 2);
        assert!(doc.duplicate_block_id().is_none());
    }

    #[test]
    fn meta_patch_clears_optional_fields() {
        let mut meta = PageMeta::new("T", "t");
        meta.badge = Some("New".to_string());

        let patch: PageMetaPatch =
            serde_json::from_value(json!({"badge": null, "status": "published"})).unwrap();
        meta.apply(patch);

        assert_eq!(meta.badge, None);
        assert_eq!(meta.status, PageStatus::Published);
        assert_eq!(meta.title, "T");
    }

    #[test]
    fn edit_block_reaches_nested_blocks() {
        let mut p = page(vec![section("s", vec![paragraph("a")])]);
        let edited = p.edit_block(&bid("a"), |b| {
            b.body = BlockBody::Divider {};
        });
        assert!(edited);
        assert_eq!(p.find_block(&bid("a")).unwrap().block_type(), BlockType::Divider);
    }
}
