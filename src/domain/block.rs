//! Content block domain model
//!
//! A page is an ordered sequence of content blocks. Every block carries an
//! [`BlockId`] plus a body tagged by its `type` field on the wire:
//!
//! ```json
//! {"id": "3f0c…", "type": "callout", "variant": "tip", "content": "Use `/home`."}
//! ```
//!
//! Exactly one variant, `section`, is recursive: it owns further blocks in
//! `children`, drawn from the same id namespace as the page's top-level blocks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::BlockId;

/// Style of a list block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    #[default]
    Bullet,
    Ordered,
    Check,
}

/// Visual variant of a callout block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalloutVariant {
    #[default]
    Info,
    Tip,
    Warning,
    Danger,
    Note,
}

/// Who holds a permission (or may run a command) by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionDefault {
    #[default]
    All,
    Op,
    None,
}

/// Entry kind inside a file tree block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNodeKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked: None,
            children: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandItem {
    pub command: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_default: Option<PermissionDefault>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One entry of a file tree; directories may nest further entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileNodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionItem {
    pub node: String,
    pub description: String,
    pub default: PermissionDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub slot: String,
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkListItem {
    pub title: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
}

/// Type-specific payload of a block, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockBody {
    Paragraph {
        content: String,
    },
    Heading {
        /// 2, 3 or 4
        level: u8,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<String>,
    },
    List {
        style: ListStyle,
        items: Vec<ListItem>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Callout {
        variant: CalloutVariant,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        content: String,
    },
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        content: String,
    },
    Faq {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<FaqItem>,
    },
    Commands {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        items: Vec<CommandItem>,
    },
    Steps {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<StepItem>,
    },
    Cards {
        /// 2, 3 or 4
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<u8>,
        items: Vec<CardItem>,
    },
    FileTree {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        root: Vec<FileTreeNode>,
    },
    Permissions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<PermissionItem>,
    },
    Divider {},
    Image {
        src: String,
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Quote {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
    },
    Stats {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<StatItem>,
    },
    Recipe {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        ingredients: Vec<RecipeIngredient>,
        result: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shape: Option<Vec<Vec<String>>>,
    },
    #[serde(rename = "linklist")]
    LinkList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<LinkListItem>,
    },
    Section {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        children: Vec<ContentBlock>,
    },
    #[serde(rename = "rawmd")]
    RawMd {
        content: String,
    },
}

/// A single typed unit of page content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: BlockId,
    #[serde(flatten)]
    pub body: BlockBody,
}

impl ContentBlock {
    pub fn new(id: BlockId, body: BlockBody) -> Self {
        Self { id, body }
    }

    /// Returns the type tag of this block
    pub fn block_type(&self) -> BlockType {
        match &self.body {
            BlockBody::Paragraph { .. } => BlockType::Paragraph,
            BlockBody::Heading { .. } => BlockType::Heading,
            BlockBody::List { .. } => BlockType::List,
            BlockBody::Table { .. } => BlockType::Table,
            BlockBody::Callout { .. } => BlockType::Callout,
            BlockBody::Code { .. } => BlockType::Code,
            BlockBody::Faq { .. } => BlockType::Faq,
            BlockBody::Commands { .. } => BlockType::Commands,
            BlockBody::Steps { .. } => BlockType::Steps,
            BlockBody::Cards { .. } => BlockType::Cards,
            BlockBody::FileTree { .. } => BlockType::FileTree,
            BlockBody::Permissions { .. } => BlockType::Permissions,
            BlockBody::Divider {} => BlockType::Divider,
            BlockBody::Image { .. } => BlockType::Image,
            BlockBody::Quote { .. } => BlockType::Quote,
            BlockBody::Stats { .. } => BlockType::Stats,
            BlockBody::Recipe { .. } => BlockType::Recipe,
            BlockBody::LinkList { .. } => BlockType::LinkList,
            BlockBody::Section { .. } => BlockType::Section,
            BlockBody::RawMd { .. } => BlockType::RawMd,
        }
    }

    /// Returns the nested blocks of a section, or None for every other type
    pub fn children(&self) -> Option<&Vec<ContentBlock>> {
        match &self.body {
            BlockBody::Section { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Mutable access to the nested blocks of a section
    pub fn children_mut(&mut self) -> Option<&mut Vec<ContentBlock>> {
        match &mut self.body {
            BlockBody::Section { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Returns true if this block is a section
    pub fn is_section(&self) -> bool {
        matches!(self.body, BlockBody::Section { .. })
    }

    /// Assigns a fresh id to this block and to every nested block
    pub fn regenerate_ids(&mut self) {
        self.id = BlockId::generate();
        if let Some(children) = self.children_mut() {
            for child in children.iter_mut() {
                child.regenerate_ids();
            }
        }
    }

    /// Number of blocks in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children().map(|c| count_blocks(c)).unwrap_or(0)
    }
}

/// Counts every block in a sequence, descending into sections
pub fn count_blocks(blocks: &[ContentBlock]) -> usize {
    blocks.iter().map(ContentBlock::subtree_len).sum()
}

/// Collects every block id in a sequence, descending into sections (pre-order)
pub fn collect_ids<'a>(blocks: &'a [ContentBlock], out: &mut Vec<&'a BlockId>) {
    for block in blocks {
        out.push(&block.id);
        if let Some(children) = block.children() {
            collect_ids(children, out);
        }
    }
}

/// Returns true if an id occurs anywhere in a sequence
pub fn contains_id(blocks: &[ContentBlock], id: &BlockId) -> bool {
    blocks.iter().any(|b| {
        &b.id == id || b.children().map(|c| contains_id(c, id)).unwrap_or(false)
    })
}

/// Tag of a block variant, as written in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Paragraph,
    Heading,
    List,
    Table,
    Callout,
    Code,
    Faq,
    Commands,
    Steps,
    Cards,
    FileTree,
    Permissions,
    Divider,
    Image,
    Quote,
    Stats,
    Recipe,
    #[serde(rename = "linklist")]
    LinkList,
    Section,
    #[serde(rename = "rawmd")]
    RawMd,
}

impl BlockType {
    pub const ALL: [BlockType; 20] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::List,
        BlockType::Table,
        BlockType::Callout,
        BlockType::Code,
        BlockType::Faq,
        BlockType::Commands,
        BlockType::Steps,
        BlockType::Cards,
        BlockType::FileTree,
        BlockType::Permissions,
        BlockType::Divider,
        BlockType::Image,
        BlockType::Quote,
        BlockType::Stats,
        BlockType::Recipe,
        BlockType::LinkList,
        BlockType::Section,
        BlockType::RawMd,
    ];

    /// Returns the wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::List => "list",
            BlockType::Table => "table",
            BlockType::Callout => "callout",
            BlockType::Code => "code",
            BlockType::Faq => "faq",
            BlockType::Commands => "commands",
            BlockType::Steps => "steps",
            BlockType::Cards => "cards",
            BlockType::FileTree => "fileTree",
            BlockType::Permissions => "permissions",
            BlockType::Divider => "divider",
            BlockType::Image => "image",
            BlockType::Quote => "quote",
            BlockType::Stats => "stats",
            BlockType::Recipe => "recipe",
            BlockType::LinkList => "linklist",
            BlockType::Section => "section",
            BlockType::RawMd => "rawmd",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown block type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paragraph(id: &str, text: &str) -> ContentBlock {
        ContentBlock::new(
            id.parse().unwrap(),
            BlockBody::Paragraph {
                content: text.to_string(),
            },
        )
    }

    fn section(id: &str, children: Vec<ContentBlock>) -> ContentBlock {
        ContentBlock::new(
            id.parse().unwrap(),
            BlockBody::Section {
                title: "Section".to_string(),
                description: None,
                children,
            },
        )
    }

    #[test]
    fn serializes_with_flat_type_tag() {
        let block = paragraph("p1", "Hello");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({"id": "p1", "type": "paragraph", "content": "Hello"}));
    }

    #[test]
    fn divider_has_only_id_and_type() {
        let block = ContentBlock::new("d1".parse().unwrap(), BlockBody::Divider {});
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({"id": "d1", "type": "divider"}));

        let parsed: ContentBlock = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.block_type(), BlockType::Divider);
    }

    #[test]
    fn irregular_tags_match_wire_format() {
        let raw = json!([
            {"id": "a", "type": "fileTree", "root": []},
            {"id": "b", "type": "linklist", "items": []},
            {"id": "c", "type": "rawmd", "content": "# Hi"}
        ]);
        let blocks: Vec<ContentBlock> = serde_json::from_value(raw).unwrap();
        let types: Vec<_> = blocks.iter().map(|b| b.block_type()).collect();
        assert_eq!(types, vec![BlockType::FileTree, BlockType::LinkList, BlockType::RawMd]);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let block = ContentBlock::new(
            "c1".parse().unwrap(),
            BlockBody::Code {
                language: Some("bash".to_string()),
                filename: None,
                content: "ls".to_string(),
            },
        );
        let value = serde_json::to_value(&block).unwrap();
        assert!(value.get("filename").is_none());
        assert_eq!(value["language"], "bash");
    }

    #[test]
    fn command_item_uses_camel_case() {
        let raw = json!({"command": "/ban", "description": "Ban", "permissionDefault": "op"});
        let item: CommandItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.permission_default, Some(PermissionDefault::Op));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let raw = json!({"id": "x", "type": "video", "src": "a.mp4"});
        assert!(serde_json::from_value::<ContentBlock>(raw).is_err());
    }

    #[test]
    fn section_nests_blocks() {
        let block = section("s1", vec![paragraph("p1", "a"), section("s2", vec![paragraph("p2", "b")])]);
        assert_eq!(block.subtree_len(), 4);

        let mut ids = Vec::new();
        collect_ids(std::slice::from_ref(&block), &mut ids);
        let ids: Vec<_> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "p1", "s2", "p2"]);
    }

    #[test]
    fn regenerate_ids_reaches_nested_children() {
        let original = section("s1", vec![paragraph("p1", "a")]);
        let mut copy = original.clone();
        copy.regenerate_ids();

        assert_ne!(copy.id, original.id);
        assert_ne!(copy.children().unwrap()[0].id, original.children().unwrap()[0].id);
        assert_eq!(copy.children().unwrap()[0].body, original.children().unwrap()[0].body);
    }

    #[test]
    fn contains_id_searches_sections() {
        let blocks = vec![paragraph("p1", "a"), section("s1", vec![paragraph("p2", "b")])];
        assert!(contains_id(&blocks, &"p2".parse().unwrap()));
        assert!(!contains_id(&blocks, &"p3".parse().unwrap()));
    }

    #[test]
    fn block_type_parse() {
        assert_eq!("fileTree".parse::<BlockType>().unwrap(), BlockType::FileTree);
        assert_eq!("rawmd".parse::<BlockType>().unwrap(), BlockType::RawMd);
        assert!("video".parse::<BlockType>().is_err());
    }

    #[test]
    fn block_type_serde_matches_as_str() {
        for ty in BlockType::ALL {
            let json = serde_json::to_value(ty).unwrap();
            assert_eq!(json, json!(ty.as_str()));
        }
    }
}
