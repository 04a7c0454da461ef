//! Block factory
//!
//! Produces a minimal, structurally valid block for every [`BlockType`], with
//! a fresh id and readable placeholder content. Anything built here passes the
//! schema validator, so validation failures can only come from imported data.

use super::block::{
    BlockBody, BlockType, CalloutVariant, CardItem, CommandItem, ContentBlock, FaqItem,
    FileNodeKind, FileTreeNode, LinkListItem, ListItem, ListStyle, PermissionDefault,
    PermissionItem, RecipeIngredient, StatItem, StepItem,
};
use super::id::BlockId;

/// Creates a new block of the given type with a freshly generated id
pub fn create_block(block_type: BlockType) -> ContentBlock {
    ContentBlock::new(BlockId::generate(), default_body(block_type))
}

/// Placeholder body for a block type
pub fn default_body(block_type: BlockType) -> BlockBody {
    match block_type {
        BlockType::Paragraph => BlockBody::Paragraph {
            content: "New paragraph.".to_string(),
        },
        BlockType::Heading => BlockBody::Heading {
            level: 2,
            text: "New heading".to_string(),
            anchor: None,
        },
        BlockType::List => BlockBody::List {
            style: ListStyle::Bullet,
            items: vec![ListItem::new("Item 1"), ListItem::new("Item 2")],
        },
        BlockType::Table => BlockBody::Table {
            headers: vec!["Column 1".to_string(), "Column 2".to_string()],
            rows: vec![vec![String::new(), String::new()]],
            caption: None,
        },
        BlockType::Callout => BlockBody::Callout {
            variant: CalloutVariant::Info,
            title: None,
            content: "Callout text.".to_string(),
        },
        BlockType::Code => BlockBody::Code {
            language: Some("bash".to_string()),
            filename: None,
            content: "# Your code here".to_string(),
        },
        BlockType::Faq => BlockBody::Faq {
            title: Some("Frequently asked questions".to_string()),
            items: vec![FaqItem {
                question: "Question?".to_string(),
                answer: "Answer.".to_string(),
            }],
        },
        BlockType::Commands => BlockBody::Commands {
            title: Some("Commands".to_string()),
            category: None,
            items: vec![CommandItem {
                command: "/command".to_string(),
                description: "Description".to_string(),
                usage: None,
                aliases: None,
                permission: None,
                permission_default: Some(PermissionDefault::All),
            }],
        },
        BlockType::Steps => BlockBody::Steps {
            title: Some("Steps".to_string()),
            items: vec![StepItem {
                title: "Step 1".to_string(),
                description: Some("Description".to_string()),
                code: None,
                note: None,
            }],
        },
        BlockType::Cards => BlockBody::Cards {
            columns: Some(2),
            items: vec![CardItem {
                title: "Card 1".to_string(),
                description: Some("Description".to_string()),
                href: None,
                badge: None,
                icon: None,
            }],
        },
        BlockType::FileTree => BlockBody::FileTree {
            title: Some("Structure".to_string()),
            root: vec![FileTreeNode {
                name: "folder/".to_string(),
                kind: FileNodeKind::Dir,
                description: None,
                children: Some(vec![FileTreeNode {
                    name: "file.txt".to_string(),
                    kind: FileNodeKind::File,
                    description: None,
                    children: None,
                }]),
            }],
        },
        BlockType::Permissions => BlockBody::Permissions {
            title: Some("Permissions".to_string()),
            items: vec![PermissionItem {
                node: "plugin.use".to_string(),
                description: "Use the plugin".to_string(),
                default: PermissionDefault::All,
            }],
        },
        BlockType::Divider => BlockBody::Divider {},
        BlockType::Image => BlockBody::Image {
            src: String::new(),
            alt: "Image".to_string(),
            caption: None,
        },
        BlockType::Quote => BlockBody::Quote {
            content: "Quote.".to_string(),
            author: None,
        },
        BlockType::Stats => BlockBody::Stats {
            title: Some("Statistics".to_string()),
            items: vec![StatItem {
                label: "Metric".to_string(),
                value: "100".to_string(),
                unit: None,
            }],
        },
        BlockType::Recipe => BlockBody::Recipe {
            title: Some("Recipe".to_string()),
            ingredients: vec![RecipeIngredient {
                slot: "A".to_string(),
                item: "minecraft:iron_ingot".to_string(),
                count: Some(1),
            }],
            result: "Item".to_string(),
            shape: None,
        },
        BlockType::LinkList => BlockBody::LinkList {
            title: Some("Links".to_string()),
            items: vec![LinkListItem {
                title: "Link".to_string(),
                href: "/".to_string(),
                description: None,
                external: None,
            }],
        },
        BlockType::Section => BlockBody::Section {
            title: "Section".to_string(),
            description: None,
            children: Vec::new(),
        },
        BlockType::RawMd => BlockBody::RawMd {
            content: "## Markdown\n\nYour content.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema;

    #[test]
    fn every_type_produces_matching_tag() {
        for ty in BlockType::ALL {
            assert_eq!(create_block(ty).block_type(), ty);
        }
    }

    #[test]
    fn every_type_passes_block_validation() {
        for ty in BlockType::ALL {
            let block = create_block(ty);
            let value = serde_json::to_value(&block).unwrap();
            schema::validate_block(&value).unwrap_or_else(|e| panic!("{}: {}", ty, e));
        }
    }

    #[test]
    fn list_gets_two_items() {
        match create_block(BlockType::List).body {
            BlockBody::List { items, .. } => assert_eq!(items.len(), 2),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn section_starts_empty() {
        let block = create_block(BlockType::Section);
        assert_eq!(block.children().map(Vec::len), Some(0));
    }

    #[test]
    fn ids_are_fresh() {
        assert_ne!(create_block(BlockType::Divider).id, create_block(BlockType::Divider).id);
    }
}
