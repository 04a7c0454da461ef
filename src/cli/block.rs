//! Block CLI commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{BlockId, BlockType};

#[derive(Subcommand)]
pub enum BlockCommands {
    /// List a page's blocks
    List {
        /// Page slug
        slug: String,

        /// List the children of this section instead of the top level
        #[arg(long)]
        section: Option<String>,
    },

    /// Show one block as JSON
    Show {
        /// Page slug
        slug: String,

        /// Block ID (searched at any depth)
        id: String,
    },

    /// Add a placeholder block of the given type
    Add {
        /// Page slug
        slug: String,

        /// Block type (paragraph, heading, section, ...)
        block_type: String,

        /// Section to add into (top level if omitted)
        #[arg(long)]
        section: Option<String>,

        /// Insert after this block (appended if omitted)
        #[arg(long)]
        after: Option<String>,
    },

    /// Delete a block
    Delete {
        /// Page slug
        slug: String,

        /// Block ID
        id: String,

        #[arg(long)]
        section: Option<String>,
    },

    /// Move a block to a position within its sequence
    Move {
        /// Page slug
        slug: String,

        /// Block ID
        id: String,

        /// Target index (clamped to the sequence)
        index: usize,

        #[arg(long)]
        section: Option<String>,
    },

    /// Duplicate a block right after itself
    Duplicate {
        /// Page slug
        slug: String,

        /// Block ID
        id: String,

        #[arg(long)]
        section: Option<String>,
    },

    /// Merge a JSON object into a block
    ///
    /// Example: wiki block set faq b-1 '{"text": "Updated"}'
    Set {
        /// Page slug
        slug: String,

        /// Block ID
        id: String,

        /// JSON object with the fields to change
        patch: String,

        #[arg(long)]
        section: Option<String>,
    },
}

fn block_id(value: Option<&str>) -> Result<Option<BlockId>> {
    Ok(value.map(str::parse).transpose()?)
}

pub async fn run(cmd: BlockCommands, output: &Output) -> Result<()> {
    match cmd {
        BlockCommands::List { slug, section } => {
            list_blocks(output, &slug, block_id(section.as_deref())?).await
        }
        BlockCommands::Show { slug, id } => show_block(output, &slug, id.parse()?).await,
        BlockCommands::Add {
            slug,
            block_type,
            section,
            after,
        } => {
            let block_type: BlockType = block_type.parse().map_err(anyhow::Error::msg)?;
            add_block(
                output,
                &slug,
                block_type,
                block_id(section.as_deref())?,
                block_id(after.as_deref())?,
            )
            .await
        }
        BlockCommands::Delete { slug, id, section } => {
            let section = block_id(section.as_deref())?;
            let id: BlockId = id.parse()?;
            edit_block(output, &slug, |session| {
                let deleted = session.edit(|store| store.delete_block(&slug, section.as_ref(), &id))?;
                if !deleted {
                    bail!("Block not found: {}", id);
                }
                Ok(format!("Deleted block: {}", id))
            })
            .await
        }
        BlockCommands::Move {
            slug,
            id,
            index,
            section,
        } => {
            let section = block_id(section.as_deref())?;
            let id: BlockId = id.parse()?;
            edit_block(output, &slug, |session| {
                let found = session.read(|store| {
                    store
                        .page(&slug)
                        .and_then(|page| page.blocks_in(section.as_ref()))
                        .is_some_and(|blocks| blocks.iter().any(|b| b.id == id))
                })?;
                if !found {
                    bail!("Block not found: {}", id);
                }
                let moved = session.edit(|store| store.move_block(&slug, section.as_ref(), &id, index))?;
                Ok(if moved {
                    format!("Moved block {} to position {}", id, index)
                } else {
                    "Block already in place".to_string()
                })
            })
            .await
        }
        BlockCommands::Duplicate { slug, id, section } => {
            let section = block_id(section.as_deref())?;
            let id: BlockId = id.parse()?;
            edit_block(output, &slug, |session| {
                let copy = session
                    .edit(|store| store.duplicate_block(&slug, section.as_ref(), &id))?
                    .with_context(|| format!("Block not found: {}", id))?;
                Ok(format!("Duplicated block {} as {}", id, copy))
            })
            .await
        }
        BlockCommands::Set {
            slug,
            id,
            patch,
            section,
        } => {
            let section = block_id(section.as_deref())?;
            let id: BlockId = id.parse()?;
            let patch: serde_json::Value =
                serde_json::from_str(&patch).context("Block patch is not valid JSON")?;
            let Some(patch) = patch.as_object() else {
                bail!("Block patch must be a JSON object");
            };
            edit_block(output, &slug, |session| {
                let applied =
                    session.edit(|store| store.update_block(&slug, section.as_ref(), &id, patch))??;
                let exists = session.read(|store| {
                    store.page(&slug).and_then(|page| page.find_block(&id)).is_some()
                })?;
                if !applied && !exists {
                    bail!("Block not found: {}", id);
                }
                Ok(if applied {
                    format!("Updated block: {}", id)
                } else {
                    "No changes".to_string()
                })
            })
            .await
        }
    }
}

/// Opens a session, checks the page exists, runs `edit` and saves
async fn edit_block(
    output: &Output,
    slug: &str,
    edit: impl FnOnce(&Session) -> Result<String>,
) -> Result<()> {
    let session = Session::open(output).await?;
    if !session.read(|store| store.page(slug).is_some())? {
        bail!("Page not found: {}", slug);
    }

    let message = edit(&session)?;
    session.close().await?;

    output.success(&message);
    Ok(())
}

async fn list_blocks(output: &Output, slug: &str, section: Option<BlockId>) -> Result<()> {
    let session = Session::open(output).await?;
    let blocks = session
        .read(|store| {
            store
                .page(slug)
                .and_then(|page| page.blocks_in(section.as_ref()))
                .cloned()
        })?
        .with_context(|| format!("Page or section not found: {}", slug))?;

    if output.is_json() {
        output.data(&blocks);
    } else if blocks.is_empty() {
        println!("No blocks.");
    } else {
        println!("{:<5} {:<38} TYPE", "#", "ID");
        println!("{}", "-".repeat(60));
        for (index, block) in blocks.iter().enumerate() {
            let nested = block
                .children()
                .map(|children| format!(" ({} children)", children.len()))
                .unwrap_or_default();
            println!("{:<5} {:<38} {}{}", index, block.id, block.block_type(), nested);
        }
    }

    session.close().await
}

async fn show_block(output: &Output, slug: &str, id: BlockId) -> Result<()> {
    let session = Session::open(output).await?;
    let block = session
        .read(|store| store.page(slug).and_then(|page| page.find_block(&id)).cloned())?
        .with_context(|| format!("Block not found: {}", id))?;

    output.data(&block);
    session.close().await
}

async fn add_block(
    output: &Output,
    slug: &str,
    block_type: BlockType,
    section: Option<BlockId>,
    after: Option<BlockId>,
) -> Result<()> {
    let session = Session::open(output).await?;
    if !session.read(|store| store.page(slug).is_some())? {
        bail!("Page not found: {}", slug);
    }

    let id = session
        .edit(|store| store.create_block(slug, section.as_ref(), block_type, after.as_ref()))?
        .context("Section not found")?;
    session.close().await?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "type": block_type.as_str() }));
    } else {
        output.success(&format!("Added {} block: {}", block_type, id));
    }

    Ok(())
}
