//! Page CLI commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use super::nav::next_order;
use super::output::Output;
use super::session::Session;
use crate::domain::block::count_blocks;
use crate::domain::{
    BlockBody, ContentBlock, NavKind, NewNavNode, NewPage, NodeId, PageMeta,
    PageMetaPatch, PageStatus,
};

#[derive(Subcommand)]
pub enum PageCommands {
    /// List all pages
    List,

    /// Show a page's metadata and blocks
    Show {
        /// Page slug
        slug: String,
    },

    /// Create an empty page
    Add {
        /// Page title
        title: String,

        /// Page slug (e.g. `plugins/cq-chat`)
        #[arg(long, short)]
        slug: String,

        /// Short description
        #[arg(long, short)]
        description: Option<String>,

        /// Publish immediately instead of creating a draft
        #[arg(long)]
        publish: bool,

        /// Also add a navigation entry for the page
        #[arg(long)]
        nav: bool,

        /// Group for the navigation entry
        #[arg(long, requires = "nav")]
        parent: Option<String>,
    },

    /// Delete a page (navigation entries are kept)
    Delete {
        /// Page slug
        slug: String,
    },

    /// Update page metadata from a JSON object
    ///
    /// Example: wiki page meta faq '{"status": "published", "badge": null}'
    Meta {
        /// Page slug
        slug: String,

        /// JSON object with the fields to change
        patch: String,
    },
}

pub async fn run(cmd: PageCommands, output: &Output) -> Result<()> {
    match cmd {
        PageCommands::List => list_pages(output).await,
        PageCommands::Show { slug } => show_page(output, &slug).await,
        PageCommands::Add {
            title,
            slug,
            description,
            publish,
            nav,
            parent,
        } => add_page(output, &title, &slug, description, publish, nav, parent.as_deref()).await,
        PageCommands::Delete { slug } => delete_page(output, &slug).await,
        PageCommands::Meta { slug, patch } => update_meta(output, &slug, &patch).await,
    }
}

async fn list_pages(output: &Output) -> Result<()> {
    let session = Session::open(output).await?;
    let pages: Vec<(String, String, PageStatus, usize)> = session.read(|store| {
        store
            .document()
            .pages
            .values()
            .map(|p| {
                (
                    p.meta.slug.clone(),
                    p.meta.title.clone(),
                    p.meta.status,
                    count_blocks(&p.blocks),
                )
            })
            .collect()
    })?;

    if output.is_json() {
        let items: Vec<_> = pages
            .iter()
            .map(|(slug, title, status, blocks)| {
                serde_json::json!({
                    "slug": slug,
                    "title": title,
                    "status": status,
                    "blocks": blocks,
                })
            })
            .collect();
        output.data(&items);
    } else if pages.is_empty() {
        println!("No pages found.");
    } else {
        println!("{:<28} {:<10} {:>6}  TITLE", "SLUG", "STATUS", "BLOCKS");
        println!("{}", "-".repeat(70));
        for (slug, title, status, blocks) in &pages {
            println!("{:<28} {:<10} {:>6}  {}", slug, status.as_str(), blocks, title);
        }
    }

    session.close().await
}

fn print_blocks(blocks: &[ContentBlock], depth: usize) {
    for block in blocks {
        let indent = "  ".repeat(depth + 1);
        match &block.body {
            BlockBody::Section { title, children, .. } => {
                println!("{}{} section \"{}\"", indent, block.id, title);
                print_blocks(children, depth + 1);
            }
            _ => println!("{}{} {}", indent, block.id, block.block_type()),
        }
    }
}

async fn show_page(output: &Output, slug: &str) -> Result<()> {
    let session = Session::open(output).await?;
    let page = session
        .read(|store| store.page(slug).cloned())?
        .ok_or_else(|| anyhow::anyhow!("Page not found: {}", slug))?;
    let (prev, next) = session.read(|store| store.prev_next(slug))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "page": page,
            "prev": prev,
            "next": next,
        }));
    } else {
        let meta = &page.meta;
        println!("Page: {} ({})", meta.title, meta.slug);
        println!("ID: {}", page.id);
        println!("Status: {}", meta.status.as_str());
        println!("Updated: {}", meta.updated_at);
        if let Some(description) = &meta.description {
            println!("Description: {}", description);
        }
        if let Some(tags) = &meta.tags {
            println!("Tags: {}", tags.join(", "));
        }
        if let Some(author) = &meta.author {
            println!("Author: {}", author);
        }
        if let Some(badge) = &meta.badge {
            println!("Badge: {}", badge);
        }

        if !page.blocks.is_empty() {
            println!("\nBlocks:");
            print_blocks(&page.blocks, 0);
        }

        if prev.is_some() || next.is_some() {
            println!();
            if let Some(prev) = prev {
                println!("Previous: {} ({})", prev.title, prev.slug);
            }
            if let Some(next) = next {
                println!("Next: {} ({})", next.title, next.slug);
            }
        }
    }

    session.close().await
}

async fn add_page(
    output: &Output,
    title: &str,
    slug: &str,
    description: Option<String>,
    publish: bool,
    nav: bool,
    parent: Option<&str>,
) -> Result<()> {
    if slug.is_empty() {
        bail!("Slug must not be empty");
    }
    let parent: Option<NodeId> = parent.map(str::parse).transpose()?;

    let mut meta = PageMeta::new(title, slug);
    meta.description = description;
    if publish {
        meta.status = PageStatus::Published;
    }

    let session = Session::open(output).await?;
    if session.read(|store| store.page(slug).is_some())? {
        output.verbose_ctx("page", &format!("Replacing existing page {}", slug));
    }

    let id = session.edit(|store| store.add_page(NewPage::new(meta)))?;

    let node_id = if nav {
        let node = session.edit(|store| {
            let order = next_order(store.document(), parent.as_ref());
            store.add_nav_node(parent.as_ref(), NewNavNode::new(title, order, NavKind::page(slug)))
        })?;
        Some(node.context("Navigation parent not found or not a group")?)
    } else {
        None
    };

    session.close().await?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "slug": slug,
            "title": title,
            "nav_id": node_id,
        }));
    } else {
        output.success(&format!("Created page: {} ({})", slug, title));
    }

    Ok(())
}

async fn delete_page(output: &Output, slug: &str) -> Result<()> {
    let session = Session::open(output).await?;
    let removed = session.edit(|store| store.delete_page(slug))?;
    if removed.is_none() {
        bail!("Page not found: {}", slug);
    }
    session.close().await?;

    output.success(&format!("Deleted page: {}", slug));
    Ok(())
}

async fn update_meta(output: &Output, slug: &str, patch: &str) -> Result<()> {
    let patch: PageMetaPatch = serde_json::from_str(patch).context("Invalid metadata patch")?;
    let target = patch.slug.clone();

    let session = Session::open(output).await?;
    let (exists, taken) = session.read(|store| {
        let taken = target
            .as_deref()
            .is_some_and(|t| t != slug && store.page(t).is_some());
        (store.page(slug).is_some(), taken)
    })?;
    if !exists {
        bail!("Page not found: {}", slug);
    }
    if taken {
        bail!("Slug already in use: {}", target.unwrap_or_default());
    }

    let changed = session.edit(|store| store.update_page_meta(slug, patch))?;
    session.close().await?;

    if changed {
        output.success(&format!("Updated page: {}", target.as_deref().unwrap_or(slug)));
    } else {
        output.success("No changes");
    }
    Ok(())
}
