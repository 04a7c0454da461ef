//! Navigation CLI commands

use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};

use super::output::Output;
use super::session::Session;
use crate::domain::nav;
use crate::domain::{Document, DocumentStore, NavKind, NavNode, NavNodePatch, NewNavNode, NodeId, PageResolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Group,
    Page,
    Link,
}

#[derive(Subcommand)]
pub enum NavCommands {
    /// Show the navigation tree
    List,

    /// Add a navigation node
    Add {
        /// Node title
        title: String,

        /// Node kind
        #[arg(long, short, value_enum, default_value = "page")]
        kind: KindArg,

        /// Page slug (page nodes)
        #[arg(long, short)]
        slug: Option<String>,

        /// Target URL (link nodes)
        #[arg(long)]
        href: Option<String>,

        /// Parent group (root level if omitted)
        #[arg(long, short)]
        parent: Option<String>,

        /// Sort key among siblings (appended if omitted)
        #[arg(long)]
        order: Option<i64>,
    },

    /// Change a node's title
    Rename {
        /// Node ID
        id: String,

        /// New title
        title: String,
    },

    /// Update a node from a JSON object
    ///
    /// Example: wiki nav set page-faq '{"badge": "New", "hidden": null}'
    Set {
        /// Node ID
        id: String,

        /// JSON object with the fields to change
        patch: String,
    },

    /// Delete a node and everything under it
    Delete {
        /// Node ID
        id: String,
    },

    /// Move a node before its previous sibling
    Up {
        /// Node ID
        id: String,
    },

    /// Move a node after its next sibling
    Down {
        /// Node ID
        id: String,
    },
}

pub async fn run(cmd: NavCommands, output: &Output) -> Result<()> {
    match cmd {
        NavCommands::List => list_nav(output).await,
        NavCommands::Add {
            title,
            kind,
            slug,
            href,
            parent,
            order,
        } => add_node(output, &title, kind, slug, href, parent.as_deref(), order).await,
        NavCommands::Rename { id, title } => {
            update_node(output, &id, NavNodePatch::title(title)).await
        }
        NavCommands::Set { id, patch } => {
            let patch: NavNodePatch =
                serde_json::from_str(&patch).context("Invalid navigation patch")?;
            update_node(output, &id, patch).await
        }
        NavCommands::Delete { id } => delete_node(output, &id).await,
        NavCommands::Up { id } => move_node(output, &id, true).await,
        NavCommands::Down { id } => move_node(output, &id, false).await,
    }
}

/// Order value that sorts after every sibling under `parent` (or at the root)
pub(super) fn next_order(document: &Document, parent: Option<&NodeId>) -> i64 {
    let siblings = match parent {
        None => Some(&document.navigation),
        Some(id) => nav::find(&document.navigation, id).and_then(NavNode::children),
    };
    siblings
        .and_then(|s| s.iter().map(|n| n.order).max())
        .map_or(0, |max| max + 1)
}

fn print_tree(store: &DocumentStore, nodes: &[NavNode], depth: usize) {
    for node in nav::sorted(nodes) {
        let indent = "  ".repeat(depth);
        let detail = match &node.kind {
            NavKind::Group { .. } => String::new(),
            NavKind::Page { slug, .. } => match store.resolve_page(&node.id) {
                PageResolution::Dangling(_) => format!(" -> {} (missing page)", slug),
                _ => format!(" -> {}", slug),
            },
            NavKind::Link { href, .. } => format!(" -> {}", href),
        };
        println!(
            "{}{:<6} {} [{}]{}",
            indent,
            node.kind.as_str(),
            node.title,
            node.id,
            detail
        );
        if let Some(children) = node.children() {
            print_tree(store, children, depth + 1);
        }
    }
}

async fn list_nav(output: &Output) -> Result<()> {
    let session = Session::open(output).await?;

    if output.is_json() {
        let navigation = session.read(|store| store.document().navigation.clone())?;
        output.data(&navigation);
    } else {
        session.read(|store| {
            let navigation = &store.document().navigation;
            if navigation.is_empty() {
                println!("Navigation is empty.");
            } else {
                print_tree(store, navigation, 0);
            }
        })?;
    }

    session.close().await
}

async fn add_node(
    output: &Output,
    title: &str,
    kind: KindArg,
    slug: Option<String>,
    href: Option<String>,
    parent: Option<&str>,
    order: Option<i64>,
) -> Result<()> {
    let kind = match kind {
        KindArg::Group => NavKind::group(),
        KindArg::Page => NavKind::page(slug.context("Page nodes need --slug")?),
        KindArg::Link => NavKind::link(href.context("Link nodes need --href")?),
    };
    let parent: Option<NodeId> = parent.map(str::parse).transpose()?;

    let session = Session::open(output).await?;
    let id = session.edit(|store| {
        let order = order.unwrap_or_else(|| next_order(store.document(), parent.as_ref()));
        store.add_nav_node(parent.as_ref(), NewNavNode::new(title, order, kind))
    })?;
    let Some(id) = id else {
        bail!("Parent not found or not a group");
    };
    session.close().await?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "title": title }));
    } else {
        output.success(&format!("Added navigation node: {} ({})", id, title));
    }

    Ok(())
}

fn existing(session: &Session, id: &str) -> Result<NodeId> {
    let id: NodeId = id.parse()?;
    let found = session.read(|store| nav::find(&store.document().navigation, &id).is_some())?;
    if !found {
        bail!("Navigation node not found: {}", id);
    }
    Ok(id)
}

async fn update_node(output: &Output, id: &str, patch: NavNodePatch) -> Result<()> {
    let session = Session::open(output).await?;
    let id = existing(&session, id)?;

    let changed = session.edit(|store| store.update_nav_node(&id, patch))?;
    session.close().await?;

    if changed {
        output.success(&format!("Updated navigation node: {}", id));
    } else {
        output.success("No changes");
    }
    Ok(())
}

async fn delete_node(output: &Output, id: &str) -> Result<()> {
    let session = Session::open(output).await?;
    let id = existing(&session, id)?;

    session.edit(|store| store.delete_nav_node(&id))?;
    session.close().await?;

    output.success(&format!("Deleted navigation node: {}", id));
    Ok(())
}

async fn move_node(output: &Output, id: &str, up: bool) -> Result<()> {
    let session = Session::open(output).await?;
    let id = existing(&session, id)?;

    let moved = session.edit(|store| {
        if up {
            store.move_nav_node_up(&id)
        } else {
            store.move_nav_node_down(&id)
        }
    })?;
    session.close().await?;

    if moved {
        output.success(&format!("Moved navigation node: {}", id));
    } else {
        output.success("Already at the edge, nothing moved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nid(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    #[test]
    fn next_order_follows_highest_sibling() {
        let mut document = Document::seed();
        document.navigation[0].order = 3;
        document.navigation[1].order = 7;
        assert_eq!(next_order(&document, None), 8);
    }

    #[test]
    fn next_order_inside_group_ignores_gaps() {
        let mut document = Document::seed();
        let mut found = nav::find_mut(&mut document.navigation, &nid("group-main")).unwrap();
        let children = found.node().children_mut().unwrap();
        for (i, child) in children.iter_mut().enumerate() {
            child.order = 3 + i as i64;
        }
        let count = children.len() as i64;

        assert_eq!(next_order(&document, Some(&nid("group-main"))), 3 + count);
    }

    #[test]
    fn next_order_for_empty_or_missing_parent_is_zero() {
        let mut document = Document::seed();
        document.navigation.clear();
        assert_eq!(next_order(&document, None), 0);
        assert_eq!(next_order(&document, Some(&nid("missing"))), 0);
    }
}
