//! Navigation tree
//!
//! The sidebar is an ordered forest of [`NavNode`]s. Only groups own
//! children, so the forest is acyclic by construction: a node is reachable
//! solely through its parent's `children` vector.
//!
//! Display order among siblings is `order` ascending, ties broken by position
//! in the vector. `move_up`/`move_down` renumber every sibling to `0..n`.

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use super::patch::{double_option, merge};

/// Kind-specific part of a navigation node, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavKind {
    Group {
        #[serde(default)]
        children: Vec<NavNode>,
        #[serde(default)]
        collapsible: bool,
        #[serde(default, rename = "defaultOpen")]
        default_open: bool,
    },
    Page {
        /// Key of the page in the document's page map
        slug: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        badge: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hidden: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        draft: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disabled: Option<bool>,
    },
    Link {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        external: Option<bool>,
    },
}

impl NavKind {
    pub fn group() -> Self {
        NavKind::Group {
            children: Vec::new(),
            collapsible: false,
            default_open: true,
        }
    }

    pub fn page(slug: impl Into<String>) -> Self {
        NavKind::Page {
            slug: slug.into(),
            badge: None,
            hidden: None,
            draft: None,
            disabled: None,
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        NavKind::Link {
            href: href.into(),
            external: None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavKind::Group { .. } => "group",
            NavKind::Page { .. } => "page",
            NavKind::Link { .. } => "link",
        }
    }
}

/// One entry of the navigation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    /// Unique across the whole forest
    pub id: NodeId,
    pub title: String,
    /// Sort key among siblings
    pub order: i64,
    #[serde(flatten)]
    pub kind: NavKind,
}

impl NavNode {
    pub fn new(id: NodeId, title: impl Into<String>, order: i64, kind: NavKind) -> Self {
        Self {
            id,
            title: title.into(),
            order,
            kind,
        }
    }

    pub fn children(&self) -> Option<&Vec<NavNode>> {
        match &self.kind {
            NavKind::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NavNode>> {
        match &mut self.kind {
            NavKind::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Slug of a page node
    pub fn slug(&self) -> Option<&str> {
        match &self.kind {
            NavKind::Page { slug, .. } => Some(slug),
            _ => None,
        }
    }

    /// Assigns a fresh id to this node and to every node below it
    pub fn regenerate_ids(&mut self) {
        self.id = NodeId::generate();
        if let Some(children) = self.children_mut() {
            for child in children.iter_mut() {
                child.regenerate_ids();
            }
        }
    }

    /// Shallow-merges a patch into this node
    ///
    /// Fields that do not belong to the node's kind are ignored.
    pub fn apply(&mut self, patch: NavNodePatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.order, patch.order);

        match &mut self.kind {
            NavKind::Group {
                collapsible,
                default_open,
                ..
            } => {
                merge(collapsible, patch.collapsible);
                merge(default_open, patch.default_open);
            }
            NavKind::Page {
                slug,
                badge,
                hidden,
                draft,
                disabled,
            } => {
                merge(slug, patch.slug);
                merge(badge, patch.badge);
                merge(hidden, patch.hidden);
                merge(draft, patch.draft);
                merge(disabled, patch.disabled);
            }
            NavKind::Link { href, external } => {
                merge(href, patch.href);
                merge(external, patch.external);
            }
        }
    }
}

/// A navigation node before it has been assigned an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNavNode {
    pub title: String,
    #[serde(default)]
    pub order: i64,
    #[serde(flatten)]
    pub kind: NavKind,
}

impl NewNavNode {
    pub fn new(title: impl Into<String>, order: i64, kind: NavKind) -> Self {
        Self {
            title: title.into(),
            order,
            kind,
        }
    }
}

/// Partial update for a [`NavNode`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NavNodePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub badge: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub hidden: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub draft: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub disabled: Option<Option<bool>>,
    #[serde(default)]
    pub collapsible: Option<bool>,
    #[serde(default)]
    pub default_open: Option<bool>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub external: Option<Option<bool>>,
}

impl NavNodePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Location of a node: the sibling vector holding it and its index there
pub struct Found<'a> {
    pub siblings: &'a mut Vec<NavNode>,
    pub index: usize,
}

impl Found<'_> {
    pub fn node(&mut self) -> &mut NavNode {
        &mut self.siblings[self.index]
    }
}

/// Depth-first search for a node
pub fn find<'a>(nodes: &'a [NavNode], id: &NodeId) -> Option<&'a NavNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = node.children().and_then(|c| find(c, id)) {
            return Some(found);
        }
    }
    None
}

/// Depth-first search returning the sibling vector and index, for splicing
pub fn find_mut<'a>(nodes: &'a mut Vec<NavNode>, id: &NodeId) -> Option<Found<'a>> {
    if let Some(index) = nodes.iter().position(|n| &n.id == id) {
        return Some(Found {
            siblings: nodes,
            index,
        });
    }
    for node in nodes.iter_mut() {
        if let Some(children) = node.children_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Appends a node to the root forest or to a group
///
/// The node and any children it arrives with all get fresh ids. Returns None
/// (and changes nothing) if the parent is missing or is not a group.
pub fn insert(nodes: &mut Vec<NavNode>, parent: Option<&NodeId>, node: NewNavNode) -> Option<NodeId> {
    let siblings = match parent {
        None => nodes,
        Some(parent_id) => {
            let Found { siblings, index } = find_mut(nodes, parent_id)?;
            siblings[index].children_mut()?
        }
    };

    let mut node = NavNode::new(NodeId::generate(), node.title, node.order, node.kind);
    node.regenerate_ids();
    let id = node.id.clone();
    siblings.push(node);
    Some(id)
}

/// Merges a patch into a node; false if the node is missing
pub fn update(nodes: &mut Vec<NavNode>, id: &NodeId, patch: NavNodePatch) -> bool {
    match find_mut(nodes, id) {
        Some(mut found) => {
            found.node().apply(patch);
            true
        }
        None => false,
    }
}

/// Removes a node together with its subtree
///
/// Page nodes are removed without touching the page they point to.
pub fn delete(nodes: &mut Vec<NavNode>, id: &NodeId) -> Option<NavNode> {
    let found = find_mut(nodes, id)?;
    Some(found.siblings.remove(found.index))
}

/// Swaps a node with its previous sibling and renumbers the siblings
pub fn move_up(nodes: &mut Vec<NavNode>, id: &NodeId) -> bool {
    let Some(found) = find_mut(nodes, id) else {
        return false;
    };
    if found.index == 0 {
        return false;
    }
    found.siblings.swap(found.index - 1, found.index);
    renumber(found.siblings);
    true
}

/// Swaps a node with its next sibling and renumbers the siblings
pub fn move_down(nodes: &mut Vec<NavNode>, id: &NodeId) -> bool {
    let Some(found) = find_mut(nodes, id) else {
        return false;
    };
    if found.index + 1 >= found.siblings.len() {
        return false;
    }
    found.siblings.swap(found.index, found.index + 1);
    renumber(found.siblings);
    true
}

fn renumber(siblings: &mut [NavNode]) {
    for (position, node) in siblings.iter_mut().enumerate() {
        node.order = position as i64;
    }
}

/// Collects every node id in the forest, depth-first
pub fn collect_ids<'a>(nodes: &'a [NavNode], out: &mut Vec<&'a NodeId>) {
    for node in nodes {
        out.push(&node.id);
        if let Some(children) = node.children() {
            collect_ids(children, out);
        }
    }
}

/// Total number of nodes in the forest
pub fn count(nodes: &[NavNode]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + n.children().map(|c| count(c)).unwrap_or(0))
        .sum()
}

/// Siblings in display order: `order` ascending, then vector position
pub fn sorted(nodes: &[NavNode]) -> Vec<&NavNode> {
    let mut view: Vec<&NavNode> = nodes.iter().collect();
    view.sort_by_key(|n| n.order);
    view
}

/// A visible page in reading order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavEntry {
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Flattens the forest into the visible pages in reading order
///
/// Hidden, draft and disabled page nodes are skipped; groups are descended
/// into; links are not pages.
pub fn flatten_pages(nodes: &[NavNode]) -> Vec<NavEntry> {
    let mut out = Vec::new();
    walk_pages(nodes, &mut out);
    out
}

fn walk_pages(nodes: &[NavNode], out: &mut Vec<NavEntry>) {
    for node in sorted(nodes) {
        match &node.kind {
            NavKind::Group { children, .. } => walk_pages(children, out),
            NavKind::Page {
                slug,
                badge,
                hidden,
                draft,
                disabled,
            } => {
                let skip = hidden.unwrap_or(false)
                    || draft.unwrap_or(false)
                    || disabled.unwrap_or(false)
                    || slug.is_empty();
                if !skip {
                    out.push(NavEntry {
                        title: node.title.clone(),
                        slug: slug.clone(),
                        badge: badge.clone(),
                    });
                }
            }
            NavKind::Link { .. } => {}
        }
    }
}

/// Previous and next visible pages around `slug`
///
/// Both are None when `slug` is not a visible page.
pub fn prev_next(nodes: &[NavNode], slug: &str) -> (Option<NavEntry>, Option<NavEntry>) {
    let flat = flatten_pages(nodes);
    let Some(idx) = flat.iter().position(|e| e.slug == slug) else {
        return (None, None);
    };

    let prev = idx.checked_sub(1).and_then(|i| flat.get(i)).cloned();
    let next = flat.get(idx + 1).cloned();
    (prev, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nid(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    fn page(id: &str, slug: &str, order: i64) -> NavNode {
        NavNode::new(nid(id), id.to_uppercase(), order, NavKind::page(slug))
    }

    fn group(id: &str, order: i64, children: Vec<NavNode>) -> NavNode {
        NavNode::new(
            nid(id),
            id,
            order,
            NavKind::Group {
                children,
                collapsible: false,
                default_open: true,
            },
        )
    }

    fn forest() -> Vec<NavNode> {
        vec![
            group("g1", 0, vec![page("a", "a", 0), page("b", "b", 1), page("c", "c", 2)]),
            group("g2", 1, vec![page("d", "d", 0)]),
        ]
    }

    fn orders(nodes: &[NavNode]) -> Vec<(String, i64)> {
        nodes.iter().map(|n| (n.id.to_string(), n.order)).collect()
    }

    #[test]
    fn wire_format_is_flat() {
        let node = NavNode::new(nid("p"), "FAQ", 1, NavKind::page("faq"));
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"id": "p", "title": "FAQ", "order": 1, "type": "page", "slug": "faq"})
        );
    }

    #[test]
    fn group_fields_default_when_absent() {
        let raw = json!({"id": "g", "type": "group", "title": "G", "order": 0});
        let node: NavNode = serde_json::from_value(raw).unwrap();
        assert_eq!(node.children().map(Vec::len), Some(0));
    }

    #[test]
    fn group_uses_default_open_key() {
        let node = group("g", 0, vec![]);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["defaultOpen"], true);
        assert_eq!(value["collapsible"], false);
    }

    #[test]
    fn find_nested_node() {
        let nodes = forest();
        assert_eq!(find(&nodes, &nid("c")).unwrap().title, "C");
        assert!(find(&nodes, &nid("zz")).is_none());
    }

    #[test]
    fn find_mut_reports_siblings_and_index() {
        let mut nodes = forest();
        let found = find_mut(&mut nodes, &nid("b")).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.siblings.len(), 3);
    }

    #[test]
    fn insert_at_root() {
        let mut nodes = forest();
        let id = insert(&mut nodes, None, NewNavNode::new("Site", 999, NavKind::link("https://x"))).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2].id, id);
        assert_eq!(nodes[2].order, 999);
    }

    #[test]
    fn insert_into_group() {
        let mut nodes = forest();
        let id = insert(&mut nodes, Some(&nid("g2")), NewNavNode::new("E", 1, NavKind::page("e"))).unwrap();
        let children = nodes[1].children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].id, id);
    }

    #[test]
    fn insert_regenerates_ids_of_nested_children() {
        let mut nodes = forest();
        let kind = NavKind::Group {
            children: vec![group("g1", 0, vec![page("a", "a", 0)]), page("d", "d", 1)],
            collapsible: true,
            default_open: false,
        };
        let id = insert(&mut nodes, Some(&nid("g2")), NewNavNode::new("Copy", 1, kind)).unwrap();

        let mut ids = Vec::new();
        collect_ids(&nodes, &mut ids);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(count(&nodes), 10);

        let inserted = find(&nodes, &id).unwrap();
        let children = inserted.children().unwrap();
        assert_eq!(children[0].children().unwrap()[0].slug(), Some("a"));
        assert_eq!(children[1].slug(), Some("d"));
    }

    #[test]
    fn insert_under_page_or_missing_parent_is_noop() {
        let mut nodes = forest();
        let before = nodes.clone();
        assert!(insert(&mut nodes, Some(&nid("a")), NewNavNode::new("X", 0, NavKind::page("x"))).is_none());
        assert!(insert(&mut nodes, Some(&nid("zz")), NewNavNode::new("X", 0, NavKind::page("x"))).is_none());
        assert_eq!(nodes, before);
    }

    #[test]
    fn update_merges_fields() {
        let mut nodes = forest();
        let patch: NavNodePatch =
            serde_json::from_value(json!({"title": "Renamed", "badge": "New", "href": "ignored"})).unwrap();
        assert!(update(&mut nodes, &nid("a"), patch));

        let node = find(&nodes, &nid("a")).unwrap();
        assert_eq!(node.title, "Renamed");
        match &node.kind {
            NavKind::Page { badge, slug, .. } => {
                assert_eq!(badge.as_deref(), Some("New"));
                assert_eq!(slug, "a");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn update_missing_is_noop() {
        let mut nodes = forest();
        assert!(!update(&mut nodes, &nid("zz"), NavNodePatch::title("x")));
    }

    #[test]
    fn delete_removes_subtree() {
        let mut nodes = forest();
        let removed = delete(&mut nodes, &nid("g1")).unwrap();
        assert_eq!(removed.children().unwrap().len(), 3);
        assert_eq!(count(&nodes), 2);
        assert!(find(&nodes, &nid("a")).is_none());
    }

    #[test]
    fn move_up_swaps_and_renumbers() {
        let mut nodes = forest();
        // gaps in order are normalized
        nodes[0].children_mut().unwrap()[2].order = 10;
        assert!(move_up(&mut nodes, &nid("c")));
        assert_eq!(
            orders(nodes[0].children().unwrap()),
            vec![("a".into(), 0), ("c".into(), 1), ("b".into(), 2)]
        );
    }

    #[test]
    fn move_down_swaps_and_renumbers() {
        let mut nodes = forest();
        assert!(move_down(&mut nodes, &nid("g1")));
        assert_eq!(orders(&nodes), vec![("g2".into(), 0), ("g1".into(), 1)]);
    }

    #[test]
    fn moves_at_boundaries_are_noops() {
        let mut nodes = forest();
        let before = nodes.clone();
        assert!(!move_up(&mut nodes, &nid("a")));
        assert!(!move_down(&mut nodes, &nid("c")));
        assert!(!move_up(&mut nodes, &nid("zz")));
        assert_eq!(nodes, before);
    }

    #[test]
    fn flatten_skips_invisible_pages() {
        let mut nodes = forest();
        update(
            &mut nodes,
            &nid("b"),
            NavNodePatch {
                hidden: Some(Some(true)),
                ..NavNodePatch::default()
            },
        );
        update(
            &mut nodes,
            &nid("d"),
            NavNodePatch {
                disabled: Some(Some(true)),
                ..NavNodePatch::default()
            },
        );
        insert(&mut nodes, None, NewNavNode::new("Ext", 5, NavKind::link("https://x")));

        let slugs: Vec<_> = flatten_pages(&nodes).into_iter().map(|e| e.slug).collect();
        assert_eq!(slugs, vec!["a", "c"]);
    }

    #[test]
    fn flatten_sorts_by_order() {
        let nodes = vec![page("x", "x", 2), page("y", "y", 0), page("z", "z", 2)];
        let slugs: Vec<_> = flatten_pages(&nodes).into_iter().map(|e| e.slug).collect();
        assert_eq!(slugs, vec!["y", "x", "z"]);
    }

    #[test]
    fn prev_next_crosses_groups() {
        let nodes = forest();
        let (prev, next) = prev_next(&nodes, "c");
        assert_eq!(prev.unwrap().slug, "b");
        assert_eq!(next.unwrap().slug, "d");

        let (prev, next) = prev_next(&nodes, "a");
        assert!(prev.is_none());
        assert_eq!(next.unwrap().slug, "b");

        assert_eq!(prev_next(&nodes, "missing"), (None, None));
    }
}
