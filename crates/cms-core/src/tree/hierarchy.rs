//! Flat parent-pointer rows → nested menu tree.
//!
//! `build_hierarchy` indexes children by parent id in one pass and attaches
//! them from the roots down. `build_hierarchy_naive` is the repeated-filter
//! form (quadratic); it is kept as a readable reference and a test oracle.

use std::collections::{HashMap, HashSet};

use cms_shared::EntityId;
use serde::Serialize;

use crate::domain::MenuItem;

/// A menu item with its ordered children.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuNode {
    #[serde(flatten)]
    pub item: MenuItem,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Number of levels in this subtree, counting the node itself.
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(MenuNode::height).max().unwrap_or(0)
    }

    /// Number of nodes in this subtree, counting the node itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(MenuNode::size).sum::<usize>()
    }
}

/// Result of a tree build.
///
/// `orphans` holds items that cannot be reached from a root: their parent is
/// missing, belongs to another menu, or they sit on a parent cycle.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Hierarchy {
    pub roots: Vec<MenuNode>,
    pub orphans: Vec<MenuItem>,
}

impl Hierarchy {
    pub fn len(&self) -> usize {
        self.roots.iter().map(MenuNode::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.roots.iter().map(MenuNode::height).max().unwrap_or(0)
    }

    /// Items in pre-order: a parent before its children, siblings in order.
    pub fn preorder(&self) -> Vec<&MenuItem> {
        let mut out = Vec::with_capacity(self.len());
        for root in &self.roots {
            push_preorder(root, &mut out);
        }
        out
    }
}

fn push_preorder<'a>(node: &'a MenuNode, out: &mut Vec<&'a MenuItem>) {
    out.push(&node.item);
    for child in &node.children {
        push_preorder(child, out);
    }
}

/// Canonical sibling order used by every read path.
pub fn sort_items(items: &mut [MenuItem]) {
    items.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Builds the tree from items already in sibling order.
pub fn build_hierarchy(items: Vec<MenuItem>) -> Hierarchy {
    let mut by_parent: HashMap<Option<EntityId>, Vec<(usize, MenuItem)>> = HashMap::new();
    for (index, item) in items.into_iter().enumerate() {
        by_parent.entry(item.parent_id).or_default().push((index, item));
    }

    let roots = attach(None, &mut by_parent);

    let mut orphans: Vec<(usize, MenuItem)> = by_parent.into_values().flatten().collect();
    orphans.sort_by_key(|(index, _)| *index);

    Hierarchy {
        roots,
        orphans: orphans.into_iter().map(|(_, item)| item).collect(),
    }
}

fn attach(
    parent: Option<EntityId>,
    by_parent: &mut HashMap<Option<EntityId>, Vec<(usize, MenuItem)>>,
) -> Vec<MenuNode> {
    let Some(siblings) = by_parent.remove(&parent) else {
        return Vec::new();
    };
    siblings
        .into_iter()
        .map(|(_, item)| {
            let children = attach(Some(item.id), by_parent);
            MenuNode { item, children }
        })
        .collect()
}

/// Repeated-filter tree build. Orphans are not reported.
pub fn build_hierarchy_naive(items: &[MenuItem]) -> Vec<MenuNode> {
    build_level(items, None)
}

fn build_level(items: &[MenuItem], parent: Option<EntityId>) -> Vec<MenuNode> {
    items
        .iter()
        .filter(|item| item.parent_id == parent)
        .map(|item| MenuNode {
            item: item.clone(),
            children: build_level(items, Some(item.id)),
        })
        .collect()
}

/// All descendants of `root`, collected one level at a time.
pub fn descendant_ids(items: &[MenuItem], root: EntityId) -> Vec<EntityId> {
    let mut found = Vec::new();
    let mut seen: HashSet<EntityId> = HashSet::from([root]);
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        let next: Vec<EntityId> = items
            .iter()
            .filter(|item| item.parent_id.is_some_and(|p| frontier.contains(&p)))
            .map(|item| item.id)
            .filter(|id| seen.insert(*id))
            .collect();
        found.extend_from_slice(&next);
        frontier = next;
    }

    found
}

/// Depth of an item (roots are depth 1). `None` when the parent chain is
/// broken or loops.
pub fn depth_of(items: &[MenuItem], id: EntityId) -> Option<usize> {
    let by_id: HashMap<EntityId, &MenuItem> = items.iter().map(|i| (i.id, i)).collect();
    let mut depth = 0;
    let mut current = Some(id);
    let mut seen = HashSet::new();

    while let Some(cursor) = current {
        if !seen.insert(cursor) {
            return None;
        }
        let item = by_id.get(&cursor)?;
        depth += 1;
        current = item.parent_id;
    }

    Some(depth)
}
