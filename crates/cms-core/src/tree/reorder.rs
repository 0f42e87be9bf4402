//! Drag-and-drop payload → flat `(item, parent, sort_order)` updates.

use std::collections::HashSet;

use cms_shared::constants::LEVEL_SORT_STRIDE;
use cms_shared::{EntityId, SortScheme};
use serde::{Deserialize, Serialize};

use crate::domain::MenuItem;
use crate::error::DomainError;
use crate::tree::hierarchy::MenuNode;

/// One node of the nested structure the admin UI submits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderNode {
    pub id: EntityId,
    #[serde(default)]
    pub children: Vec<ReorderNode>,
}

impl ReorderNode {
    pub fn leaf(id: EntityId) -> Self {
        Self { id, children: Vec::new() }
    }

    pub fn with_children(id: EntityId, children: Vec<ReorderNode>) -> Self {
        Self { id, children }
    }

    /// Shape of an existing tree, as the UI would submit it unchanged.
    pub fn from_nodes(nodes: &[MenuNode]) -> Vec<ReorderNode> {
        nodes
            .iter()
            .map(|node| ReorderNode {
                id: node.item.id,
                children: Self::from_nodes(&node.children),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderUpdate {
    pub item_id: EntityId,
    pub parent_id: Option<EntityId>,
    pub sort_order: i32,
}

/// Sort value for the `position`-th sibling (1-based) at `depth` (root = 0).
pub fn sort_order_for(scheme: SortScheme, depth: usize, position: usize) -> i32 {
    let position = position as i32;
    match scheme {
        SortScheme::Leveled => depth as i32 * LEVEL_SORT_STRIDE + position,
        SortScheme::Sequential => position,
    }
}

/// Depth-first walk of the payload producing one update per node.
pub fn flatten_reorder(payload: &[ReorderNode], scheme: SortScheme) -> Vec<ReorderUpdate> {
    let mut out = Vec::new();
    walk(payload, None, 0, scheme, &mut out);
    out
}

fn walk(
    nodes: &[ReorderNode],
    parent_id: Option<EntityId>,
    depth: usize,
    scheme: SortScheme,
    out: &mut Vec<ReorderUpdate>,
) {
    for (index, node) in nodes.iter().enumerate() {
        out.push(ReorderUpdate {
            item_id: node.id,
            parent_id,
            sort_order: sort_order_for(scheme, depth, index + 1),
        });
        walk(&node.children, Some(node.id), depth + 1, scheme, out);
    }
}

/// Every id must belong to the menu and appear once.
pub fn validate_payload(
    payload: &[ReorderNode],
    menu_item_ids: &HashSet<EntityId>,
) -> Result<(), DomainError> {
    fn visit(
        nodes: &[ReorderNode],
        known: &HashSet<EntityId>,
        seen: &mut HashSet<EntityId>,
    ) -> Result<(), DomainError> {
        for node in nodes {
            if !known.contains(&node.id) {
                return Err(DomainError::InvalidReorder(format!(
                    "item {} is not part of this menu",
                    node.id
                )));
            }
            if !seen.insert(node.id) {
                return Err(DomainError::InvalidReorder(format!(
                    "item {} appears more than once",
                    node.id
                )));
            }
            visit(&node.children, known, seen)?;
        }
        Ok(())
    }

    if payload.is_empty() {
        return Err(DomainError::InvalidReorder("payload is empty".to_string()));
    }
    visit(payload, menu_item_ids, &mut HashSet::new())
}

/// The menu's items as they would look after the updates are applied.
pub fn apply_updates(items: &[MenuItem], updates: &[ReorderUpdate]) -> Vec<MenuItem> {
    items
        .iter()
        .cloned()
        .map(|mut item| {
            if let Some(update) = updates.iter().find(|u| u.item_id == item.id) {
                item.parent_id = update.parent_id;
                item.sort_order = update.sort_order;
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::hierarchy::tests::item;
    use crate::tree::hierarchy::{build_hierarchy, sort_items};

    fn payload() -> Vec<ReorderNode> {
        vec![
            ReorderNode::leaf(1),
            ReorderNode::with_children(
                2,
                vec![
                    ReorderNode::leaf(4),
                    ReorderNode::with_children(3, vec![ReorderNode::leaf(5)]),
                ],
            ),
        ]
    }

    #[test]
    fn test_leveled_sort_orders() {
        let updates = flatten_reorder(&payload(), SortScheme::Leveled);
        let expected = vec![
            ReorderUpdate { item_id: 1, parent_id: None, sort_order: 1 },
            ReorderUpdate { item_id: 2, parent_id: None, sort_order: 2 },
            ReorderUpdate { item_id: 4, parent_id: Some(2), sort_order: 101 },
            ReorderUpdate { item_id: 3, parent_id: Some(2), sort_order: 102 },
            ReorderUpdate { item_id: 5, parent_id: Some(3), sort_order: 201 },
        ];
        assert_eq!(updates, expected);
    }

    #[test]
    fn test_sequential_sort_orders() {
        let updates = flatten_reorder(&payload(), SortScheme::Sequential);
        let orders: Vec<i32> = updates.iter().map(|u| u.sort_order).collect();
        assert_eq!(orders, vec![1, 2, 1, 2, 1]);
    }

    #[test]
    fn test_payload_deserializes_without_children() {
        let json = r#"[{"id": 1}, {"id": 2, "children": [{"id": 3}]}]"#;
        let parsed: Vec<ReorderNode> = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            vec![ReorderNode::leaf(1), ReorderNode::with_children(2, vec![ReorderNode::leaf(3)])]
        );
    }

    #[test]
    fn test_validate_rejects_foreign_and_duplicate_ids() {
        let known: HashSet<EntityId> = [1, 2, 3, 4, 5].into_iter().collect();
        assert!(validate_payload(&payload(), &known).is_ok());

        let foreign = vec![ReorderNode::leaf(1), ReorderNode::leaf(77)];
        assert!(matches!(
            validate_payload(&foreign, &known),
            Err(DomainError::InvalidReorder(_))
        ));

        let duplicated = vec![ReorderNode::with_children(1, vec![ReorderNode::leaf(1)])];
        assert!(validate_payload(&duplicated, &known).is_err());

        assert!(validate_payload(&[], &known).is_err());
    }

    #[test]
    fn test_rebuilt_tree_matches_payload_shape() {
        let items = vec![
            item(1, None, 1, "Home"),
            item(2, None, 2, "Galleries"),
            item(3, Some(2), 1, "Portraits"),
            item(4, Some(2), 2, "Landscapes"),
            item(5, None, 3, "Contact"),
        ];
        let updates = flatten_reorder(&payload(), SortScheme::Leveled);
        let mut reordered = apply_updates(&items, &updates);
        sort_items(&mut reordered);
        let tree = build_hierarchy(reordered);
        assert_eq!(ReorderNode::from_nodes(&tree.roots), payload());
    }

    #[test]
    fn test_items_outside_payload_untouched() {
        let items = vec![item(1, None, 1, "Home"), item(9, None, 7, "Legacy")];
        let updates = flatten_reorder(&[ReorderNode::leaf(1)], SortScheme::Leveled);
        let after = apply_updates(&items, &updates);
        assert_eq!(after[1], items[1]);
    }
}
