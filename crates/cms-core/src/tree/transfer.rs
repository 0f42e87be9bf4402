//! Moving whole menus around: the JSON export document, import planning,
//! and parent remapping for duplication.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use cms_shared::constants::DEFAULT_LINK_TARGET;
use cms_shared::{EntityId, SortScheme};
use serde::{Deserialize, Serialize};

use crate::domain::{Menu, MenuItem, MenuItemInput, NewMenuItem};
use crate::tree::hierarchy::MenuNode;
use crate::tree::reorder::sort_order_for;

pub const EXPORT_FORMAT_VERSION: u32 = 1;

fn default_target() -> String {
    DEFAULT_LINK_TARGET.to_string()
}

fn default_format_version() -> u32 {
    EXPORT_FORMAT_VERSION
}

/// Portable JSON document describing one menu and its tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuExport {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub menu_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<ExportedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportedItem {
    pub label: String,
    pub link: String,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExportedItem>,
}

impl ExportedItem {
    fn from_node(node: &MenuNode) -> Self {
        Self {
            label: node.item.label.clone(),
            link: node.item.link.clone(),
            target: node.item.target.clone(),
            css_class: node.item.css_class.clone(),
            children: node.children.iter().map(Self::from_node).collect(),
        }
    }

    pub fn to_input(&self) -> MenuItemInput {
        MenuItemInput {
            label: self.label.clone(),
            link: self.link.clone(),
            target: self.target.clone(),
            css_class: self.css_class.clone(),
            parent_id: None,
        }
        .normalized()
    }

    pub fn height(&self) -> usize {
        1 + self.children.iter().map(ExportedItem::height).max().unwrap_or(0)
    }
}

impl MenuExport {
    pub fn from_tree(menu: &Menu, roots: &[MenuNode]) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            menu_name: menu.menu_name.clone(),
            description: menu.description.clone(),
            exported_at: Utc::now(),
            items: roots.iter().map(ExportedItem::from_node).collect(),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.items.iter().map(ExportedItem::height).max().unwrap_or(0)
    }
}

/// One row of an import plan. Parents always precede their children, so a
/// store can insert in order and resolve `parent_key` from earlier inserts.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedItem {
    pub key: usize,
    pub parent_key: Option<usize>,
    pub sort_order: i32,
    pub input: MenuItemInput,
}

impl SeedItem {
    pub fn to_new_item(&self, menu_id: EntityId, parent_id: Option<EntityId>) -> NewMenuItem {
        let mut row = NewMenuItem::from_input(menu_id, self.sort_order, &self.input);
        row.parent_id = parent_id;
        row
    }
}

/// Pre-order plan for inserting an exported tree.
pub fn plan_seed(items: &[ExportedItem], scheme: SortScheme) -> Vec<SeedItem> {
    let mut plan = Vec::new();
    plan_level(items, None, 0, scheme, &mut plan);
    plan
}

fn plan_level(
    items: &[ExportedItem],
    parent_key: Option<usize>,
    depth: usize,
    scheme: SortScheme,
    plan: &mut Vec<SeedItem>,
) {
    for (index, item) in items.iter().enumerate() {
        let key = plan.len();
        plan.push(SeedItem {
            key,
            parent_key,
            sort_order: sort_order_for(scheme, depth, index + 1),
            input: item.to_input(),
        });
        plan_level(&item.children, Some(key), depth + 1, scheme, plan);
    }
}

/// Second pass of a duplicate: `(new_item_id, new_parent_id)` for every
/// original item that had a parent. Parents missing from `id_map` are
/// skipped, leaving the copy at the top level.
pub fn parent_remaps(
    originals: &[MenuItem],
    id_map: &HashMap<EntityId, EntityId>,
) -> Vec<(EntityId, EntityId)> {
    originals
        .iter()
        .filter_map(|item| {
            let parent = item.parent_id?;
            let new_id = id_map.get(&item.id)?;
            let new_parent = id_map.get(&parent)?;
            Some((*new_id, *new_parent))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::hierarchy::tests::item;
    use crate::tree::hierarchy::build_hierarchy;

    fn menu() -> Menu {
        Menu {
            id: 1,
            menu_name: "main".to_string(),
            description: Some("Primary navigation".to_string()),
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    #[test]
    fn test_export_keeps_tree_shape() {
        let tree = build_hierarchy(vec![
            item(1, None, 1, "Home"),
            item(2, None, 2, "Galleries"),
            item(3, Some(2), 1, "Portraits"),
        ]);
        let export = MenuExport::from_tree(&menu(), &tree.roots);
        assert_eq!(export.menu_name, "main");
        assert_eq!(export.items.len(), 2);
        assert_eq!(export.items[1].children[0].label, "Portraits");
        assert_eq!(export.max_depth(), 2);

        let json = serde_json::to_value(&export).unwrap();
        assert!(json["items"][0].get("children").is_none());
        assert_eq!(json["items"][1]["children"][0]["link"], "/portraits");
    }

    #[test]
    fn test_import_document_defaults() {
        let json = r#"{
            "menu_name": "footer",
            "items": [{"label": "Imprint", "link": "/imprint"}]
        }"#;
        let doc: MenuExport = serde_json::from_str(json).unwrap();
        assert_eq!(doc.format_version, EXPORT_FORMAT_VERSION);
        assert_eq!(doc.items[0].target, "_self");
        assert!(doc.items[0].children.is_empty());
    }

    #[test]
    fn test_plan_seed_preorder_with_parent_keys() {
        let doc = vec![
            ExportedItem {
                label: "Galleries".into(),
                link: "/galleries".into(),
                target: "_self".into(),
                css_class: None,
                children: vec![
                    ExportedItem {
                        label: "Portraits".into(),
                        link: "/galleries/portraits".into(),
                        target: "_self".into(),
                        css_class: None,
                        children: vec![],
                    },
                    ExportedItem {
                        label: "Street".into(),
                        link: "/galleries/street".into(),
                        target: "_self".into(),
                        css_class: None,
                        children: vec![],
                    },
                ],
            },
            ExportedItem {
                label: "About".into(),
                link: "/about".into(),
                target: "_self".into(),
                css_class: None,
                children: vec![],
            },
        ];
        let plan = plan_seed(&doc, SortScheme::Leveled);
        let shape: Vec<(usize, Option<usize>, i32)> =
            plan.iter().map(|s| (s.key, s.parent_key, s.sort_order)).collect();
        assert_eq!(
            shape,
            vec![(0, None, 1), (1, Some(0), 101), (2, Some(0), 102), (3, None, 2)]
        );
        assert_eq!(plan[3].input.label, "About");
    }

    #[test]
    fn test_parent_remaps() {
        let originals = vec![
            item(10, None, 1, "A"),
            item(11, Some(10), 1, "B"),
            item(12, Some(404), 1, "Dangling"),
        ];
        let id_map: HashMap<EntityId, EntityId> = [(10, 20), (11, 21), (12, 22)].into_iter().collect();
        assert_eq!(parent_remaps(&originals, &id_map), vec![(21, 20)]);
    }
}
