//! Menu tree algorithms: building the nested hierarchy from flat rows,
//! flattening drag-and-drop payloads, and planning copies/imports.

pub mod hierarchy;
pub mod reorder;
pub mod transfer;

pub use hierarchy::{
    build_hierarchy, build_hierarchy_naive, depth_of, descendant_ids, sort_items, Hierarchy, MenuNode,
};
pub use reorder::{flatten_reorder, sort_order_for, ReorderNode, ReorderUpdate};
pub use transfer::{
    parent_remaps, plan_seed, ExportedItem, MenuExport, SeedItem, EXPORT_FORMAT_VERSION,
};
