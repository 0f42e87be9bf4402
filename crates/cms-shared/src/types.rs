//! Common types

use serde::{Deserialize, Serialize};

/// Row identity used by every persisted CMS entity.
pub type EntityId = i64;

/// How the reorder processor numbers siblings.
///
/// `Leveled` spreads levels apart: `depth * 100 + position`, root depth 0 and
/// 1-based positions. `Sequential` is a plain per-sibling `1..=n` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortScheme {
    #[default]
    Leveled,
    Sequential,
}

impl SortScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortScheme::Leveled => "leveled",
            SortScheme::Sequential => "sequential",
        }
    }
}

/// Storage adapter selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}
