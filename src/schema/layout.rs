use serde::{Deserialize, Serialize};

use super::content::Tier;

/// Newtype wrapper for layout IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(pub String);

impl LayoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A labeled position within a layout, e.g. `(0, "Past")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub position: u32,
    pub label: String,
}

/// A named arrangement of slots requiring a fixed number of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub id: LayoutId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub required_count: usize,
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub tier: Tier,
}

impl LayoutSpec {
    /// Slots sorted by position. Items are bound to slots in this order.
    pub fn ordered_slots(&self) -> Vec<&Slot> {
        let mut slots: Vec<&Slot> = self.slots.iter().collect();
        slots.sort_by_key(|slot| slot.position);
        slots
    }
}
