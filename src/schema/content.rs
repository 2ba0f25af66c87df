use serde::{Deserialize, Serialize};

use super::layout::LayoutSpec;

/// Newtype wrapper for content item IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Entitlement level of a caller, item, or layout.
///
/// Variants are declared in ascending order of privilege; the derived
/// `Ord` is the entitlement comparison.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    /// Returns the tag string for this tier (e.g., "tier:premium").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Free => "tier:free",
            Self::Premium => "tier:premium",
        }
    }

    /// Privileged callers get extended narratives and persisted readings.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Premium)
    }

    /// True if a caller at this tier may use something gated at `required`.
    pub fn grants(&self, required: Tier) -> bool {
        required <= *self
    }

    pub fn parse(input: &str) -> Option<Tier> {
        match input.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "premium" | "paid" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// How a drawn item landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Upright,
    Inverted,
}

impl Orientation {
    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::Inverted)
    }
}

/// A single drawable unit: one card of a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub name: String,
    /// Coarse grouping, e.g. "major" or "minor".
    pub category: String,
    /// Finer grouping within the category, e.g. a suit.
    #[serde(default)]
    pub sub_tag: Option<String>,
    pub meaning_upright: String,
    pub meaning_inverted: String,
    #[serde(default)]
    pub tier: Tier,
    /// Reference to the item's artwork.
    #[serde(default)]
    pub image: String,
}

impl ContentItem {
    /// The meaning string that applies to the given orientation.
    pub fn meaning(&self, orientation: Orientation) -> &str {
        match orientation {
            Orientation::Upright => &self.meaning_upright,
            Orientation::Inverted => &self.meaning_inverted,
        }
    }
}

/// A named catalog of items and the layouts that draw from them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub items: Vec<ContentItem>,
    pub layouts: Vec<LayoutSpec>,
}

impl ContentSet {
    pub fn item(&self, id: &ContentId) -> Option<&ContentItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of items a caller at `tier` may draw.
    pub fn available_count(&self, tier: Tier) -> usize {
        self.items.iter().filter(|item| tier.grants(item.tier)).count()
    }
}
