/// Entitlement filter: narrows a content set to what a tier may use.

use thiserror::Error;
use tracing::debug;

use crate::schema::content::{ContentItem, ContentSet, Tier};
use crate::schema::layout::{LayoutId, LayoutSpec};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntitlementError {
    #[error("no content is available at this tier")]
    NoAvailableContent,
    /// Covers both a missing layout and one gated above the caller's tier.
    #[error("layout not available")]
    LayoutNotFound,
}

/// The slice of a content set visible to one tier.
#[derive(Debug, Clone)]
pub struct Entitled<'a> {
    pub tier: Tier,
    pub items: Vec<&'a ContentItem>,
    pub layouts: Vec<&'a LayoutSpec>,
}

impl<'a> Entitled<'a> {
    /// Look up a layout among the entitled ones.
    pub fn layout(&self, id: &LayoutId) -> Result<&'a LayoutSpec, EntitlementError> {
        self.layouts
            .iter()
            .copied()
            .find(|layout| &layout.id == id)
            .ok_or(EntitlementError::LayoutNotFound)
    }
}

/// Keep every item and layout whose tier is at or below `tier`.
///
/// Fails with `NoAvailableContent` when no item survives, regardless of
/// which layouts are present.
pub fn filter(set: &ContentSet, tier: Tier) -> Result<Entitled<'_>, EntitlementError> {
    let items: Vec<&ContentItem> = set
        .items
        .iter()
        .filter(|item| tier.grants(item.tier))
        .collect();
    if items.is_empty() {
        return Err(EntitlementError::NoAvailableContent);
    }

    let layouts: Vec<&LayoutSpec> = set
        .layouts
        .iter()
        .filter(|layout| tier.grants(layout.tier))
        .collect();

    debug!(
        set = %set.id,
        tier = tier.tag(),
        items = items.len(),
        layouts = layouts.len(),
        "filtered content set"
    );

    Ok(Entitled {
        tier,
        items,
        layouts,
    })
}
