/// Draw engine: uniform sampling without replacement plus orientation.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, error};

use crate::schema::content::{ContentItem, Orientation};
use crate::schema::layout::LayoutSpec;
use crate::schema::reading::DrawnItem;

/// Probability that any single drawn item lands inverted.
pub const INVERSION_PROBABILITY: f64 = 0.3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("layout requires {required} items but only {available} are available")]
    InsufficientContent { available: usize, required: usize },
    #[error("layout declares {slots} slots but requires {required} items")]
    SlotMismatch { slots: usize, required: usize },
}

/// Draw `layout.required_count` distinct items and bind them to the
/// layout's slots in position order.
///
/// The whole pool is shuffled (Fisher–Yates) before the first
/// `required_count` items are taken, so every ordered selection is equally
/// likely. Orientations are drawn afterwards, independently per item.
pub fn draw<R: Rng + ?Sized>(
    items: &[&ContentItem],
    layout: &LayoutSpec,
    rng: &mut R,
) -> Result<Vec<DrawnItem>, DrawError> {
    let required = layout.required_count;

    if items.len() < required {
        error!(
            layout = %layout.id.as_str(),
            available = items.len(),
            required,
            "catalog cannot satisfy layout"
        );
        return Err(DrawError::InsufficientContent {
            available: items.len(),
            required,
        });
    }
    if layout.slots.len() != required {
        error!(
            layout = %layout.id.as_str(),
            slots = layout.slots.len(),
            required,
            "layout slot count does not match required count"
        );
        return Err(DrawError::SlotMismatch {
            slots: layout.slots.len(),
            required,
        });
    }

    let mut pool: Vec<&ContentItem> = items.to_vec();
    pool.shuffle(rng);

    let drawn: Vec<DrawnItem> = pool
        .into_iter()
        .zip(layout.ordered_slots())
        .map(|(item, slot)| {
            let orientation = if rng.gen_bool(INVERSION_PROBABILITY) {
                Orientation::Inverted
            } else {
                Orientation::Upright
            };
            DrawnItem {
                item: item.clone(),
                slot: slot.clone(),
                orientation,
            }
        })
        .collect();

    debug!(
        layout = %layout.id.as_str(),
        drawn = drawn.len(),
        inverted = drawn.iter().filter(|d| d.orientation.is_inverted()).count(),
        "drew items"
    );

    Ok(drawn)
}
