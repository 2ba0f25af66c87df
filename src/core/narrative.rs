/// Narrative composer: renders a reading's text from its drawn items.
///
/// Output is markdown-flavoured plain text: a heading, the layout
/// description, one paragraph per drawn item, and a summary whose depth
/// depends on the caller's tier.

use tracing::debug;

use crate::schema::content::Tier;
use crate::schema::layout::LayoutSpec;
use crate::schema::reading::DrawnItem;

/// Marker appended to the name of an inverted item.
pub const INVERTED_MARKER: &str = "(Inverted)";

/// Closing sentence shown only to unprivileged callers.
pub const UPSELL: &str = "Upgrade to Premium to unlock in-depth interpretations, \
     the full deck, advanced spreads, and a saved history of your readings.";

const FREE_CLOSING: &str = "This reading offers a glimpse into the energies surrounding \
     your question. Take a moment to reflect on how each card speaks to your situation.";

const PREMIUM_CLOSING: &str = "Taken together, these cards form a connected story rather \
     than separate messages. Notice where their themes echo one another and where they pull \
     in different directions.";

/// Sentence naming the first drawn item in a privileged closing.
pub fn foundation_sentence(first: &DrawnItem) -> String {
    format!(
        "{} in the {} position sets the foundation of this reading and colours everything that follows.",
        first.item.name, first.slot.label
    )
}

/// Sentence jointly naming the second and third drawn items in a privileged closing.
pub fn interplay_sentence(second: &DrawnItem, third: &DrawnItem) -> String {
    format!(
        "The interplay between {} and {} shows how the situation is unfolding and where it may lead.",
        second.item.name, third.item.name
    )
}

/// Compose the narrative for a set of drawn items.
///
/// `drawn` is expected in slot order, as produced by the draw engine.
pub fn compose(drawn: &[DrawnItem], layout: &LayoutSpec, tier: Tier) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(drawn.len() + 4);

    sections.push(format!("## {}", layout.name));
    if !layout.description.is_empty() {
        sections.push(layout.description.clone());
    }

    for entry in drawn {
        let mut heading = format!("**{}: {}**", entry.slot.label, entry.item.name);
        if entry.orientation.is_inverted() {
            heading.push(' ');
            heading.push_str(INVERTED_MARKER);
        }
        sections.push(format!("{}\n{}", heading, entry.meaning()));
    }

    sections.push("### Summary".to_string());
    sections.push(closing(drawn, tier));

    let text = sections.join("\n\n");
    debug!(
        layout = %layout.id.as_str(),
        tier = tier.tag(),
        chars = text.len(),
        "composed narrative"
    );
    text
}

fn closing(drawn: &[DrawnItem], tier: Tier) -> String {
    if !tier.is_privileged() {
        return format!("{} {}", FREE_CLOSING, UPSELL);
    }

    let mut parts = vec![PREMIUM_CLOSING.to_string()];
    if let Some(first) = drawn.first() {
        parts.push(foundation_sentence(first));
    }
    if let [_, second, third, ..] = drawn {
        parts.push(interplay_sentence(second, third));
    }
    parts.join(" ")
}
