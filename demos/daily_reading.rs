/// Daily Reading example: the same draw seen by a free and a premium reader.
///
/// Run with: cargo run --example daily_reading

use rand::rngs::StdRng;
use rand::SeedableRng;
use reading_engine::core::catalog::CatalogRegistry;
use reading_engine::core::pipeline::{ReadingGenerator, ReadingRequest};
use reading_engine::core::store::MemoryReadingStore;
use reading_engine::schema::content::Tier;
use reading_engine::schema::reading::CallerId;

fn main() {
    let mut catalog = CatalogRegistry::new();
    catalog
        .load_from_ron(std::path::Path::new("catalog_data/tarot.ron"))
        .expect("Failed to load tarot catalog");

    let generator = ReadingGenerator::new(catalog, MemoryReadingStore::new());

    // --- A free reader asks for the three-card spread ---
    let free = ReadingRequest::new("tarot", "three-card", Tier::Free, "guest");
    let reading = generator
        .generate(&free, &mut StdRng::seed_from_u64(2026))
        .expect("Free reading failed");
    println!("=== Free reader ===\n");
    println!("{}\n", reading.narrative);

    // --- A free reader tries the Celtic Cross ---
    let gated = ReadingRequest::new("tarot", "celtic-cross", Tier::Free, "guest");
    match generator.generate(&gated, &mut StdRng::seed_from_u64(2026)) {
        Ok(_) => println!("Unexpected: free reader drew a premium spread"),
        Err(e) => println!("Celtic Cross for a free reader: {} ({:?})\n", e, e.kind()),
    }

    // --- A premium reader draws and keeps a Celtic Cross ---
    let premium = ReadingRequest::new("tarot", "celtic-cross", Tier::Premium, "margo");
    let reading = generator
        .generate(&premium, &mut StdRng::seed_from_u64(7))
        .expect("Premium reading failed");
    println!("=== Premium reader ===\n");
    println!("{}\n", reading.narrative);

    let history = generator
        .store()
        .history(&CallerId::new("margo"), reading.created_at)
        .expect("History lookup failed");
    for stored in history {
        println!(
            "Saved reading {} expires {}",
            stored.id,
            stored
                .reading
                .expires_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default()
        );
    }
}
