/// Preview: draw readings from a catalog without a storage backend.
///
/// Usage: reading_preview <catalog_path> --layout <id> [--set <id>] [--tier free|premium]
///                        [--seed <n>] [--bulk <n>]
///
/// With `--bulk`, prints orientation and frequency statistics over many
/// draws instead of a single narrative.

use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reading_engine::core::catalog::CatalogRegistry;
use reading_engine::core::pipeline::{ReadingGenerator, ReadingRequest};
use reading_engine::core::store::MemoryReadingStore;
use reading_engine::schema::content::Tier;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reading_preview", about = "Generate sample readings from a catalog")]
struct Args {
    /// A catalog RON file or a directory of them.
    #[arg(env = "READING_CATALOG")]
    catalog: PathBuf,

    /// Content set to draw from.
    #[arg(long, default_value = "tarot")]
    set: String,

    /// Layout id, e.g. three-card.
    #[arg(long)]
    layout: String,

    /// Caller tier: free or premium.
    #[arg(long, default_value = "free", value_parser = parse_tier)]
    tier: Tier,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Generate this many readings and print statistics.
    #[arg(long)]
    bulk: Option<usize>,
}

fn parse_tier(input: &str) -> Result<Tier, String> {
    Tier::parse(input).ok_or_else(|| format!("unknown tier '{}': expected free or premium", input))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut catalog = CatalogRegistry::new();
    if let Err(e) = catalog.load_path(&args.catalog) {
        eprintln!("ERROR: Failed to load catalog '{}': {}", args.catalog.display(), e);
        process::exit(1);
    }

    let generator = ReadingGenerator::new(catalog, MemoryReadingStore::new());
    let request = ReadingRequest::new(&args.set, &args.layout, args.tier, "preview");
    let mut rng = StdRng::seed_from_u64(args.seed);

    println!("Seed: {}", args.seed);
    println!("Tier: {}\n", args.tier.tag());

    match args.bulk {
        None => match generator.generate(&request, &mut rng) {
            Ok(reading) => {
                println!("--- Generated Reading ---");
                println!("{}", reading.narrative);
                println!("--- End ---\n");
                if let (Some(id), Some(expires)) = (reading.storage_id, reading.expires_at) {
                    println!("Stored as {} (expires {})", id, expires.to_rfc3339());
                }
            }
            Err(e) => {
                println!("ERROR: {} ({:?})", e, e.kind());
                process::exit(1);
            }
        },
        Some(count) => print_bulk_stats(&generator, &request, count, &mut rng),
    }
}

fn print_bulk_stats(
    generator: &ReadingGenerator<CatalogRegistry, MemoryReadingStore>,
    request: &ReadingRequest,
    count: usize,
    rng: &mut StdRng,
) {
    let now = Utc::now();
    let mut frequency: HashMap<String, usize> = HashMap::new();
    let mut inverted = 0usize;
    let mut drawn_total = 0usize;
    let mut errors = 0usize;

    for _ in 0..count {
        match generator.generate_at(request, now, rng) {
            Ok(reading) => {
                for drawn in &reading.drawn {
                    drawn_total += 1;
                    if drawn.orientation.is_inverted() {
                        inverted += 1;
                    }
                    *frequency.entry(drawn.item.name.clone()).or_default() += 1;
                }
            }
            Err(_) => errors += 1,
        }
    }

    println!(
        "=== Bulk Generation: {} readings ({} errors) ===\n",
        count - errors,
        errors
    );
    if drawn_total == 0 {
        return;
    }

    println!(
        "Inverted: {} / {} ({:.1}%)",
        inverted,
        drawn_total,
        100.0 * inverted as f64 / drawn_total as f64
    );

    let mut ranked: Vec<(String, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("Distinct items drawn: {}", ranked.len());
    println!("\nMost frequent:");
    for (name, n) in ranked.iter().take(10) {
        println!("  {:>5}  {}", n, name);
    }
    println!("\nLeast frequent:");
    for (name, n) in ranked.iter().rev().take(5) {
        println!("  {:>5}  {}", n, name);
    }
}
