/// Catalog Linter: validates content sets before they are served.
///
/// Usage: catalog_linter <catalog_path> [--strict]

use clap::Parser;
use reading_engine::core::catalog::{CatalogRegistry, Severity};
use reading_engine::schema::content::Tier;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catalog_linter", about = "Validate reading catalog files")]
struct Args {
    /// A catalog RON file or a directory of them.
    #[arg(env = "READING_CATALOG")]
    catalog: PathBuf,

    /// Treat warnings as errors.
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let mut registry = CatalogRegistry::new();
    if let Err(e) = registry.load_path(&args.catalog) {
        eprintln!("ERROR: Failed to load catalog '{}': {}", args.catalog.display(), e);
        process::exit(1);
    }

    println!("Loaded {} content set(s)", registry.len());
    println!("\n=== Catalog Lint Report ===\n");

    let mut errors = 0usize;
    let mut warnings = 0usize;

    for set in registry.sets() {
        println!(
            "[{}] {} items ({} free), {} layouts",
            set.id,
            set.items.len(),
            set.available_count(Tier::Free),
            set.layouts.len()
        );

        if set.layouts.is_empty() {
            warnings += 1;
            println!("  WARNING: set '{}' defines no layouts", set.id);
        }
        if set.available_count(Tier::Free) == 0 {
            warnings += 1;
            println!(
                "  WARNING: set '{}' has no free items; free callers will see nothing",
                set.id
            );
        }

        for issue in set.validate() {
            match issue.severity() {
                Severity::Error => {
                    errors += 1;
                    println!("  ERROR: {}", issue);
                }
                Severity::Warning => {
                    warnings += 1;
                    println!("  WARNING: {}", issue);
                }
            }
        }
    }

    if errors == 0 && warnings == 0 {
        println!("\nAll checks passed!");
    }
    println!("\nSummary: {} errors, {} warnings", errors, warnings);

    if errors > 0 || (args.strict && warnings > 0) {
        process::exit(1);
    }
}
