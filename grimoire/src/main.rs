//! Grimoire: game-master companion for a tabletop RPG party.
//!
//! Runs the headless line protocol over stdin/stdout:
//!
//! ```bash
//! cargo run -p grimoire -- --data-dir ./party --starter-items
//! ```
//!
//! Configuration comes from `GRIMOIRE_*` environment variables (a `.env`
//! file is honored) and is overridden by command line flags. Logs go to
//! stderr and are filtered with `RUST_LOG`.

mod headless;

use grimoire_core::GrimoireConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "grimoire=info,grimoire_core=info";

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    let config = headless::parse_config_from_args(&args, GrimoireConfig::from_env());
    headless::run_headless(config).await;
}

fn print_help() {
    println!("Grimoire - game-master companion for a tabletop RPG party");
    println!();
    println!("USAGE:");
    println!("  grimoire [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help          Show this help message");
    println!("  --data-dir <DIR>    Where state is stored (default: ./grimoire-data)");
    println!("  --group <NAME>      Party name for #group");
    println!("  --seed <N>          Seed for redemption code generation");
    println!("  --starter-items     Give new characters the starter kit");
    println!();
    println!("ENVIRONMENT:");
    println!("  GRIMOIRE_DATA_DIR, GRIMOIRE_GROUP_NAME, GRIMOIRE_RNG_SEED,");
    println!("  GRIMOIRE_STARTER_ITEMS, RUST_LOG");
    println!();
    println!("EXAMPLES:");
    println!("  grimoire");
    println!("  echo '#secrets' | grimoire --data-dir ./party");
}
