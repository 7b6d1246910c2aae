//! OCEAN character profiling CLI.
//!
//! Reads a per-speech sentiment table, populates the entity graph, and prints
//! one line of Big Five scores per character:
//!
//! ```bash
//! cargo run -p ocean -- --input romeo_and_juliet.tsv --output romeo_and_juliet.nt
//! ```

mod args;
mod logging;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    logging::init();

    let config = args::parse_config_from_args(&args, std::env::var(args::TOP_K_ENV).ok())?;
    let output = ocean_core::run(&config)
        .await
        .with_context(|| format!("profiling {} failed", config.input.display()))?;

    print!("{}", output.summary());
    info!(
        characters = output.profiles.len(),
        statements = output.graph.len(),
        "Profiled {}",
        config.input.display()
    );
    Ok(())
}

fn print_help() {
    println!("ocean - Big Five personality profiles from speech sentiment");
    println!();
    println!("USAGE:");
    println!("  ocean [OPTIONS] <INPUT>");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help                 Show this help message");
    println!("  -i, --input <PATH>         Tab-separated speech table");
    println!("  -g, --graph <PATH>         Starting graph document (JSON)");
    println!("  -o, --output <PATH>        Write the final graph (.nt for N-Triples, else JSON)");
    println!("  -k, --top-k <K>            Dimensions projected per character, 1-5 (default: 5)");
    println!("  -c, --correlations <PATH>  Correlation table (JSON) replacing the built-in one");
    println!();
    println!("ENVIRONMENT:");
    println!("  {}                Fallback for --top-k", args::TOP_K_ENV);
    println!("  RUST_LOG                   Log filter, logs go to stderr (default: info)");
    println!();
    println!("EXAMPLES:");
    println!("  ocean romeo_and_juliet.tsv");
    println!("  ocean -i romeo_and_juliet.tsv -o rj.nt -k 3");
}
