//! cscope-db - Manage cscope index databases per project
//!
//! Commands:
//! - init: register a source tree and generate its index
//! - run: regenerate (default when no command is given)
//! - clear: delete the index and the registry entry
//! - find / list / list-generators / generator-path: read-only queries

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
