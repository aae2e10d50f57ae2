//! Parley CLI binary entry point.

use clap::Parser;
use parley::cli::Cli;
use parley::error::ParleyError;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so prompts and replies on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ParleyError::from)
        .and_then(|runtime| runtime.block_on(parley::cli::run(cli)));

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
