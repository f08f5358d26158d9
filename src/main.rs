//! duostore CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Installs the tracing subscriber (stderr, `DUOSTORE_LOG` or `RUST_LOG`)
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Prints errors to stderr
//! 4. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use duostore::cli;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("DUOSTORE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("duostore=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli::run().await {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
