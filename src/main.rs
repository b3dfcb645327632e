//! Binary entry point for the HTTP API.
//!
//! Initializes logging, loads configuration, and starts the server.

use anyhow::Result;
use snaplink::{config, server, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Failed to load .env: {} (using system environment)", e);
    }

    let cfg = config::load_from_env()?;
    telemetry::init(&cfg)?;

    cfg.print_summary();
    tracing::info!("Starting snaplink API");

    server::run(cfg).await
}
