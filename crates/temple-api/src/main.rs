//! Temple API Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p temple-api
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use temple_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load .env before the subscriber reads RUST_LOG
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    try_init_tracing(&TracingConfig::for_environment(config.app.env));

    info!(
        env = ?config.app.env,
        backend = ?config.storage.backend,
        port = config.api.port,
        "Configuration loaded"
    );

    temple_api::run(config).await?;
    Ok(())
}
