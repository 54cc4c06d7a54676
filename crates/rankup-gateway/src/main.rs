//! RankUp gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p rankup-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use rankup_common::{try_init_tracing_with_config, AppConfig, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let env = Environment::from_env();
    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting RankUp gateway...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        address = %config.server.address(),
        guild_id = %config.discord.guild_id,
        "Configuration loaded"
    );

    rankup_gateway::run(config).await?;

    Ok(())
}
