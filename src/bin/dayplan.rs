//! Dayplan bot server.
//!
//! Reads configuration from the environment, starts the webhook gateway
//! and (unless disabled) the daily digest scheduler, then runs until
//! interrupted. Exits with status 1 if required configuration is missing.

use dayplan::gateway::Gateway;
use dayplan::{App, BotConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            eprintln!("dayplan: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let app = App::from_config(&config)?;

    let scheduler = app.scheduler(&config).map(|s| s.run());
    if scheduler.is_none() {
        tracing::info!("digest scheduler disabled; use /trigger for on-demand digests");
    }

    let mut gateway = match Gateway::start(app, &config.gateway).await {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "gateway failed to start");
            std::process::exit(1);
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown requested"),
        () = gateway.join() => tracing::warn!("gateway stopped"),
    }

    gateway.shutdown();
    if let Some(handle) = scheduler {
        handle.abort();
    }
    tracing::info!("dayplan shut down cleanly");
    Ok(())
}
