use anyhow::Context;
use pagebridge::bridge::BridgeServer;
use pagebridge::config::RelayConfig;
use pagebridge::ratelimit::ThrottleSweeper;
use pagebridge::RelayState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = std::env::var("PAGEBRIDGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("pagebridge.toml"));
    let config = RelayConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let state = Arc::new(RelayState::new(&config).context("building HTTP client")?);

    let sweeper = ThrottleSweeper::spawn(
        state.throttle.clone(),
        config.ratelimit.sweep_interval(),
        config.ratelimit.retention(),
    );

    let mut server = BridgeServer::new(state);
    server
        .start(&config.bridge.listen_addr)
        .await
        .context("starting bridge server")?;

    info!("pagebridge running, ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    server.stop().await?;
    sweeper.stop().await;

    Ok(())
}
