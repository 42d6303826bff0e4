// riktech-server — serves the RikTech engine over HTTP.
//
// Config comes from $RIKTECH_CONFIG or ./riktech.toml (see EngineConfig).

use anyhow::Context;
use log::info;
use riktech::{build_router, AppState};
use riktech_core::{EngineConfig, Responder};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::load(None).context("loading config")?;
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("invalid server.bind_address / server.port")?;

    let responder = Responder::open(config).context("opening data directory")?;
    let app = build_router(AppState::new(responder));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("[server] Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
