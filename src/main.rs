use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

mod api;
mod config;
mod constants;
mod fetch;
mod history;
mod http_client;
mod layers;
mod stations;
mod storage;
#[cfg(test)]
mod test_support;
mod timestamp;
mod types;
mod utils;
mod wms;

use config::Config;
use types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_tracing();

    let cfg = Config::from_env()?;
    info!(
        "Starting radar proxy: station={} layer={} conus={} mrms={}",
        cfg.default_station, cfg.default_layer, cfg.conus_wms_url, cfg.mrms_wms_url
    );

    let http = http_client::build_client()?;
    let listen_addr = cfg.listen_addr.clone();
    let app = api::build_router(AppState::new(cfg, http));

    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    info!("radar proxy listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("radar proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
