use anyhow::Result;
use axum::serve;
use smsgw_telemetry::install as init_telemetry;
use tokio::net::TcpListener;
use tracing::info;

use smsgw_gateway::{GatewayConfig, build_router, build_state};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry("smsgw-gateway")?;

    let config = GatewayConfig::from_env()?;
    let state = build_state(&config)?;
    let router = build_router(state);
    let listener = TcpListener::bind(config.addr).await?;
    info!("smsgw-gateway listening on {}", config.addr);

    serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
