//! OpenMotoTelemetry Server
//!
//! Serves the dashboard UI and REST API, and drives the telemetry tick loop.

use anyhow::Result;
use omt_server::{api, state, ticker};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting OpenMotoTelemetry Server");

    // Create application state
    let state = state::AppState::new()?;

    // Build the router
    let app = api::create_router(state.clone());

    // Start the tick loop in the background
    tokio::spawn(ticker::run(state.clone()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 9140));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.ticker_cancel.clone()))
        .await?;

    Ok(())
}

/// Wait for ctrl-c, then stop the ticker before the server winds down
async fn shutdown_signal(ticker_cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown requested, stopping ticker");
    ticker_cancel.cancel();
}
