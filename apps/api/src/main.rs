mod analysis;
mod billing;
mod config;
mod errors;
mod export;
mod models;
mod render;
mod routes;
mod state;
mod tax_id;
mod workspace;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::billing::HttpPaymentGateway;
use crate::config::Config;
use crate::export::{spawn_export_worker, ExportOrchestrator, FsExportSink};
use crate::routes::build_router;
use crate::state::AppState;
use crate::workspace::WorkspaceStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeForge API v{}", env!("CARGO_PKG_VERSION"));

    // Payment provider
    let gateway = HttpPaymentGateway::new(
        &config.payment_api_url,
        config.payment_api_key.clone(),
        config.http_timeout,
    )?;
    info!("Payment gateway initialized ({})", config.payment_api_url);

    // Export pipeline: settled sessions -> worker -> sink
    let workspaces = WorkspaceStore::new();
    let sink = Arc::new(FsExportSink::new(config.export_dir.clone()));
    let exports = ExportOrchestrator::new(workspaces.clone(), sink);
    let (settlements, settlement_rx) = mpsc::unbounded_channel();
    spawn_export_worker(exports.clone(), settlement_rx);
    info!("Export worker started (dir: {})", config.export_dir.display());

    let prices = config.prices();
    info!(
        "Pricing: base {} / minimum {}",
        prices.base, prices.minimum
    );

    let state = AppState {
        workspaces,
        gateway: Arc::new(gateway),
        exports,
        prices,
        poll: config.poll_settings(),
        settlements,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
