//! caseline-im - Spreadsheet Import Microservice
//!
//! Imports audit timeline events from uploaded CSV/XLSX files through a
//! three-phase flow: upload, validate mapping, confirm. Sessions are
//! held in memory between phases; confirmed events land in SQLite.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use caseline_common::config::ServiceConfig;
use caseline_common::db::init_database;
use caseline_im::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting caseline-im (Spreadsheet Import) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::resolve();
    info!("Database: {}", config.database_path.display());

    let db_pool = init_database(&config.database_path).await?;
    info!("Database connection established");

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(db_pool, config);
    let app = caseline_im::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
