//! caseline-im library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use caseline_common::config::ServiceConfig;

use crate::services::ImportSessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Resolved service configuration
    pub config: Arc<ServiceConfig>,
    /// In-memory import sessions, keyed by session id
    pub sessions: Arc<ImportSessionStore>,
    /// Serializes confirm batches so sort_order allocation never races
    pub confirm_lock: Arc<Mutex<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: ServiceConfig) -> Self {
        let sessions = Arc::new(ImportSessionStore::new(config.session_ttl_secs));
        Self {
            db,
            config: Arc::new(config),
            sessions,
            confirm_lock: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
