//! callqa-audit library interface
//!
//! Exposes the application state and router for the binary and for
//! integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use callqa_common::config::TomlConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::store::CallStore;
use crate::services::analysis::AnalysisClient;
use crate::services::transcription::TranscriptionClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Call record store (SQLite-backed, sole writer of record state)
    pub store: CallStore,
    /// Transcription collaborator client
    pub transcriber: Arc<TranscriptionClient>,
    /// AI analysis collaborator client
    pub analyzer: Arc<AnalysisClient>,
    /// Resolved service configuration
    pub config: Arc<TomlConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: CallStore,
        transcriber: TranscriptionClient,
        analyzer: AnalysisClient,
        config: TomlConfig,
    ) -> Self {
        Self {
            store,
            transcriber: Arc::new(transcriber),
            analyzer: Arc::new(analyzer),
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::call_routes())
        .merge(api::dashboard_routes())
        .merge(api::health_routes())
        .with_state(state)
}
