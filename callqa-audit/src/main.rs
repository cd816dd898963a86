//! callqa-audit - Call Evaluation & Aggregation Service
//!
//! Validates and normalizes AI call-quality analysis against a fixed
//! rubric, computes deterministic scores, stores call records behind a
//! strict state machine and serves dashboard aggregations.

use anyhow::Result;
use callqa_common::config::TomlConfig;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use callqa_audit::db::{run_stale_reaper, CallStore};
use callqa_audit::services::analysis::AnalysisClient;
use callqa_audit::services::transcription::TranscriptionClient;
use callqa_audit::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting callqa-audit (Call Evaluation & Aggregation)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = TomlConfig::load()?;
    info!("Database: {}", config.database_path.display());
    info!("Upload directory: {}", config.upload_dir.display());

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let db_pool = callqa_audit::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let store = CallStore::new(db_pool);

    let transcriber = TranscriptionClient::new(
        config.transcription_url.clone(),
        config.api_key.clone(),
        config.max_upload_bytes,
    )
    .map_err(|e| anyhow::anyhow!("Failed to build transcription client: {e}"))?;

    let analyzer = AnalysisClient::new(config.analysis_url.clone(), config.api_key.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build analysis client: {e}"))?;

    // Orphaned in-flight records are force-failed in the background
    tokio::spawn(run_stale_reaper(store.clone(), config.stale_after_seconds));
    info!("Stale record reaper started ({}s threshold)", config.stale_after_seconds);

    let bind_address = config.bind_address.clone();
    let state = AppState::new(store, transcriber, analyzer, config);
    let app = callqa_audit::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{bind_address}");
    info!("Health check: http://{bind_address}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
