//! Call record endpoints
//!
//! Upload, advancement, retrieval and deletion. Upload validation runs
//! in full before anything touches disk: a rejected request leaves no
//! trace.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::FilterQuery;
use crate::error::{ApiError, ApiResult};
use crate::models::CallRecord;
use crate::services::pipeline;
use crate::services::transcription::AudioFormat;
use crate::AppState;

/// Upload rejection; surfaces as 400 with code `VALIDATION_ERROR`
fn validation(message: String) -> ApiError {
    ApiError::Common(callqa_common::Error::Validation(message))
}

pub fn call_routes() -> Router<AppState> {
    Router::new()
        .route("/api/calls", post(create_call).get(list_calls))
        .route("/api/calls/:id", get(get_call).delete(delete_call))
        .route("/api/calls/:id/advance", post(advance_call))
}

/// Upload request; audio travels base64-encoded in the JSON body
#[derive(Debug, Deserialize)]
struct CreateCallRequest {
    filename: String,
    #[serde(default)]
    agent_id: Option<String>,
    audio_base64: String,
}

/// POST /api/calls - register an uploaded call recording
async fn create_call(
    State(state): State<AppState>,
    Json(request): Json<CreateCallRequest>,
) -> ApiResult<(StatusCode, Json<CallRecord>)> {
    let format = AudioFormat::from_filename(&request.filename).ok_or_else(|| {
        validation(format!(
            "unsupported audio format: {} (accepted: mp3, wav, m4a, webm, ogg)",
            request.filename
        ))
    })?;

    let audio = BASE64_STANDARD
        .decode(&request.audio_base64)
        .map_err(|e| validation(format!("audio_base64 is not valid base64: {e}")))?;

    if audio.len() as u64 > state.config.max_upload_bytes {
        return Err(validation(format!(
            "audio payload too large: {} bytes (maximum {})",
            audio.len(),
            state.config.max_upload_bytes
        )));
    }
    if audio.is_empty() {
        return Err(validation("audio payload is empty".to_string()));
    }

    let mut record = CallRecord::new(request.filename, request.agent_id);

    tokio::fs::create_dir_all(&state.config.upload_dir).await?;
    let audio_path = state
        .config
        .upload_dir
        .join(format!("{}.{}", record.id, format.as_str()));
    tokio::fs::write(&audio_path, &audio).await?;
    record.audio_path = Some(audio_path.display().to_string());

    let record = match state.store.create(record).await {
        Ok(record) => record,
        Err(e) => {
            // The stored audio has no record pointing at it any more
            if let Err(remove_err) = tokio::fs::remove_file(&audio_path).await {
                tracing::warn!(
                    path = %audio_path.display(),
                    error = %remove_err,
                    "Audio for failed record creation could not be removed"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        call_id = %record.id,
        bytes = audio.len(),
        format = format.as_str(),
        "Call audio uploaded"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/calls/{id}/advance - run the next pipeline stage
async fn advance_call(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CallRecord>> {
    let record = pipeline::advance(
        &state.store,
        state.transcriber.as_ref(),
        state.analyzer.as_ref(),
        id,
    )
    .await?;
    Ok(Json(record))
}

/// GET /api/calls/{id}
async fn get_call(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CallRecord>> {
    Ok(Json(state.store.get(id).await?))
}

/// GET /api/calls - records matching the filter, in creation order
async fn list_calls(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<CallRecord>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.store.list(&filter).await?))
}

/// DELETE /api/calls/{id} - remove the record and its stored audio
async fn delete_call(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let record = state.store.delete(id).await?;

    if let Some(audio_path) = &record.audio_path {
        // The record is already gone; a leftover file is only noise
        if let Err(e) = tokio::fs::remove_file(audio_path).await {
            tracing::warn!(call_id = %id, error = %e, "Stored audio could not be removed");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
