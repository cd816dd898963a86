//! Call processing pipeline
//!
//! Drives a call record through transcription, analysis and scoring, one
//! stage per `advance` call. Collaborator failures and rejected analysis
//! payloads land the record in Failed with a recorded reason; they are
//! outcomes, not errors. Errors are reserved for calls that cannot be
//! advanced at all (unknown id, stage already in flight, terminal
//! record).

use callqa_common::types::CallStatus;
use callqa_common::{Error, Result};
use uuid::Uuid;

use crate::db::{CallStore, TransitionPayload};
use crate::models::CallRecord;
use crate::services::analysis::Analyzer;
use crate::services::normalizer;
use crate::services::scoring;
use crate::services::transcription::{AudioFormat, Transcriber};

/// Advance a call record by one pipeline stage
///
/// Uploaded records run the transcription stage and land in Analyzing;
/// Analyzing records run the analysis and scoring stage and land in
/// Scored. Either stage may instead land in Failed.
pub async fn advance<T, A>(
    store: &CallStore,
    transcriber: &T,
    analyzer: &A,
    id: Uuid,
) -> Result<CallRecord>
where
    T: Transcriber,
    A: Analyzer,
{
    let record = store.get(id).await?;

    match record.status {
        CallStatus::Uploaded => run_transcription(store, transcriber, record).await,
        CallStatus::Analyzing => run_analysis(store, analyzer, record).await,
        CallStatus::Transcribing => Err(Error::State(format!(
            "call {id} already has a transcription stage in flight"
        ))),
        CallStatus::Scored | CallStatus::Failed => Err(Error::State(format!(
            "call {id} is already {}; terminal records cannot advance",
            record.status
        ))),
    }
}

async fn run_transcription<T: Transcriber>(
    store: &CallStore,
    transcriber: &T,
    record: CallRecord,
) -> Result<CallRecord> {
    // Claim the stage first so a concurrent advance sees Transcribing
    let record = store
        .transition(record.id, TransitionPayload::Transcribing)
        .await?;

    let outcome = transcribe_record(transcriber, &record).await;

    match outcome {
        Ok(transcript) => {
            store
                .transition(record.id, TransitionPayload::Analyzing { transcript })
                .await
        }
        Err(reason) => {
            tracing::warn!(call_id = %record.id, reason = %reason, "Transcription stage failed");
            store
                .transition(record.id, TransitionPayload::Failed { reason })
                .await
        }
    }
}

async fn transcribe_record<T: Transcriber>(
    transcriber: &T,
    record: &CallRecord,
) -> std::result::Result<String, String> {
    let audio_path = record
        .audio_path
        .as_deref()
        .ok_or_else(|| "no audio stored for this record".to_string())?;

    let format = AudioFormat::from_filename(&record.filename)
        .ok_or_else(|| format!("unsupported audio format: {}", record.filename))?;

    let audio = tokio::fs::read(audio_path)
        .await
        .map_err(|e| format!("audio file unreadable: {e}"))?;

    transcriber
        .transcribe(&audio, format)
        .await
        .map_err(|e| e.to_string())
}

async fn run_analysis<A: Analyzer>(
    store: &CallStore,
    analyzer: &A,
    record: CallRecord,
) -> Result<CallRecord> {
    let transcript = record
        .transcript
        .as_deref()
        .ok_or_else(|| Error::State(format!("call {} is Analyzing without a transcript", record.id)))?;

    let raw = match analyzer.analyze(transcript).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(call_id = %record.id, error = %e, "Analysis stage failed");
            return store
                .transition(
                    record.id,
                    TransitionPayload::Failed {
                        reason: e.to_string(),
                    },
                )
                .await;
        }
    };

    match normalizer::normalize(&raw) {
        Ok(analysis) => {
            let scores = scoring::score(&analysis);
            tracing::info!(
                call_id = %record.id,
                total_points = scores.total_points,
                percentage = scores.percentage,
                "Call scored"
            );
            store
                .transition(record.id, TransitionPayload::Scored { analysis, scores })
                .await
        }
        Err(e) => {
            tracing::warn!(call_id = %record.id, error = %e, "Analysis payload rejected");
            store
                .transition(
                    record.id,
                    TransitionPayload::Failed {
                        reason: e.to_string(),
                    },
                )
                .await
        }
    }
}
