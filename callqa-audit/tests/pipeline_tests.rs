//! Integration tests for the call processing pipeline
//!
//! Collaborators are stubbed so every outcome path is exercised without
//! network access: successful scoring, collaborator outages and rejected
//! analysis payloads.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use callqa_audit::db::CallStore;
use callqa_audit::models::{CallRecord, ComplianceFlag, RawAnalysis, RawItemScore};
use callqa_audit::services::analysis::{AnalyzeError, Analyzer};
use callqa_audit::services::pipeline;
use callqa_audit::services::transcription::{
    AudioFormat, TranscribeError, Transcriber, TranscriptionClient,
};
use callqa_common::rubric::Rubric;
use callqa_common::types::CallStatus;
use callqa_common::Error;

struct StubTranscriber;

impl Transcriber for StubTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _format: AudioFormat,
    ) -> Result<String, TranscribeError> {
        Ok("Customer called about a billing discrepancy.".to_string())
    }
}

struct FailingTranscriber;

impl Transcriber for FailingTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _format: AudioFormat,
    ) -> Result<String, TranscribeError> {
        Err(TranscribeError::ServiceUnavailable(
            "connection refused".to_string(),
        ))
    }
}

struct StubAnalyzer {
    raw: RawAnalysis,
}

impl Analyzer for StubAnalyzer {
    async fn analyze(&self, _transcript: &str) -> Result<RawAnalysis, AnalyzeError> {
        Ok(self.raw.clone())
    }
}

struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    async fn analyze(&self, _transcript: &str) -> Result<RawAnalysis, AnalyzeError> {
        Err(AnalyzeError::ServiceUnavailable("timeout".to_string()))
    }
}

/// Analyzer that records whether it was ever reached
#[derive(Default)]
struct CountingAnalyzer {
    calls: AtomicUsize,
}

impl Analyzer for CountingAnalyzer {
    async fn analyze(&self, _transcript: &str) -> Result<RawAnalysis, AnalyzeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AnalyzeError::ServiceUnavailable("unused".to_string()))
    }
}

async fn test_store() -> CallStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    callqa_audit::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");
    CallStore::new(pool)
}

/// Uploaded record whose audio actually exists on disk
async fn uploaded_with_audio(store: &CallStore, dir: &tempfile::TempDir) -> CallRecord {
    let mut record = CallRecord::new("call.mp3".to_string(), Some("agent-1".to_string()));
    let audio_path = dir.path().join(format!("{}.mp3", record.id));
    std::fs::write(&audio_path, b"fake_mp3_data").unwrap();
    record.audio_path = Some(audio_path.display().to_string());
    store.create(record).await.unwrap()
}

/// Raw payload with every rubric item at its maximum
fn perfect_raw() -> RawAnalysis {
    let scores = Rubric::get()
        .categories()
        .iter()
        .flat_map(|category| {
            category.items.iter().map(|item| RawItemScore {
                category: category.name.to_string(),
                question: item.prompt.to_string(),
                score: json!(item.max_points),
            })
        })
        .collect();

    RawAnalysis {
        sentiment: "Positive".to_string(),
        urgency: "Low".to_string(),
        escalation_risk: json!(0.2),
        scores,
        rationale: BTreeMap::new(),
    }
}

#[tokio::test]
async fn test_two_advances_take_a_call_to_scored() {
    let store = test_store().await;
    let dir = tempfile::tempdir().unwrap();
    let record = uploaded_with_audio(&store, &dir).await;
    let analyzer = StubAnalyzer { raw: perfect_raw() };

    let record = pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();
    assert_eq!(record.status, CallStatus::Analyzing);
    assert!(record
        .transcript
        .as_deref()
        .unwrap()
        .contains("billing discrepancy"));

    let record = pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();
    assert_eq!(record.status, CallStatus::Scored);

    let scores = record.scores.unwrap();
    assert_eq!(scores.total_points, 73.0);
    assert_eq!(scores.percentage, 1.0);
    assert_eq!(scores.compliance, ComplianceFlag::Clear);
    assert!(!scores.escalation_high);
}

#[tokio::test]
async fn test_transcription_outage_fails_the_record() {
    let store = test_store().await;
    let dir = tempfile::tempdir().unwrap();
    let record = uploaded_with_audio(&store, &dir).await;
    let analyzer = CountingAnalyzer::default();

    let record = pipeline::advance(&store, &FailingTranscriber, &analyzer, record.id)
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Failed);
    assert!(record
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("connection refused"));
    // The analysis collaborator was never consulted
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_audio_never_reaches_the_collaborator() {
    let store = test_store().await;
    let dir = tempfile::tempdir().unwrap();
    let record = uploaded_with_audio(&store, &dir).await;

    // Real client against an unroutable endpoint: a network attempt
    // would fail with a different error than the size rejection
    let transcriber =
        TranscriptionClient::new("http://127.0.0.1:1/v1/transcribe".to_string(), None, 4).unwrap();
    let analyzer = CountingAnalyzer::default();

    let record = pipeline::advance(&store, &transcriber, &analyzer, record.id)
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Failed);
    assert!(record
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("Payload too large"));
}

#[tokio::test]
async fn test_rejected_analysis_payload_fails_the_record() {
    let store = test_store().await;
    let dir = tempfile::tempdir().unwrap();
    let record = uploaded_with_audio(&store, &dir).await;

    let mut raw = perfect_raw();
    raw.sentiment = "Furious".to_string();
    let analyzer = StubAnalyzer { raw };

    pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();
    let record = pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Failed);
    assert!(record
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("invalid enum value"));
    assert!(record.scores.is_none());
}

#[tokio::test]
async fn test_analysis_outage_fails_the_record() {
    let store = test_store().await;
    let dir = tempfile::tempdir().unwrap();
    let record = uploaded_with_audio(&store, &dir).await;
    let analyzer = StubAnalyzer { raw: perfect_raw() };

    pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();
    let record = pipeline::advance(&store, &StubTranscriber, &FailingAnalyzer, record.id)
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Failed);
    assert!(record.failure_reason.as_deref().unwrap().contains("timeout"));
}

#[tokio::test]
async fn test_missing_audio_fails_the_record() {
    let store = test_store().await;
    let record = store
        .create(CallRecord::new("call.mp3".to_string(), None))
        .await
        .unwrap();
    let analyzer = StubAnalyzer { raw: perfect_raw() };

    let record = pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Failed);
    assert!(record
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("no audio"));
}

#[tokio::test]
async fn test_terminal_records_cannot_advance() {
    let store = test_store().await;
    let dir = tempfile::tempdir().unwrap();
    let record = uploaded_with_audio(&store, &dir).await;
    let analyzer = StubAnalyzer { raw: perfect_raw() };

    pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();
    pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap();

    // Scored is terminal
    let err = pipeline::advance(&store, &StubTranscriber, &analyzer, record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::State(_)));
}
