//! Call record store
//!
//! Sole owner of call record lifetime: create, transition, delete. Every
//! transition is validated against the state machine and serialized per
//! record id, so at most one transition is in flight per record while
//! unrelated records proceed concurrently.

use callqa_common::types::CallStatus;
use callqa_common::{Error, Result};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::calls;
use crate::models::{CallFilter, CallRecord, CallScores, NormalizedAnalysis};

/// Payload accompanying a state transition
///
/// The payload determines the target status, so a transcript can only
/// enter with `Analyzing` and scores can only enter with `Scored`.
#[derive(Debug)]
pub enum TransitionPayload {
    /// Mark the transcription stage as in flight
    Transcribing,
    /// Attach the completed transcript and enter Analyzing
    Analyzing { transcript: String },
    /// Attach the normalized analysis and derived scores; terminal
    Scored {
        analysis: NormalizedAnalysis,
        scores: CallScores,
    },
    /// Record the failure reason; terminal
    Failed { reason: String },
}

impl TransitionPayload {
    fn target(&self) -> CallStatus {
        match self {
            TransitionPayload::Transcribing => CallStatus::Transcribing,
            TransitionPayload::Analyzing { .. } => CallStatus::Analyzing,
            TransitionPayload::Scored { .. } => CallStatus::Scored,
            TransitionPayload::Failed { .. } => CallStatus::Failed,
        }
    }
}

/// SQLite-backed call record store with per-id transition locks
#[derive(Clone)]
pub struct CallStore {
    pool: SqlitePool,
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl CallStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persist a freshly created record (status Uploaded)
    pub async fn create(&self, record: CallRecord) -> Result<CallRecord> {
        if record.status != CallStatus::Uploaded {
            return Err(Error::State(format!(
                "new records must start Uploaded, got {}",
                record.status
            )));
        }

        calls::insert_call(&self.pool, &record).await?;

        tracing::info!(
            call_id = %record.id,
            filename = %record.filename,
            "Call record created"
        );
        Ok(record)
    }

    /// Load one record
    pub async fn get(&self, id: Uuid) -> Result<CallRecord> {
        calls::load_call(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("call record: {id}")))
    }

    /// Records matching the filter, in creation order
    pub async fn list(&self, filter: &CallFilter) -> Result<Vec<CallRecord>> {
        calls::list_calls(&self.pool, filter).await
    }

    /// Remove a record in any status (administrative override, not a
    /// state-machine transition); returns the removed record
    ///
    /// Takes the id lock so a removal cannot interleave with an
    /// in-flight transition on the same record.
    pub async fn delete(&self, id: Uuid) -> Result<CallRecord> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let record = self.get(id).await?;
        calls::delete_call(&self.pool, id).await?;
        self.locks.lock().await.remove(&id);

        tracing::info!(call_id = %id, status = %record.status, "Call record deleted");
        Ok(record)
    }

    /// Apply one state transition under the record's id lock
    ///
    /// Fails with `InvalidStateTransition` on any disallowed edge,
    /// including every edge out of a terminal state.
    pub async fn transition(&self, id: Uuid, payload: TransitionPayload) -> Result<CallRecord> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut record = self.get(id).await?;
        let target = payload.target();

        if !record.status.can_transition_to(target) {
            return Err(Error::InvalidStateTransition {
                from: record.status,
                to: target,
            });
        }

        let old_status = record.status;
        match payload {
            TransitionPayload::Transcribing => {}
            TransitionPayload::Analyzing { transcript } => {
                record.transcript = Some(transcript);
            }
            TransitionPayload::Scored { analysis, scores } => {
                record.analysis = Some(analysis);
                record.scores = Some(scores);
            }
            TransitionPayload::Failed { reason } => {
                record.failure_reason = Some(reason);
            }
        }
        record.status = target;
        record.updated_at = Utc::now();

        calls::update_call(&self.pool, &record).await?;

        if target.is_terminal() {
            // No further transitions can take this lock
            self.locks.lock().await.remove(&id);
        }

        tracing::info!(
            call_id = %id,
            old_status = %old_status,
            new_status = %target,
            "Call record transitioned"
        );
        Ok(record)
    }

    /// Force-fail non-terminal records with no progress within the
    /// threshold; an orphaned record is a leak the store guards against
    pub async fn fail_stale(&self, stale_after: Duration) -> Result<Vec<Uuid>> {
        let cutoff = Utc::now() - stale_after;
        let stale = calls::load_stale(&self.pool, cutoff).await?;

        let mut failed = Vec::new();
        for record in stale {
            let reason = format!(
                "no progress within {}s while {}",
                stale_after.num_seconds(),
                record.status
            );
            match self
                .transition(record.id, TransitionPayload::Failed { reason })
                .await
            {
                Ok(_) => failed.push(record.id),
                // A racing transition finished first; nothing to reap
                Err(Error::InvalidStateTransition { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        if !failed.is_empty() {
            tracing::warn!(count = failed.len(), "Force-failed stale call records");
        }
        Ok(failed)
    }

    async fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id).or_default().clone()
    }
}

/// Periodic staleness reaper, spawned at startup
pub async fn run_stale_reaper(store: CallStore, stale_after_seconds: u64) {
    let stale_after = Duration::seconds(stale_after_seconds as i64);
    let interval_secs = (stale_after_seconds / 4).max(30);
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;
        if let Err(e) = store.fail_stale(stale_after).await {
            tracing::error!(error = %e, "Stale record reaper pass failed");
        }
    }
}
