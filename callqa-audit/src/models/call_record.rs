//! Call record: the central entity of the audit pipeline
//!
//! One record per uploaded call. Once the record reaches a terminal
//! status (Scored or Failed) it is immutable except for deletion.

use callqa_common::types::CallStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CallScores, NormalizedAnalysis};

/// One audited call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique record identifier
    pub id: Uuid,

    /// Creation timestamp; also the date bucket used by daily trends
    pub created_at: DateTime<Utc>,

    /// Original upload filename
    pub filename: String,

    /// Agent identifier; unknown agent is a valid state, not an error
    pub agent_id: Option<String>,

    /// Path of the stored audio payload, if still on disk
    pub audio_path: Option<String>,

    /// Current lifecycle state
    pub status: CallStatus,

    /// Transcript text; owned by the record once transcription completes
    pub transcript: Option<String>,

    /// Normalized AI analysis; present from Scored onward
    pub analysis: Option<NormalizedAnalysis>,

    /// Derived scores; present if and only if status is Scored
    pub scores: Option<CallScores>,

    /// Human-readable reason; populated only when status is Failed
    pub failure_reason: Option<String>,

    /// Last transition timestamp; staleness is measured from here
    pub updated_at: DateTime<Utc>,
}

impl CallRecord {
    /// Create a fresh record in status Uploaded
    pub fn new(filename: String, agent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            filename,
            agent_id,
            audio_path: None,
            status: CallStatus::Uploaded,
            transcript: None,
            analysis: None,
            scores: None,
            failure_reason: None,
            updated_at: now,
        }
    }
}

/// Optional selection filters for list and aggregation queries
///
/// All fields are conjunctive; `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct CallFilter {
    pub status: Option<CallStatus>,
    pub agent_id: Option<String>,
    /// Inclusive lower bound on the creation date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date
    pub to: Option<NaiveDate>,
}
