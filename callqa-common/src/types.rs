//! Core enums shared across CallQA services
//!
//! Call records progress through a strict linear state machine:
//! Uploaded → Transcribing → Analyzing → Scored, with Failed reachable
//! from any non-terminal state. Scored and Failed are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Customer sentiment label as produced by the AI analysis
///
/// Unrecognized labels never default; parsing is strict so a schema
/// mismatch surfaces as a normalization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    /// All labels in fixed display order (keeps chart axes stable)
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Negative,
        Sentiment::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
            Sentiment::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(Sentiment::Positive),
            "Neutral" => Ok(Sentiment::Neutral),
            "Negative" => Ok(Sentiment::Negative),
            "Mixed" => Ok(Sentiment::Mixed),
            other => Err(format!("unrecognized sentiment label: {other:?}")),
        }
    }
}

/// Urgency level of the customer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// All levels in fixed display order
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Urgency::Low),
            "Medium" => Ok(Urgency::Medium),
            "High" => Ok(Urgency::High),
            other => Err(format!("unrecognized urgency label: {other:?}")),
        }
    }
}

/// Call record lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStatus {
    /// Audio received and validated, nothing processed yet
    Uploaded,
    /// Transcription collaborator call in flight
    Transcribing,
    /// Transcript present, AI analysis pending
    Analyzing,
    /// Analysis normalized and scored; record is immutable
    Scored,
    /// Processing failed; reason recorded, record is immutable
    Failed,
}

impl CallStatus {
    /// Explicit transition table for the state machine
    ///
    /// One-directional: no edge returns to an earlier state, and no edge
    /// leaves a terminal state.
    pub fn can_transition_to(self, next: CallStatus) -> bool {
        use CallStatus::*;
        matches!(
            (self, next),
            (Uploaded, Transcribing)
                | (Transcribing, Analyzing)
                | (Analyzing, Scored)
                | (Uploaded, Failed)
                | (Transcribing, Failed)
                | (Analyzing, Failed)
        )
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, CallStatus::Scored | CallStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Uploaded => "Uploaded",
            CallStatus::Transcribing => "Transcribing",
            CallStatus::Analyzing => "Analyzing",
            CallStatus::Scored => "Scored",
            CallStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Uploaded" => Ok(CallStatus::Uploaded),
            "Transcribing" => Ok(CallStatus::Transcribing),
            "Analyzing" => Ok(CallStatus::Analyzing),
            "Scored" => Ok(CallStatus::Scored),
            "Failed" => Ok(CallStatus::Failed),
            other => Err(format!("unrecognized call status: {other:?}")),
        }
    }
}
