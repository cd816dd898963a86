//! Raw and normalized AI analysis structures
//!
//! The raw payload is whatever the analysis collaborator produced; the
//! normalizer is the single chokepoint that converts it into the strictly
//! typed `NormalizedAnalysis` consumed by the scoring engine.

use callqa_common::types::{Sentiment, Urgency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw analysis payload as returned by the AI collaborator
///
/// Loosely typed on purpose: label and numeric fields are validated by the
/// normalizer, not by deserialization, so a schema mismatch produces a
/// named normalization failure instead of an opaque decode error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAnalysis {
    /// Sentiment label, validated against the known set
    pub sentiment: String,

    /// Urgency label, validated against the known set
    pub urgency: String,

    /// Escalation risk; expected numeric in [0.0, 1.0]
    pub escalation_risk: serde_json::Value,

    /// Per-question scores; items may be missing or carry junk values
    #[serde(default)]
    pub scores: Vec<RawItemScore>,

    /// Free-text rationale per category, kept verbatim for audit
    #[serde(default)]
    pub rationale: BTreeMap<String, String>,
}

/// One reported sub-item score
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawItemScore {
    pub category: String,
    pub question: String,
    pub score: serde_json::Value,
}

/// Validated, rubric-conformant analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAnalysis {
    pub sentiment: Sentiment,
    pub urgency: Urgency,

    /// Escalation risk clamped to [0.0, 1.0]
    pub escalation_risk: f64,

    /// Every rubric item in fixed evaluation order; absent items carry
    /// `score: None` rather than zero
    pub items: Vec<NormalizedItem>,

    /// Free-text rationale per category; opaque to scoring
    pub rationale: BTreeMap<String, String>,

    /// Range-violation flags raised while normalizing
    pub flags: Vec<NormalizationFlag>,
}

/// One rubric item with its validated score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub category: String,
    pub prompt: String,
    pub max_points: u32,

    /// `None` marks an item absent from the raw payload (missing, not zero)
    pub score: Option<f64>,
}

/// Tolerated numeric range violations, surfaced for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NormalizationFlag {
    /// Reported sub-item score was outside [0, max] and was clamped
    ScoreClamped {
        category: String,
        prompt: String,
        reported: f64,
        clamped_to: f64,
    },
    /// Reported escalation risk was outside [0.0, 1.0] and was clamped
    RiskClamped { reported: f64, clamped_to: f64 },
}
