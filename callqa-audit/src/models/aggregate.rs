//! Dashboard aggregate snapshot
//!
//! Ephemeral: computed on demand over a point-in-time selection of call
//! records, never persisted or cached across record mutations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One label with its occurrence count; labels with zero count are kept so
/// chart axes stay stable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// Mean score and call volume for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPerformance {
    pub agent_id: String,
    /// Mean grand percentage over this agent's scored calls
    pub average_score: f64,
    pub call_count: u64,
}

/// One calendar-day bucket of the daily trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// All selected calls created on this date
    pub call_count: u64,
    /// Mean grand percentage over scored calls; `None` when none scored
    pub average_score: Option<f64>,
}

/// Mean per-category percentage across the selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverage {
    pub category: String,
    /// `None` when no scored call had data for this category
    pub average_percentage: Option<f64>,
}

/// One fixed-width escalation risk bucket over [0.0, 1.0]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Chart-ready dashboard metrics over a selection of call records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    /// Every selected record, scored or not
    pub total_calls: u64,

    /// Mean grand percentage across scored records; `None` means "no data",
    /// which downstream rendering must distinguish from a mean of zero
    pub average_score: Option<f64>,

    /// Counts per sentiment label, zero-filled, fixed order
    pub sentiment_distribution: Vec<LabelCount>,

    /// Counts per urgency level, zero-filled, fixed order
    pub urgency_distribution: Vec<LabelCount>,

    /// Per-agent means, descending by score; agentless calls excluded here
    pub agent_performance: Vec<AgentPerformance>,

    /// Calendar-ascending buckets with gap days zero-filled
    pub daily_trends: Vec<DailyBucket>,

    /// Mean category percentages in fixed rubric order
    pub category_scores: Vec<CategoryAverage>,

    /// Ten fixed-width buckets over [0.0, 1.0]; 1.0 lands in the last
    pub escalation_risk_histogram: Vec<HistogramBucket>,
}
