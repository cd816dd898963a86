//! Derived score structures produced by the scoring engine

use serde::{Deserialize, Serialize};

/// Compliance review flag derived from scores and escalation risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceFlag {
    /// No review condition triggered
    Clear,
    /// Critical Parameters below 60% of maximum, or escalation risk high
    Review,
}

/// Per-category score summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,

    /// Sum of present item scores; missing items contribute zero
    pub points: f64,

    /// Full category maximum from the rubric
    pub max_points: u32,

    /// Sum of maxima over present items only; the percentage denominator
    pub present_max: u32,

    /// points / present_max, two decimals; `None` when no items present
    pub percentage: Option<f64>,
}

/// Complete derived scores for one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallScores {
    /// Categories in fixed rubric order
    pub categories: Vec<CategoryScore>,

    /// Grand total across categories
    pub total_points: f64,

    /// Fixed rubric maximum (73)
    pub max_points: u32,

    /// total_points / max_points as a fraction in [0.0, 1.0], two decimals
    pub percentage: f64,

    /// Escalation risk at or above the 0.7 threshold
    pub escalation_high: bool,

    pub compliance: ComplianceFlag,
}
