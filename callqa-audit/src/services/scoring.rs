//! Deterministic call scoring
//!
//! Pure computation from a normalized analysis to the persisted score
//! card. Same input always produces the same output; no I/O, no clock,
//! no randomness.

use callqa_common::rubric::{Rubric, CRITICAL_PARAMETERS, TOTAL_MAX_POINTS};

use crate::models::{CallScores, CategoryScore, ComplianceFlag, NormalizedAnalysis};

/// Escalation risk at or above this value is treated as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Critical-parameter fraction below which a call is marked for review
pub const CRITICAL_REVIEW_FRACTION: f64 = 0.6;

/// Compute the score card for a normalized analysis
///
/// Missing items contribute zero points and are excluded from their
/// category's achievable maximum, so a category with no scored items has
/// no percentage at all rather than a misleading zero. The grand
/// percentage is always over the full rubric maximum; missing items
/// count against it.
pub fn score(analysis: &NormalizedAnalysis) -> CallScores {
    let mut categories = Vec::new();
    let mut total_points = 0.0;
    let mut critical_points = 0.0;

    for category in Rubric::get().categories() {
        let mut points = 0.0;
        let mut present_max = 0;

        for item in analysis.items.iter().filter(|i| i.category == category.name) {
            if let Some(score) = item.score {
                points += score;
                present_max += item.max_points;
            }
        }

        let percentage = if present_max > 0 {
            Some(round2(points / f64::from(present_max)))
        } else {
            None
        };

        total_points += points;
        if category.name == CRITICAL_PARAMETERS {
            critical_points = points;
        }

        categories.push(CategoryScore {
            name: category.name.to_string(),
            points,
            max_points: category.max_points,
            present_max,
            percentage,
        });
    }

    let escalation_high = analysis.escalation_risk >= HIGH_RISK_THRESHOLD;

    // Review threshold is against the full critical maximum, not the
    // present maximum: an unscored critical item is itself suspicious
    let critical_max = Rubric::get()
        .categories()
        .iter()
        .find(|c| c.name == CRITICAL_PARAMETERS)
        .map(|c| c.max_points)
        .unwrap_or(0);
    let critical_low = critical_points < CRITICAL_REVIEW_FRACTION * f64::from(critical_max);

    let compliance = if critical_low || escalation_high {
        ComplianceFlag::Review
    } else {
        ComplianceFlag::Clear
    };

    CallScores {
        categories,
        total_points,
        max_points: TOTAL_MAX_POINTS,
        percentage: round2(total_points / f64::from(TOTAL_MAX_POINTS)),
        escalation_high,
        compliance,
    }
}

/// Round to two decimal places, away from zero on ties
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
