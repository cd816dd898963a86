//! Dashboard aggregation
//!
//! Pure computation from a set of call records to the dashboard
//! snapshot. Averages over an empty selection are absent rather than
//! zero: "no data" and "scored zero" are different facts. Label
//! distributions are zero-filled so every known label always appears,
//! and daily trends cover every day in the observed range, gaps
//! included.

use callqa_common::rubric::Rubric;
use callqa_common::types::{CallStatus, Sentiment, Urgency};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::models::{
    AgentPerformance, AggregateSnapshot, CallRecord, CategoryAverage, DailyBucket, HistogramBucket,
    LabelCount,
};
use crate::services::scoring::round2;

/// Number of buckets in the escalation risk histogram
pub const RISK_HISTOGRAM_BUCKETS: usize = 10;

/// Compute the full dashboard snapshot
pub fn compute(records: &[CallRecord]) -> AggregateSnapshot {
    let scored: Vec<&CallRecord> = records
        .iter()
        .filter(|r| r.status == CallStatus::Scored)
        .collect();

    AggregateSnapshot {
        total_calls: records.len() as u64,
        average_score: mean(scored.iter().filter_map(|r| r.scores.as_ref()).map(|s| s.percentage)),
        sentiment_distribution: sentiment_distribution(&scored),
        urgency_distribution: urgency_distribution(&scored),
        agent_performance: agent_performance(&scored),
        daily_trends: daily_trends(records),
        category_scores: category_scores(&scored),
        escalation_risk_histogram: risk_histogram(&scored),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u64;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(round2(sum / count as f64))
    }
}

fn sentiment_distribution(scored: &[&CallRecord]) -> Vec<LabelCount> {
    Sentiment::ALL
        .iter()
        .map(|label| LabelCount {
            label: label.to_string(),
            count: scored
                .iter()
                .filter(|r| r.analysis.as_ref().is_some_and(|a| a.sentiment == *label))
                .count() as u64,
        })
        .collect()
}

fn urgency_distribution(scored: &[&CallRecord]) -> Vec<LabelCount> {
    Urgency::ALL
        .iter()
        .map(|label| LabelCount {
            label: label.to_string(),
            count: scored
                .iter()
                .filter(|r| r.analysis.as_ref().is_some_and(|a| a.urgency == *label))
                .count() as u64,
        })
        .collect()
}

/// Per-agent averages over scored calls, best performers first
fn agent_performance(scored: &[&CallRecord]) -> Vec<AgentPerformance> {
    let mut by_agent: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in scored {
        if let (Some(agent_id), Some(scores)) = (record.agent_id.as_deref(), record.scores.as_ref())
        {
            by_agent.entry(agent_id).or_default().push(scores.percentage);
        }
    }

    let mut performance: Vec<AgentPerformance> = by_agent
        .into_iter()
        .map(|(agent_id, percentages)| AgentPerformance {
            agent_id: agent_id.to_string(),
            average_score: round2(percentages.iter().sum::<f64>() / percentages.len() as f64),
            call_count: percentages.len() as u64,
        })
        .collect();

    // Descending by score; the BTreeMap already ordered ties by agent id
    performance.sort_by(|a, b| {
        b.average_score
            .partial_cmp(&a.average_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    performance
}

/// Daily call volume and average score over the observed date range
///
/// Counts cover every record regardless of status; averages only exist
/// where the day has scored calls. Days with no calls still appear.
fn daily_trends(records: &[CallRecord]) -> Vec<DailyBucket> {
    let mut by_day: BTreeMap<NaiveDate, (u64, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let day = record.created_at.date_naive();
        let entry = by_day.entry(day).or_default();
        entry.0 += 1;
        if record.status == CallStatus::Scored {
            if let Some(scores) = &record.scores {
                entry.1.push(scores.percentage);
            }
        }
    }

    let (Some(&first), Some(&last)) = (by_day.keys().next(), by_day.keys().next_back()) else {
        return Vec::new();
    };

    let mut trends = Vec::new();
    let mut day = first;
    while day <= last {
        let (call_count, percentages) = by_day.get(&day).cloned().unwrap_or_default();
        trends.push(DailyBucket {
            date: day,
            call_count,
            average_score: mean(percentages.into_iter()),
        });
        day += Duration::days(1);
    }
    trends
}

/// Mean category percentage across scored calls, in rubric order
///
/// A call whose category had no scored items contributes nothing to
/// that category's mean.
fn category_scores(scored: &[&CallRecord]) -> Vec<CategoryAverage> {
    Rubric::get()
        .categories()
        .iter()
        .map(|category| CategoryAverage {
            category: category.name.to_string(),
            average_percentage: mean(
                scored
                    .iter()
                    .filter_map(|r| r.scores.as_ref())
                    .flat_map(|s| &s.categories)
                    .filter(|c| c.name == category.name)
                    .filter_map(|c| c.percentage),
            ),
        })
        .collect()
}

/// Ten equal-width escalation risk buckets over [0, 1]
///
/// Risk 1.0 lands in the last bucket rather than an eleventh.
fn risk_histogram(scored: &[&CallRecord]) -> Vec<HistogramBucket> {
    let mut counts = [0u64; RISK_HISTOGRAM_BUCKETS];
    for record in scored {
        if let Some(analysis) = &record.analysis {
            let index =
                ((analysis.escalation_risk * RISK_HISTOGRAM_BUCKETS as f64) as usize)
                    .min(RISK_HISTOGRAM_BUCKETS - 1);
            counts[index] += 1;
        }
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBucket {
            lower: i as f64 / RISK_HISTOGRAM_BUCKETS as f64,
            upper: (i + 1) as f64 / RISK_HISTOGRAM_BUCKETS as f64,
            count,
        })
        .collect()
}
