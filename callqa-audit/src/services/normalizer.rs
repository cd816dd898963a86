//! Analysis normalizer
//!
//! Single chokepoint converting the AI collaborator's loosely shaped
//! payload into the strictly typed, rubric-conformant model. Hard schema
//! violations (unknown enum labels, non-numeric values) fail the whole
//! normalization; numeric range violations are AI-generation noise and
//! are clamped and flagged instead. Normalization never partially
//! succeeds.

use callqa_common::rubric::Rubric;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{NormalizationFlag, NormalizedAnalysis, NormalizedItem, RawAnalysis};

/// Hard normalization failures; each names the offending field
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Label outside the known set; never silently defaulted because a
    /// guessed sentiment would corrupt the audit trail
    #[error("invalid enum value for {field}: {value:?}")]
    InvalidEnumValue { field: &'static str, value: String },

    /// Escalation risk that is not a number
    #[error("invalid escalation risk value: {0}")]
    InvalidRiskValue(String),

    /// Sub-item score that is not a number
    #[error("invalid score value for {item:?}: {value}")]
    InvalidScoreValue { item: String, value: String },
}

/// Normalize a raw analysis payload against the rubric
///
/// Every rubric item appears in the output: with a validated, clamped
/// score when the payload reported one, or as an explicit missing marker
/// when it did not.
pub fn normalize(raw: &RawAnalysis) -> Result<NormalizedAnalysis, NormalizeError> {
    let sentiment = raw
        .sentiment
        .parse()
        .map_err(|_| NormalizeError::InvalidEnumValue {
            field: "sentiment",
            value: raw.sentiment.clone(),
        })?;

    let urgency = raw
        .urgency
        .parse()
        .map_err(|_| NormalizeError::InvalidEnumValue {
            field: "urgency",
            value: raw.urgency.clone(),
        })?;

    let mut flags = Vec::new();
    let escalation_risk = normalize_risk(&raw.escalation_risk, &mut flags)?;
    let items = normalize_items(raw, &mut flags)?;

    Ok(NormalizedAnalysis {
        sentiment,
        urgency,
        escalation_risk,
        items,
        rationale: raw.rationale.clone(),
        flags,
    })
}

fn normalize_risk(
    value: &serde_json::Value,
    flags: &mut Vec<NormalizationFlag>,
) -> Result<f64, NormalizeError> {
    let risk = as_number(value).ok_or_else(|| NormalizeError::InvalidRiskValue(value.to_string()))?;

    let clamped = risk.clamp(0.0, 1.0);
    if clamped != risk {
        flags.push(NormalizationFlag::RiskClamped {
            reported: risk,
            clamped_to: clamped,
        });
    }
    Ok(clamped)
}

fn normalize_items(
    raw: &RawAnalysis,
    flags: &mut Vec<NormalizationFlag>,
) -> Result<Vec<NormalizedItem>, NormalizeError> {
    // Index reported scores by (category, question); later duplicates win
    let mut reported: HashMap<(&str, &str), &serde_json::Value> = HashMap::new();
    for entry in &raw.scores {
        if Rubric::get().item(&entry.category, &entry.question).is_err() {
            // Stray items are generation noise; scoring is rubric-driven
            tracing::warn!(
                category = %entry.category,
                question = %entry.question,
                "Ignoring score for unknown rubric item"
            );
            continue;
        }
        reported.insert((entry.category.as_str(), entry.question.as_str()), &entry.score);
    }

    let mut items = Vec::new();
    for category in Rubric::get().categories() {
        for item in &category.items {
            let score = match reported.get(&(category.name, item.prompt)) {
                None => None,
                Some(value) => {
                    let raw_score =
                        as_number(value).ok_or_else(|| NormalizeError::InvalidScoreValue {
                            item: item.prompt.to_string(),
                            value: value.to_string(),
                        })?;

                    let clamped = raw_score.clamp(0.0, f64::from(item.max_points));
                    if clamped != raw_score {
                        flags.push(NormalizationFlag::ScoreClamped {
                            category: category.name.to_string(),
                            prompt: item.prompt.to_string(),
                            reported: raw_score,
                            clamped_to: clamped,
                        });
                    }
                    Some(clamped)
                }
            };

            items.push(NormalizedItem {
                category: category.name.to_string(),
                prompt: item.prompt.to_string(),
                max_points: item.max_points,
                score,
            });
        }
    }

    Ok(items)
}

/// Numeric JSON value, tolerating numbers carried as strings
fn as_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callqa_common::types::{Sentiment, Urgency};
    use serde_json::json;

    fn raw_with(scores: serde_json::Value) -> RawAnalysis {
        serde_json::from_value(json!({
            "sentiment": "Neutral",
            "urgency": "Medium",
            "escalation_risk": 0.25,
            "scores": scores,
            "rationale": {"Call Opening": "Greeted promptly."},
        }))
        .unwrap()
    }

    #[test]
    fn test_full_payload_normalizes() {
        let raw = raw_with(json!([
            {"category": "Call Opening", "question": "Did agent probe customer name before continuing?", "score": 3},
        ]));

        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.sentiment, Sentiment::Neutral);
        assert_eq!(normalized.urgency, Urgency::Medium);
        assert_eq!(normalized.escalation_risk, 0.25);
        assert!(normalized.flags.is_empty());

        // Every rubric item is present in order, scored or missing
        let item_count: usize = Rubric::get().categories().iter().map(|c| c.items.len()).sum();
        assert_eq!(normalized.items.len(), item_count);
        assert_eq!(normalized.items[0].score, Some(3.0));
        assert_eq!(normalized.items[1].score, None);
        assert_eq!(
            normalized.rationale.get("Call Opening").map(String::as_str),
            Some("Greeted promptly.")
        );
    }

    #[test]
    fn test_over_maximum_score_is_clamped_and_flagged() {
        // Item maximum is 10
        let raw = raw_with(json!([
            {"category": "Critical Parameters", "question": "Did agent NOT disconnect without warning?", "score": 15},
        ]));

        let normalized = normalize(&raw).unwrap();
        let item = normalized
            .items
            .iter()
            .find(|i| i.prompt == "Did agent NOT disconnect without warning?")
            .unwrap();
        assert_eq!(item.score, Some(10.0));
        assert!(normalized.flags.iter().any(|f| matches!(
            f,
            NormalizationFlag::ScoreClamped { reported, clamped_to, .. }
                if *reported == 15.0 && *clamped_to == 10.0
        )));
    }

    #[test]
    fn test_negative_score_clamps_to_zero() {
        let raw = raw_with(json!([
            {"category": "Call Closing", "question": "Did agent summarize the call properly?", "score": -3},
        ]));

        let normalized = normalize(&raw).unwrap();
        let item = normalized
            .items
            .iter()
            .find(|i| i.prompt == "Did agent summarize the call properly?")
            .unwrap();
        assert_eq!(item.score, Some(0.0));
    }

    #[test]
    fn test_unrecognized_sentiment_fails_loudly() {
        let mut raw = raw_with(json!([]));
        raw.sentiment = "Furious".to_string();

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::InvalidEnumValue { field: "sentiment", .. }
        ));
    }

    #[test]
    fn test_unrecognized_urgency_fails_loudly() {
        let mut raw = raw_with(json!([]));
        raw.urgency = "Critical".to_string();

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::InvalidEnumValue { field: "urgency", .. }
        ));
    }

    #[test]
    fn test_non_numeric_risk_fails() {
        let mut raw = raw_with(json!([]));
        raw.escalation_risk = json!("quite high");

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidRiskValue(_)));
    }

    #[test]
    fn test_out_of_range_risk_clamps_with_flag() {
        let mut raw = raw_with(json!([]));
        raw.escalation_risk = json!(1.4);

        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.escalation_risk, 1.0);
        assert!(normalized
            .flags
            .iter()
            .any(|f| matches!(f, NormalizationFlag::RiskClamped { .. })));
    }

    #[test]
    fn test_numeric_string_values_accepted() {
        let mut raw = raw_with(json!([
            {"category": "Call Opening", "question": "Did agent give opening within 5 seconds?", "score": "2"},
        ]));
        raw.escalation_risk = json!("0.5");

        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.escalation_risk, 0.5);
        let item = normalized
            .items
            .iter()
            .find(|i| i.prompt == "Did agent give opening within 5 seconds?")
            .unwrap();
        assert_eq!(item.score, Some(2.0));
    }

    #[test]
    fn test_non_numeric_item_score_fails() {
        let raw = raw_with(json!([
            {"category": "Call Opening", "question": "Did agent give opening within 5 seconds?", "score": true},
        ]));

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidScoreValue { .. }));
    }

    #[test]
    fn test_unknown_items_are_ignored() {
        let raw = raw_with(json!([
            {"category": "Vibes", "question": "Did agent have good vibes?", "score": 5},
            {"category": "Call Opening", "question": "Did agent probe customer name before continuing?", "score": 1},
        ]));

        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.items[0].score, Some(1.0));
        assert!(normalized.items.iter().all(|i| i.category != "Vibes"));
    }
}
