//! HTTP API for callqa-audit

pub mod calls;
pub mod dashboard;
pub mod health;

pub use calls::call_routes;
pub use dashboard::dashboard_routes;
pub use health::health_routes;

use callqa_common::types::CallStatus;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::CallFilter;

/// Record selection query shared by the list and dashboard endpoints
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub status: Option<String>,
    pub agent_id: Option<String>,
    /// Inclusive creation date lower bound (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Inclusive creation date upper bound (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
}

impl FilterQuery {
    /// Validate the query into a typed filter
    pub fn into_filter(self) -> ApiResult<CallFilter> {
        let status = match self.status {
            None => None,
            Some(raw) => Some(
                raw.parse::<CallStatus>()
                    .map_err(ApiError::BadRequest)?,
            ),
        };

        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::BadRequest(format!(
                    "date range is inverted: {from} > {to}"
                )));
            }
        }

        Ok(CallFilter {
            status,
            agent_id: self.agent_id,
            from: self.from,
            to: self.to,
        })
    }
}
