//! Dashboard endpoints
//!
//! Metrics are computed on demand from the matching records, so every
//! response reflects the store at request time. The chart endpoints
//! return slices of the same snapshot for dashboards that poll panels
//! independently.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::FilterQuery;
use crate::error::ApiResult;
use crate::models::{
    AgentPerformance, AggregateSnapshot, CategoryAverage, DailyBucket, HistogramBucket, LabelCount,
};
use crate::services::aggregator;
use crate::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/metrics", get(metrics))
        .route("/api/dashboard/charts/sentiment", get(sentiment_chart))
        .route(
            "/api/dashboard/charts/agent-performance",
            get(agent_performance_chart),
        )
        .route("/api/dashboard/charts/daily-trends", get(daily_trends_chart))
        .route(
            "/api/dashboard/charts/category-scores",
            get(category_scores_chart),
        )
        .route(
            "/api/dashboard/charts/urgency-distribution",
            get(urgency_distribution_chart),
        )
        .route(
            "/api/dashboard/charts/escalation-risk",
            get(escalation_risk_chart),
        )
}

async fn snapshot(state: &AppState, query: FilterQuery) -> ApiResult<AggregateSnapshot> {
    let filter = query.into_filter()?;
    let records = state.store.list(&filter).await?;
    Ok(aggregator::compute(&records))
}

/// GET /api/dashboard/metrics - the full aggregate snapshot
async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<AggregateSnapshot>> {
    Ok(Json(snapshot(&state, query).await?))
}

/// GET /api/dashboard/charts/sentiment
async fn sentiment_chart(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<LabelCount>>> {
    Ok(Json(snapshot(&state, query).await?.sentiment_distribution))
}

/// GET /api/dashboard/charts/agent-performance
async fn agent_performance_chart(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<AgentPerformance>>> {
    Ok(Json(snapshot(&state, query).await?.agent_performance))
}

/// GET /api/dashboard/charts/daily-trends
async fn daily_trends_chart(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<DailyBucket>>> {
    Ok(Json(snapshot(&state, query).await?.daily_trends))
}

/// GET /api/dashboard/charts/category-scores
async fn category_scores_chart(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<CategoryAverage>>> {
    Ok(Json(snapshot(&state, query).await?.category_scores))
}

/// GET /api/dashboard/charts/urgency-distribution
async fn urgency_distribution_chart(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<LabelCount>>> {
    Ok(Json(snapshot(&state, query).await?.urgency_distribution))
}

/// GET /api/dashboard/charts/escalation-risk
async fn escalation_risk_chart(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<HistogramBucket>>> {
    Ok(Json(snapshot(&state, query).await?.escalation_risk_histogram))
}
