//! REST API handlers for the funnel query surfaces.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use funnel_analytics::{
    aggregate_by, compute_funnel, crosstab, drilldown, monthly_trend, DrilldownQuery, Metric,
};
use funnel_core::{Dimension, FunnelError};
use funnel_scoring::{apply_profile_filter, rank_segments, ProfileSelection};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::state::AnalysisSession;

/// Drill-down depth the engine exposes: one primary axis plus up to two
/// narrowing axes.
pub const MAX_DRILLDOWN_AXES: usize = 3;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<AnalysisSession>,
    pub start_time: Instant,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    let message = message.into();
    warn!(error = %message, "Rejected analytics query");
    metrics::counter!("api.validation_errors").increment(1);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_query".to_string(),
            message,
        }),
    )
}

fn internal(err: FunnelError) -> ApiError {
    error!(error = %err, "Analytics query failed");
    metrics::counter!("api.errors").increment(1);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "query_failed".to_string(),
            message: err.to_string(),
        }),
    )
}

fn parse_dimension(raw: &str) -> Result<Dimension, ApiError> {
    Dimension::parse(raw)
        .ok_or_else(|| bad_request(format!("unknown dimension '{raw}'")))
}

#[derive(Serialize)]
struct DatasetInfo {
    generation: u64,
    rows: usize,
    loaded_at: DateTime<Utc>,
    period: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// GET /v1/funnel/overview — whole-table funnel plus monthly trend.
pub async fn funnel_overview(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    metrics::counter!("api.queries", "surface" => "overview").increment(1);
    let cached = state
        .session
        .cached_or("overview", |table| {
            let response = serde_json::json!({
                "dataset": DatasetInfo {
                    generation: table.generation(),
                    rows: table.len(),
                    loaded_at: table.loaded_at(),
                    period: table.date_range(),
                },
                "funnel": compute_funnel(table.rows()),
                "monthly": monthly_trend(table.rows()),
            });
            Ok(response)
        })
        .map_err(internal)?;
    Ok(Json((*cached).clone()))
}

#[derive(Deserialize)]
pub struct BreakdownParams {
    pub dimension: String,
}

/// GET /v1/funnel/breakdown — single-axis funnel table.
pub async fn funnel_breakdown(
    State(state): State<AppState>,
    Query(params): Query<BreakdownParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let dimension = parse_dimension(&params.dimension)?;
    metrics::counter!("api.queries", "surface" => "breakdown").increment(1);

    let query_key = format!("breakdown:{}", dimension.key());
    let cached = state
        .session
        .cached_or(&query_key, |table| {
            let response = serde_json::json!({
                "dimension": dimension.key(),
                "dimension_label": dimension.label(),
                "groups": aggregate_by(table.rows(), dimension),
            });
            Ok(response)
        })
        .map_err(internal)?;
    Ok(Json((*cached).clone()))
}

#[derive(Deserialize)]
pub struct PivotParams {
    pub x: String,
    pub y: String,
    pub metric: String,
}

/// GET /v1/funnel/pivot — two-axis cross tabulation of one metric.
pub async fn funnel_pivot(
    State(state): State<AppState>,
    Query(params): Query<PivotParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let dim_x = parse_dimension(&params.x)?;
    let dim_y = parse_dimension(&params.y)?;
    if dim_x == dim_y {
        return Err(bad_request("pivot axes must differ"));
    }
    let metric = Metric::parse(&params.metric)
        .ok_or_else(|| bad_request(format!("unknown metric '{}'", params.metric)))?;
    metrics::counter!("api.queries", "surface" => "pivot").increment(1);

    let query_key = format!("pivot:{}:{}:{}", dim_x.key(), dim_y.key(), metric.key());
    let cached = state
        .session
        .cached_or(&query_key, |table| {
            serde_json::to_value(crosstab(table.rows(), dim_x, dim_y, metric))
                .map_err(FunnelError::from)
        })
        .map_err(internal)?;
    Ok(Json((*cached).clone()))
}

/// POST /v1/funnel/drilldown — sequential multi-axis narrowing.
pub async fn funnel_drilldown(
    State(state): State<AppState>,
    Json(query): Json<DrilldownQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if query.axes.is_empty() || query.axes.len() > MAX_DRILLDOWN_AXES {
        return Err(bad_request(format!(
            "drill-down takes 1 to {MAX_DRILLDOWN_AXES} axes"
        )));
    }
    metrics::counter!("api.queries", "surface" => "drilldown").increment(1);

    let query_key = format!(
        "drilldown:{}",
        serde_json::to_string(&query).map_err(|e| internal(FunnelError::from(e)))?
    );
    let cached = state
        .session
        .cached_or(&query_key, |table| {
            serde_json::to_value(drilldown(table.rows(), &query)).map_err(FunnelError::from)
        })
        .map_err(internal)?;
    Ok(Json((*cached).clone()))
}

#[derive(Deserialize)]
pub struct RankingParams {
    pub limit: Option<usize>,
}

/// GET /v1/segments/ranking — all attribute-value segments ranked by
/// close rate.
pub async fn segment_ranking(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    metrics::counter!("api.queries", "surface" => "ranking").increment(1);
    let limit = params.limit.unwrap_or(usize::MAX);

    let cached = state
        .session
        .cached_or("ranking", |table| {
            serde_json::to_value(rank_segments(table)).map_err(FunnelError::from)
        })
        .map_err(internal)?;

    // Limit applies per request; the full ranking is what gets cached.
    let mut response = (*cached).clone();
    if let Some(items) = response.as_array_mut() {
        items.truncate(limit);
    }
    Ok(Json(response))
}

/// POST /v1/segments/profile — profile filter with delta vs. overall.
pub async fn segment_profile(
    State(state): State<AppState>,
    Json(selection): Json<ProfileSelection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    metrics::counter!("api.queries", "surface" => "profile").increment(1);

    // Canonical key: the selection map has no stable serialization order.
    let query_key = format!(
        "profile:{}",
        selection
            .canonical_key()
            .map_err(|e| internal(FunnelError::from(e)))?
    );
    let cached = state
        .session
        .cached_or(&query_key, |table| {
            serde_json::to_value(apply_profile_filter(table, &selection))
                .map_err(FunnelError::from)
        })
        .map_err(internal)?;
    Ok(Json((*cached).clone()))
}

/// GET /v1/dataset/quality — the normalizer's data-quality report.
pub async fn dataset_quality(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.session.quality();
    serde_json::to_value(&*report)
        .map(Json)
        .map_err(|e| internal(FunnelError::from(e)))
}

/// POST /v1/dataset/reload — reload the CSV and swap the snapshot.
pub async fn dataset_reload(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let summary = state.session.reload().map_err(internal)?;
    metrics::counter!("api.reloads").increment(1);
    serde_json::to_value(summary)
        .map(Json)
        .map_err(|e| internal(FunnelError::from(e)))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub rows: usize,
    pub generation: u64,
    pub uptime_secs: u64,
}

/// GET /health — health check with dataset summary.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let table = state.session.table();
    Json(HealthResponse {
        status: "healthy".to_string(),
        rows: table.len(),
        generation: table.generation(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — readiness probe. A session only exists once its dataset
/// has loaded, so a running server is always ready to serve queries.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probes_report_ok() {
        assert_eq!(readiness().await, StatusCode::OK);
        assert_eq!(liveness().await, StatusCode::OK);
    }
}
