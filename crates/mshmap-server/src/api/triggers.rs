use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use mshmap_analytics::{
    build_weekly_report, run_full_recalculation, RecalculationSummary, ReportSummary,
};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct TriggerResult<S: Serialize> {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub summary: S,
}

impl<S: Serialize> TriggerResult<S> {
    fn ok(message: &'static str, summary: S) -> Self {
        Self {
            success: true,
            message,
            timestamp: Utc::now(),
            summary,
        }
    }
}

pub(super) async fn recalculate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TriggerResult<RecalculationSummary>>>, ApiError> {
    tracing::info!(request_id = %req_id.0, "manual recalculation triggered");

    let summary = run_full_recalculation(state.store.as_ref(), &state.analytics)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "manual recalculation failed");
            ApiError::new(req_id.0.clone(), "internal_error", "recalculation failed")
        })?;

    Ok(Json(ApiResponse {
        data: TriggerResult::ok("Analytics recalculated successfully", summary),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn weekly_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TriggerResult<ReportSummary>>>, ApiError> {
    tracing::info!(request_id = %req_id.0, "manual weekly report triggered");

    let summary = build_weekly_report(state.store.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "weekly report failed");
            ApiError::new(req_id.0.clone(), "internal_error", "weekly report failed")
        })?;

    Ok(Json(ApiResponse {
        data: TriggerResult::ok("Weekly report generated", summary),
        meta: ResponseMeta::new(req_id.0),
    }))
}
