use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use mshmap_core::{CityStats, Gap, Insight, RegionOverview, Severity};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GapsQuery {
    pub severity: Option<String>,
}

pub(super) async fn get_overview(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RegionOverview>>, ApiError> {
    let overview = state
        .store
        .read_region_overview()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                "region overview has not been computed yet",
            )
        })?;

    Ok(Json(ApiResponse {
        data: overview,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_cities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CityStats>>>, ApiError> {
    let data = state
        .store
        .list_city_stats()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_gaps(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GapsQuery>,
) -> Result<Json<ApiResponse<Vec<Gap>>>, ApiError> {
    let severity = query
        .severity
        .as_deref()
        .map(str::parse::<Severity>)
        .transpose()
        .map_err(|reason| ApiError::new(req_id.0.clone(), "validation_error", reason))?;

    let mut data = state
        .store
        .list_gaps()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    if let Some(severity) = severity {
        data.retain(|gap| gap.severity == severity);
    }

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Insight>>>, ApiError> {
    let data = state
        .store
        .list_insights()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
