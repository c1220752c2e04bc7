use axum::{Json, extract::State, http::StatusCode};
use portal_common::UserRole;
use portal_common::statistics::{AggregationOptions, ChartStatistics};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::shared::ApiResponse;
use crate::state::AppState;
use crate::statistics;

#[utoipa::path(
    post,
    path = "/generate",
    tag = "Statistics",
    operation_id = "generateStatistics",
    summary = "Recompute the statistics snapshots",
    description = "Aggregates every submitted application into the raw and chart snapshots, overwriting both. Nothing is written if any read fails. Requires the `admin` role.",
    responses(
        (status = 201, description = "Snapshots written", body = ApiResponse<ChartStatistics>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Forbidden, missing required authorization role", body = ErrorBody),
        (status = 500, description = "Aggregation failed, nothing persisted", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn generate_statistics(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<ChartStatistics>>), AppError> {
    auth_user.require_any_role(&[UserRole::Admin])?;

    let options = AggregationOptions {
        host_institution: state.config.statistics.host_institution.clone(),
    };
    let chart = statistics::generate(state.store.as_ref(), &options).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(chart))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Statistics",
    operation_id = "getStatistics",
    summary = "Get the latest chart snapshot",
    description = "Returns the chart snapshot written by the last generation run, including its `_last_computed` timestamp. Requires the `admin` or `judge` role.",
    responses(
        (status = 200, description = "Chart snapshot", body = ApiResponse<ChartStatistics>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Forbidden, missing required authorization role", body = ErrorBody),
        (status = 404, description = "Statistics have not been generated", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn get_statistics(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Map<String, Value>>>, AppError> {
    auth_user.require_any_role(&[UserRole::Admin, UserRole::Judge])?;

    let chart = statistics::load_chart(state.store.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Statistics have not been generated yet".into()))?;

    Ok(Json(ApiResponse::new(chart)))
}
