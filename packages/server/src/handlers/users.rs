use axum::{
    Json,
    extract::{Path, Query, State},
};
use portal_common::UserRole;
use portal_common::validation::normalize_email;
use serde_json::{Map, json};
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{ApiResponse, MessageResponse};
use crate::models::users::{
    ListUsersQuery, SetRoleRequest, UserListResponse, validate_set_role_request,
};
use crate::state::AppState;
use crate::store::paths;

const DEFAULT_PAGE_SIZE: u64 = 100;

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List identity users",
    description = "Pages through every account in uid order. Pass the returned `next_page_token` to get the following page. Requires the `admin` role.",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = ApiResponse<UserListResponse>),
        (status = 400, description = "Invalid page size or token", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Forbidden, missing required authorization role", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(email = %auth_user.email))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<UserListResponse>>, AppError> {
    auth_user.require_any_role(&[UserRole::Admin])?;

    let page = state
        .identity
        .list_users(
            query.max_results.unwrap_or(DEFAULT_PAGE_SIZE),
            query.page_token.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::new(page.into())))
}

/// Assign a role by writing the user's role document.
///
/// The claim itself is mirrored asynchronously by the role-sync trigger, so
/// the target sees the new role on their next sign-in.
#[utoipa::path(
    put,
    path = "/{email}/role",
    tag = "Users",
    operation_id = "setUserRole",
    summary = "Assign a role to a user",
    params(("email" = String, Path, description = "Account email")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role document written", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Unknown role", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Forbidden, missing required authorization role", body = ErrorBody),
        (status = 404, description = "No user with that email", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(admin = %auth_user.email))]
pub async fn set_user_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
    AppJson(payload): AppJson<SetRoleRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    auth_user.require_any_role(&[UserRole::Admin])?;
    let role = validate_set_role_request(&payload)?;

    let email = normalize_email(&email);
    let user = state.identity.get_user_by_email(&email).await?;

    let mut doc = Map::new();
    doc.insert("role".into(), json!(role));
    state.store.merge(&paths::role(&user.email), doc).await?;

    info!(target_email = %user.email, %role, "Role document updated");
    Ok(Json(MessageResponse::new(format!(
        "Role for {} set to {}",
        user.email, role
    ))))
}
