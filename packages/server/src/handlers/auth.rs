use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{LoginRequest, LoginResponse, MeResponse, validate_login_request};
use crate::models::shared::{ApiResponse, MessageResponse};
use crate::state::AppState;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/test",
    tag = "Auth",
    operation_id = "authTest",
    summary = "Check that the API is reachable",
    responses(
        (status = 200, description = "API is up", body = ApiResponse<MessageResponse>),
    ),
)]
pub async fn test() -> Json<ApiResponse<MessageResponse>> {
    Json(MessageResponse::new("Hello from the application portal!"))
}

/// Probe that only succeeds with a valid bearer token.
#[utoipa::path(
    get,
    path = "/test-authenticated",
    tag = "Auth",
    operation_id = "authTestAuthenticated",
    summary = "Check that a bearer token is accepted",
    responses(
        (status = 200, description = "Token accepted", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(email = %auth_user.email))]
pub async fn test_authenticated(auth_user: AuthUser) -> Json<ApiResponse<MessageResponse>> {
    Json(MessageResponse::new(format!(
        "Hello {}, you are authenticated",
        auth_user.email
    )))
}

/// Handle password sign-in.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Sign in with email and password",
    description = "Returns a bearer token carrying the user's current role claim. Tokens issued before a role change keep the old role until the user signs in again.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    validate_login_request(&payload)?;

    let signed_in = state
        .identity
        .sign_in_with_password(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::new(LoginResponse {
        token: signed_in.token,
        expires_at: signed_in.expires_at,
        user: signed_in.user,
    })))
}

/// Return the current authenticated user's identity.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get the identity attached to the bearer token",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<MeResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(uid = %auth_user.uid))]
pub async fn me(auth_user: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::new(MeResponse {
        uid: auth_user.uid,
        email: auth_user.email,
        role: auth_user.role,
        dev_override: auth_user.dev_override,
    }))
}
