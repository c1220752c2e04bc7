use chrono::{DateTime, Utc};
use portal_common::UserRole;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::identity::UserRecord;

/// Request body for password sign-in.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "sammy@ucsc.edu")]
    pub email: String,
    #[schema(example = "bananaslug")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::invalid("email", "Email must not be empty"));
    }
    if payload.password.is_empty() {
        return Err(AppError::invalid("password", "Password must not be empty"));
    }
    Ok(())
}

/// Successful sign-in.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserRecord,
}

/// Identity attached to the caller's token.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub uid: String,
    #[schema(example = "sammy@ucsc.edu")]
    pub email: String,
    /// `null` until a role has been assigned.
    pub role: Option<UserRole>,
    /// Whether this is the configured development account.
    pub dev_override: bool,
}
