use axum::{extract::FromRequestParts, http::request::Parts};
use portal_common::UserRole;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Role checks happen via `require_any_role()` in the handler body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    /// Role from the token's custom claims; `None` until the signup trigger has run.
    pub role: Option<UserRole>,
    /// The configured development account, which passes every role check.
    pub dev_override: bool,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.dev_override || self.role == Some(role)
    }

    /// Returns `Ok(())` if the user holds ANY of the given roles, `Err(PermissionDenied)` otherwise.
    pub fn require_any_role(&self, roles: &[UserRole]) -> Result<(), AppError> {
        if roles.iter().any(|role| self.has_role(*role)) {
            Ok(())
        } else {
            tracing::debug!(email = %self.email, role = ?self.role, "Missing required role");
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::TokenInvalid)?;

        let decoded = state.identity.verify_id_token(token).await?;

        let dev_override = state.config.auth.is_dev_override(&decoded.email);
        if dev_override {
            tracing::warn!(email = %decoded.email, "Development override account authenticated");
        }

        Ok(AuthUser {
            uid: decoded.uid,
            email: decoded.email,
            role: decoded.role,
            dev_override,
        })
    }
}
