use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portal_common::ValidationIssue;
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;

use crate::identity::IdentityError;
use crate::store::StoreError;

/// Envelope returned by every endpoint on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "Forbidden, missing required authorization role")]
    pub error: String,
    /// Extra detail, e.g. `{"issues": [...]}` for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(Vec<ValidationIssue>),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    /// Validation failure on a single field.
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![ValidationIssue::new(path, message)])
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(issues) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Invalid request data".into(),
                    data: Some(json!({ "issues": issues })),
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "Unauthorized: missing bearer token".into(),
                    data: None,
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "Unauthorized: invalid or expired token".into(),
                    data: None,
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "Invalid email or password".into(),
                    data: None,
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error: "Forbidden, missing required authorization role".into(),
                    data: None,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: msg,
                    data: None,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: msg,
                    data: None,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error, could not complete request.".into(),
                        data: None,
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => AppError::NotFound(format!("Document '{path}' not found")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UserNotFound(who) => {
                AppError::NotFound(format!("No user found for '{who}'"))
            }
            IdentityError::EmailExists(email) => {
                AppError::Conflict(format!("An account already exists for '{email}'"))
            }
            IdentityError::PhoneNumberExists(_) => {
                AppError::Conflict("Phone number is already in use".into())
            }
            IdentityError::InvalidCredentials => AppError::InvalidCredentials,
            IdentityError::InvalidToken(detail) => {
                tracing::debug!("Rejected bearer token: {detail}");
                AppError::TokenInvalid
            }
            IdentityError::InvalidArgument { field, message } => AppError::invalid(field, message),
            IdentityError::ClaimsTooLarge { size, limit } => AppError::invalid(
                "claims",
                format!("Claims payload too large ({size} > {limit} characters)"),
            ),
            other => AppError::Internal(other.to_string()),
        }
    }
}
