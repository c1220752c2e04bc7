use sea_orm::DbErr;
use thiserror::Error;

/// Errors returned by an [`super::IdentityProvider`].
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no user record for {0}")]
    UserNotFound(String),
    #[error("email already in use: {0}")]
    EmailExists(String),
    #[error("phone number already in use: {0}")]
    PhoneNumberExists(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid id token: {0}")]
    InvalidToken(String),
    #[error("invalid {field}: {message}")]
    InvalidArgument { field: String, message: String },
    #[error("custom claims payload is {size} characters, limit is {limit}")]
    ClaimsTooLarge { size: usize, limit: usize },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("{0}")]
    Internal(String),
}

impl IdentityError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        IdentityError::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
