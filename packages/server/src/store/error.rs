use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document does not exist (only raised by operations that require it).
    #[error("document not found: {0}")]
    NotFound(String),
    /// The path does not address a document (`collection/doc[/collection/doc...]`).
    #[error("invalid document path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
    /// Document body is not a JSON object, or does not match the expected shape.
    #[error("malformed document {path}: {message}")]
    Malformed { path: String, message: String },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}
