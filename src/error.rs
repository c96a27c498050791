//! Error types shared by the store, the branch service and the HTTP layer.

use std::collections::BTreeMap;

use thiserror::Error;

/// Field-level validation messages keyed by input path, e.g. `data.0.opens_at`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum AppError {
    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Could not obtain a pooled connection
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Malformed JSON payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rejected write, reported per field
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Unauthenticated")]
    Unauthorized,
}

pub type AppResult<T> = Result<T, AppError>;
