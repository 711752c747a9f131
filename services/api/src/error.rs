//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service, and the mapping from
//! pipeline and port failures to HTTP answers.

use axum::http::StatusCode;
use tracing::error;

use crate::config::ConfigError;
use postcraft_core::{PipelineError, PortError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The `(status, message)` pair handlers answer with.
pub type HandlerError = (StatusCode, String);

/// Validation failures answer 400 and pipeline failures 502, each with the
/// coarse message the user sees.
pub fn pipeline_failure(e: PipelineError) -> HandlerError {
    match e {
        PipelineError::InvalidInput(_)
        | PipelineError::InvalidVideoUrl
        | PipelineError::InvalidArticleUrl => (StatusCode::BAD_REQUEST, e.to_string()),
        PipelineError::GenerationFailed(ref source) => {
            error!(error = %source, "Content pipeline failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// Maps a row store failure for `what` to its HTTP answer.
pub fn port_failure(what: &str, e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(_) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        other => {
            error!("Failed on {}: {:?}", what, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process {}", what),
            )
        }
    }
}
