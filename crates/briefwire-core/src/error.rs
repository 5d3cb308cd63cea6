//! Briefwire error type.
//!
//! Only `Config` is fatal to a refresh run — a missing or unreadable rule/topic
//! source aborts before any generation happens. `Backend` errors are produced
//! by the live generation strategy and absorbed by the fallback chain; they
//! never reach a caller of the run pipeline.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BriefwireError>;

#[derive(Debug, Error)]
pub enum BriefwireError {
    /// Rule/topic/instruction source unreadable. Fatal to the whole run.
    #[error("Config error: {0}")]
    Config(String),

    /// Generation backend returned a non-success status or unusable body.
    #[error("Backend error: {0}")]
    Backend(String),

    /// HTTP transport failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// History log persistence failure.
    #[error("History error: {0}")]
    History(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
