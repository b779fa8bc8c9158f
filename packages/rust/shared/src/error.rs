//! Error types for the precall pipeline.
//!
//! Library crates use [`PrecallError`] via `thiserror`. Per the propagation
//! policy, most faults below the orchestrator are folded into inline values
//! (error strings, placeholder headlines, boolean store results); the
//! variants here cover the paths that do surface as `Err` plus the internal
//! faults components fold before returning.

use std::path::PathBuf;

/// Top-level error type for all precall operations.
#[derive(Debug, thiserror::Error)]
pub enum PrecallError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Request shape error — rejected before the pipeline starts.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Intelligence gathering produced no usable signal; the pipeline
    /// aborts before synthesis.
    #[error("intelligence error: {0}")]
    Intelligence(String),

    /// Network/HTTP error during a fetch or completion call.
    #[error("network error: {0}")]
    Network(String),

    /// JSON or content parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Completion backend error (API, quota, malformed reply).
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Lead or context store error.
    #[error("store error: {0}")]
    Store(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrecallError>;

impl PrecallError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
