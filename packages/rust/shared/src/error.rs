//! Error types for dealscope.
//!
//! Library crates use [`DealscopeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all dealscope operations.
#[derive(Debug, thiserror::Error)]
pub enum DealscopeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during scraping or analysis.
    #[error("network error: {0}")]
    Network(String),

    /// HTML text extraction error.
    #[error("extract error: {message}")]
    Extract { message: String },

    /// Model output parsing error (no JSON found, invalid JSON).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The LLM endpoint could not be reached or kept failing; the retry
    /// budget is spent. Routes the pipeline into fallback mode.
    #[error("LLM unavailable after {attempts} attempts: {message}")]
    LlmUnavailable { attempts: u32, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (missing company identity, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DealscopeError>;

impl DealscopeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extract error from any displayable message.
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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
