//! Error types for the besluit-publicatie service.
//!
//! Library crates use [`PublicatieError`] via `thiserror`.
//! The publisher binary wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all publication operations.
#[derive(Debug, thiserror::Error)]
pub enum PublicatieError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// RDFa parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// No `besluit:Zitting`-typed subject was found in the snippet.
    /// Every derived entity depends on session linkage, so this aborts the run.
    #[error("no session (besluit:Zitting) found in published snippet")]
    MissingSession,

    /// Triple store query/update error.
    #[error("store error: {0}")]
    Store(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unserializable triple, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PublicatieError>;

impl PublicatieError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

    /// Whether a later retry of the whole resource could succeed.
    ///
    /// Store and I/O failures are transient; everything else is a data
    /// anomaly that will reproduce on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Io { .. })
    }
}
