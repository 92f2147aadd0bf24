//! Error types for the generai-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.

use thiserror::Error;

/// The single failure kind a [`GenerationClient`](crate::client::GenerationClient)
/// reports.
///
/// Network failures, malformed responses and client-side errors all collapse
/// into this type. Its display form is the message verbatim, since that is
/// exactly what the user gets to see in the error state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationFailure {
    /// Human-readable description. May be empty when none is available.
    pub message: String,
}

impl GenerationFailure {
    /// Creates a failure with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur within the generai-core library.
///
/// Each variant represents a specific failure mode with contextual information
/// to help diagnose and handle errors appropriately.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing keys, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required environment variable was not found.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// The topic was empty or only whitespace.
    #[error("Topic must not be empty")]
    EmptyTopic,

    /// A tone, format or length name could not be parsed.
    #[error("Invalid {kind}: '{value}'")]
    InvalidOption {
        /// Which option was being parsed ("tone", "format", "length").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// No async runtime was available to run generation requests on.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// UI-related errors (rendering, window management).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }

    pub(crate) fn invalid_option(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidOption {
            kind,
            value: value.into(),
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
