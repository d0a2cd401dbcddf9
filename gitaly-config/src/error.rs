//! Error types for the gitaly-config library.
//!
//! This module provides the error hierarchy for settings loading, resolution,
//! rendering and lifecycle execution, using `thiserror` for ergonomic error
//! handling.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a gitaly-config error.
///
/// # Examples
///
/// ```
/// use gitaly_config::{Error, Result};
///
/// fn example_operation() -> Result<String> {
///     Ok("/var/opt/gitlab/gitaly/gitaly.socket".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the gitaly-config library.
///
/// Resolution and rendering errors are local: callers surface them as a
/// failed configuration apply and nothing is written to disk.
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting has neither a user value nor a default.
    #[error("missing configuration: '{field}' has no value and no default")]
    MissingConfiguration {
        /// Dotted settings path of the missing field.
        field: String,
    },

    /// The resolved configuration is internally inconsistent.
    #[error("configuration conflict: {details}")]
    ConfigConflict {
        /// Details about the conflict.
        details: String,
    },

    /// A setting has the wrong shape or an invalid value.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// A settings document could not be parsed.
    #[error("settings error: {0}")]
    Settings(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if error is a configuration conflict.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitaly_config::Error;
    ///
    /// let err = Error::ConfigConflict { details: "duplicate storage 'default'".into() };
    /// assert!(err.is_conflict());
    /// ```
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConfigConflict { .. })
    }

    /// Check if error indicates a required setting is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitaly_config::Error;
    ///
    /// let err = Error::MissingConfiguration { field: "gitaly.socket_path".into() };
    /// assert!(err.is_missing());
    /// ```
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingConfiguration { .. })
    }

    /// Shorthand for a [`Error::Validation`] error.
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
