//! Error handling for the core layer.
//!
//! This module provides the error types shared by every crate in the workspace.
//! They are defined with the `thiserror` crate for ergonomic error definition.
//!
//! The main error type is [`CoreError`], which wraps more specific errors like
//! [`ConfigError`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use cff_core::error::CoreError;
//!
//! fn do_something_risky() -> Result<(), CoreError> {
//!     // return Err(CoreError::Internal("Something went wrong".to_string()));
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for the admin tooling.
///
/// This enum represents all errors that can occur in the core layer. It is
/// designed to be used as a common error type throughout the workspace, often
/// by wrapping more specific error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    /// Wraps a [`ConfigError`].
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors that occur during the initialization of the logging system.
    #[error("Logging Initialization Failed: {0}")]
    LoggingInitialization(String),

    /// Errors related to filesystem operations, such as creating directories or
    /// writing files. Includes a message, the path involved, and the source I/O error.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not covered by other specific variants.
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors due to invalid input provided to a function or method.
    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    /// Catch-all for unexpected internal errors within the core library.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Error type for configuration-related operations.
///
/// Typically wrapped by [`CoreError::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An error occurred while attempting to read a configuration file.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error occurred while parsing a configuration file (e.g., invalid TOML).
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// An error occurred due to invalid configuration values after successful parsing.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A required base directory (e.g., XDG config/data home) could not be determined.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_core_error_config_variant() {
        let core_err = CoreError::Config(ConfigError::ValidationError("Test validation".to_string()));

        assert_eq!(
            format!("{}", core_err),
            "Configuration Error: Configuration validation failed: Test validation"
        );
        match core_err.source().unwrap().downcast_ref::<ConfigError>() {
            Some(ConfigError::ValidationError(msg)) => assert_eq!(msg, "Test validation"),
            _ => panic!("Incorrect source for CoreError::Config"),
        }
    }

    #[test]
    fn test_core_error_filesystem_variant() {
        let path = PathBuf::from("/tmp/cleared_notifications.json");
        let core_err = CoreError::Filesystem {
            message: "Failed to persist file".to_string(),
            path: path.clone(),
            source: IoError::new(ErrorKind::PermissionDenied, "denied"),
        };

        assert_eq!(
            format!("{}", core_err),
            format!("Filesystem Error: Failed to persist file (Path: {:?})", path)
        );
        assert_eq!(
            core_err.source().unwrap().downcast_ref::<IoError>().unwrap().kind(),
            ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_core_error_io_from() {
        let core_err: CoreError = IoError::new(ErrorKind::NotFound, "missing").into();
        assert_eq!(format!("{}", core_err), "I/O Error: missing");
    }

    #[test]
    fn test_config_error_parse_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("this is = = not toml").unwrap_err();
        let config_err: ConfigError = toml_err.into();
        assert!(format!("{}", config_err).starts_with("Failed to parse configuration file:"));
    }

    #[test]
    fn test_config_error_directory_unavailable() {
        let err = ConfigError::DirectoryUnavailable { dir_type: "App Data".to_string() };
        assert_eq!(format!("{}", err), "Could not determine base directory for App Data");
        assert!(err.source().is_none());
    }
}
