//! Error types of the notification bell.
//!
//! Per the bell's contract none of these reach the operator while it runs:
//! sources, storage and sound playback log their failures and carry on. They
//! exist so that each layer can report precisely what went wrong.

use cff_core::CoreError;
use thiserror::Error;

pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Persistence error during operation '{operation}': {source_message}{}", .source.as_ref().map(|s| format!(": {}", s)).unwrap_or_default())]
    Persistence {
        operation: String,
        source_message: String,
        #[source]
        source: Option<CoreError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error ({transport}): {message}")]
    Transport {
        transport: &'static str,
        message: String,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Sound playback failed: {0}")]
    Playback(String),

    #[error("Internal error in notification bell: {0}")]
    Internal(String),
}

impl NotificationError {
    pub fn persistence(operation: impl Into<String>, message: impl Into<String>, source: CoreError) -> Self {
        NotificationError::Persistence {
            operation: operation.into(),
            source_message: message.into(),
            source: Some(source),
        }
    }

    pub fn persistence_error_no_source(operation: impl Into<String>, message: impl Into<String>) -> Self {
        NotificationError::Persistence {
            operation: operation.into(),
            source_message: message.into(),
            source: None,
        }
    }

    pub fn polling(message: impl Into<String>) -> Self {
        NotificationError::Transport { transport: "polling", message: message.into() }
    }

    pub fn push(message: impl Into<String>) -> Self {
        NotificationError::Transport { transport: "push", message: message.into() }
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::polling(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for NotificationError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        NotificationError::push(err.to_string())
    }
}
