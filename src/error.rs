//! Error types for catalog loading and the classification service.
//!
//! Lookup misses are never errors: queries return `Option` or an empty `Vec`.
//! Dropped records are counted on the catalog, not raised.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring a catalog into memory.
///
/// Local to the store: it is recorded as `LoadState::Failed` and returned from
/// `load`/`reload`, but never surfaces through the read-query API.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read mushroom data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch mushroom data: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to load mushroom data: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid data format: expected an array of mushrooms")]
    NotAnArray,

    #[error("Failed to parse mushroom data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure talking to the external classification service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport failure: refused connection, DNS, timeout.
    #[error("Cannot connect to classification service: {0}")]
    Connectivity(String),

    /// Non-2xx answer from the service.
    #[error("HTTP error! status: {status} - {body}")]
    Server { status: u16, body: String },

    /// 2xx answer whose body is neither `{predictions: [...]}` nor a bare array.
    #[error("Unexpected response format from server: {0}")]
    Format(String),

    /// Rejected locally before any request was sent.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

/// Coarse cause of a `ServiceError`, for consumers that pick an icon or retry hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    Connectivity,
    Server,
    Format,
    Upload,
}

impl ServiceError {
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            ServiceError::Connectivity(_) => ServiceErrorKind::Connectivity,
            ServiceError::Server { .. } => ServiceErrorKind::Server,
            ServiceError::Format(_) => ServiceErrorKind::Format,
            ServiceError::InvalidUpload(_) => ServiceErrorKind::Upload,
        }
    }

    /// Display-ready message, categorized by cause.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Connectivity(_) => {
                "Cannot connect to server. Please ensure the classification service is running."
                    .to_string()
            }
            ServiceError::Server { status, body } => {
                format!("HTTP error! status: {} - {}", status, body)
            }
            ServiceError::Format(_) => "Unexpected response format from server".to_string(),
            ServiceError::InvalidUpload(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Format(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Server {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ServiceError::Connectivity(err.to_string())
        }
    }
}
