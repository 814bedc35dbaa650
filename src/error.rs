use std::num::ParseIntError;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Invalid values in the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("{name} must be at most {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        max: u64,
    },
}

/// Failures reading or writing the published item files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize published items: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Rejections from the request queue. These map straight onto HTTP replies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Bad prompt")]
    BadPrompt,

    #[error("Request {0} not found")]
    NotFound(String),
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        match self {
            Self::BadPrompt => (StatusCode::BAD_REQUEST, "Bad prompt").into_response(),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "Request not found").into_response(),
        }
    }
}
