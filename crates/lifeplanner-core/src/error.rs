//! Core error types for lifeplanner-core.
//!
//! The engines (`EntitlementService`, `AdThrottle`) never surface these to
//! their callers; they log and degrade per [`crate::policy`]. The errors
//! below are returned by the collaborators (storage, config, backend client)
//! and by the [`crate::planner::Planner`] composition.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lifeplanner-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend HTTP errors
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// A creation was refused by the current subscription tier
    #[error("{resource} limit reached ({limit} allowed on the current plan)")]
    LimitReached { resource: &'static str, limit: u32 },
}

/// Key-value persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// A stored value could not be decoded
    #[error("Corrupt value under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors from the LifePlanner REST backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection-level failure after retries were exhausted
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request exceeded its deadline
    #[error("Request timed out")]
    Timeout,

    /// 502/503 from the backend
    #[error("Service temporarily unavailable (HTTP {0})")]
    Unavailable(u16),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request body could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// Base URL or endpoint could not be composed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Failures reported by an ad presenter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    /// No ad could be loaded for display
    #[error("No ad available")]
    NotLoaded,

    /// The ad SDK reported an error
    #[error("Ad SDK error: {0}")]
    Sdk(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => match code.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    StorageError::Locked
                }
                _ => StorageError::QueryFailed(err.to_string()),
            },
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
