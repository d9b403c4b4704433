//! Error types for msglist
//!
//! Store operations themselves never fail. These errors only cover the
//! edges: loading configuration and replay scripts.

use thiserror::Error;

/// Main error type for msglist operations that touch the outside world
#[derive(Error, Debug)]
pub enum MsgListError {
    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration values out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Replay script is structurally valid JSON but cannot be executed
    #[error("Invalid script: {0}")]
    InvalidScript(String),
}

/// Result type alias using MsgListError
pub type MsgListResult<T> = Result<T, MsgListError>;
