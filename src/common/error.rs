use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy of a collage run.
///
/// Only `AssetMissing` is recovered locally (the member is skipped); every
/// other variant aborts the run.
#[derive(Debug, Error)]
pub enum CollageError {
    #[error("authentication rejected by the api: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("still rate limited after {0} cooldowns")]
    RateLimitExhausted(u32),

    #[error("malformed api response: {0}")]
    Malformed(String),

    #[error("avatar for member {member_id} is missing: {reason}")]
    AssetMissing { member_id: u64, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("i/o error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl CollageError {
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> CollageError {
        CollageError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
