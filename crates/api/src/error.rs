//! Error types for the api crate.

use thiserror::Error;

/// API contract error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token does not consist of the three dot-separated JWT segments.
    #[error("malformed token: expected 3 segments, got {0}")]
    MalformedToken(usize),

    /// Token payload segment is not valid base64url.
    #[error("token payload is not valid base64url: {0}")]
    PayloadEncoding(String),

    /// Token payload is not the expected JSON claim set.
    #[error("token payload is not a valid claim set: {0}")]
    PayloadJson(String),
}

/// Result type alias for API contract operations.
pub type Result<T> = std::result::Result<T, ApiError>;
