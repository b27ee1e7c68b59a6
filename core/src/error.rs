//! Error types for the DNS views client.
//!
//! # Design
//! `ViewExists` and `ViewMissing` are sentinels: callers match on them to
//! tell "already there" and "not there" apart from other failures. Every
//! other non-2xx response lands in `Http` with the status and the server's
//! message for debugging.

use crate::uri::UriError;

/// Errors returned by `DnsViewClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Create was refused with 409.
    #[error("DNS view already exists")]
    ViewExists,

    /// The view (or a view named in a preference map) does not exist.
    #[error("DNS view not found")]
    ViewMissing,

    /// The server returned a non-2xx status with no dedicated sentinel.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A path segment (usually a view name) does not form a valid URI.
    #[error("invalid request path: {0}")]
    InvalidPath(#[from] UriError),
}
