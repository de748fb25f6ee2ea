//! Error types for skiff-core.

use thiserror::Error;

/// Result type alias for skiff-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors returned by a [`FileInterface`](crate::FileInterface) backend.
///
/// Backends classify their native failures into these variants so callers
/// can tell a missing path from a permission problem without parsing
/// strings. `Unknown` carries the backend's message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
    /// The path does not exist in the sandbox.
    #[error("not found: {0}")]
    NotFound(String),

    /// The sandbox refused access to the path.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Transport or filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Anything the backend reported that does not fit the other variants.
    #[error("{0}")]
    Unknown(String),
}

impl From<reqwest::Error> for FileError {
    fn from(err: reqwest::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unknown(format!("invalid response body: {err}"))
    }
}

/// Errors that can occur while attaching to a sandbox.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Could not reach the sandbox control plane.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The control plane answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or error message
        message: String,
    },

    /// Backend configuration is incomplete.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// File operation failed.
    #[error(transparent)]
    File(#[from] FileError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Connection(err.to_string())
    }
}
