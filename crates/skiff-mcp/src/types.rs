//! Tool parameter and response types for MCP tools.
//!
//! Parameter types use serde for deserialization and schemars for the
//! JSON Schema MCP clients see. Results serialize into the response
//! envelope: the success record, or `{"error": "..."}`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use skiff_core::{FileEntry, FileMetadata};

fn default_root() -> String {
    "/".to_string()
}

// ============================================================================
// Parameters
// ============================================================================

/// Parameters for listing files.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListFilesParams {
    /// The unique identifier for the sandbox session.
    pub session_id: String,

    /// The directory path to list files from (default: root directory).
    #[serde(default = "default_root")]
    pub path: String,
}

/// Parameters for reading a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// The unique identifier for the sandbox session.
    pub session_id: String,

    /// The path to the file to read.
    pub file_path: String,
}

/// Parameters for writing a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// The unique identifier for the sandbox session.
    pub session_id: String,

    /// The path to the file to write.
    pub file_path: String,

    /// The content to write to the file.
    pub content: String,
}

/// Parameters for uploading a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadFileParams {
    /// The unique identifier for the sandbox session.
    pub session_id: String,

    /// The name of the file to create.
    pub file_name: String,

    /// The content of the file.
    pub file_content: String,

    /// The directory where the file should be created (default: root directory).
    #[serde(default = "default_root")]
    pub destination_path: String,
}

/// Parameters for deleting a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFileParams {
    /// The unique identifier for the sandbox session.
    pub session_id: String,

    /// The path to the file to delete.
    pub file_path: String,
}

/// Parameters for getting file metadata.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetFileMetadataParams {
    /// The unique identifier for the sandbox session.
    pub session_id: String,

    /// The path to the file to get metadata for.
    pub file_path: String,
}

// ============================================================================
// Results
// ============================================================================

/// Result of listing files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListFilesResult {
    /// The listed directory, as requested.
    pub path: String,
    /// Entries in the directory.
    pub files: Vec<FileEntry>,
}

/// Result of reading a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadFileResult {
    /// The file that was read.
    pub path: String,
    /// File contents.
    pub content: String,
}

/// Result of an operation that only reports success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResult {
    /// The affected path.
    pub path: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Result of getting file metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadataResult {
    /// The inspected path.
    pub path: String,
    /// `is_dir` and `size`, nothing else.
    pub metadata: FileMetadata,
}

/// Error half of the envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    /// What went wrong.
    pub error: String,
}

/// Response envelope returned by every tool handler.
///
/// Serializes as the success record itself or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse<T> {
    Success(T),
    Failure(ErrorResult),
}

impl<T> ToolResponse<T> {
    /// Build a failure envelope.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(ErrorResult {
            error: error.into(),
        })
    }

    /// Check if this is a failure envelope.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Get the error message of a failure envelope.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(&e.error),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ToolResponse<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
