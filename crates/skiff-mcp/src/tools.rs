//! File tool handlers.
//!
//! Every handler follows the same steps: resolve the session, call the
//! sandbox's file interface, and fold the outcome into a [`ToolResponse`].
//! Handlers never return an error to the caller; failures become
//! `{"error": "..."}` envelopes.

use crate::types::*;
use skiff_core::{FileError, Sandbox, SessionRegistry};
use std::sync::Arc;
use thiserror::Error;

/// Confirmation for `write_file`.
pub const WRITE_OK: &str = "File written successfully";

/// Confirmation for `upload_file`.
pub const UPLOAD_OK: &str = "File uploaded successfully";

/// Confirmation for `delete_file`.
pub const DELETE_OK: &str = "File deleted successfully";

/// Why a tool call failed. The `Display` text is what clients see.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No sandbox is registered under the session ID.
    #[error("No sandbox found with session ID: {0}. Create a sandbox first.")]
    SessionNotFound(String),

    /// The backend reported a failure.
    #[error("Error {action}: {source}")]
    Backend {
        /// What was being attempted, e.g. "writing file".
        action: &'static str,
        /// Backend failure.
        source: FileError,
    },
}

/// Join an upload directory and file name into an absolute path.
///
/// Joins like a POSIX path join: an absolute `file_name` replaces the
/// directory, otherwise a single `/` is inserted unless the directory is
/// empty or already ends with one. The result always starts with `/`.
/// Repeated separators already present are kept as-is.
pub fn upload_path(destination_path: &str, file_name: &str) -> String {
    let joined = if file_name.starts_with('/') {
        file_name.to_string()
    } else if destination_path.is_empty() || destination_path.ends_with('/') {
        format!("{destination_path}{file_name}")
    } else {
        format!("{destination_path}/{file_name}")
    };

    if joined.starts_with('/') {
        joined
    } else {
        format!("/{joined}")
    }
}

/// Handlers for the six file tools.
///
/// Reads sessions through a [`SessionRegistry`]; never modifies it.
#[derive(Clone)]
pub struct FileTools {
    registry: Arc<dyn SessionRegistry>,
}

impl FileTools {
    /// Create handlers over a session registry.
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    async fn session(&self, session_id: &str) -> Result<Arc<Sandbox>, ToolError> {
        match self.registry.get(session_id).await {
            Some(sandbox) => Ok(sandbox),
            None => {
                tracing::debug!(session_id = %session_id, "Unknown session");
                Err(ToolError::SessionNotFound(session_id.to_string()))
            }
        }
    }

    fn backend_error(
        session_id: &str,
        path: &str,
        action: &'static str,
        source: FileError,
    ) -> ToolError {
        tracing::error!(
            session_id = %session_id,
            path = %path,
            error = %source,
            "Error {} in sandbox",
            action
        );
        ToolError::Backend { action, source }
    }

    /// List files in the sandbox at `path`.
    pub async fn list_files(&self, session_id: &str, path: &str) -> ToolResponse<ListFilesResult> {
        self.try_list_files(session_id, path).await.into()
    }

    async fn try_list_files(
        &self,
        session_id: &str,
        path: &str,
    ) -> Result<ListFilesResult, ToolError> {
        let sandbox = self.session(session_id).await?;
        tracing::debug!(session_id = %session_id, sandbox = %sandbox, path = %path, "Listing files");

        let files = sandbox
            .files()
            .list(path)
            .await
            .map_err(|e| Self::backend_error(session_id, path, "listing files", e))?;

        Ok(ListFilesResult {
            path: path.to_string(),
            files,
        })
    }

    /// Read the contents of a file.
    pub async fn read_file(&self, session_id: &str, file_path: &str) -> ToolResponse<ReadFileResult> {
        self.try_read_file(session_id, file_path).await.into()
    }

    async fn try_read_file(
        &self,
        session_id: &str,
        file_path: &str,
    ) -> Result<ReadFileResult, ToolError> {
        let sandbox = self.session(session_id).await?;
        tracing::debug!(session_id = %session_id, sandbox = %sandbox, path = %file_path, "Reading file");

        let content = sandbox
            .files()
            .read(file_path)
            .await
            .map_err(|e| Self::backend_error(session_id, file_path, "reading file", e))?;

        Ok(ReadFileResult {
            path: file_path.to_string(),
            content,
        })
    }

    /// Write content to a file, replacing it if it exists.
    pub async fn write_file(
        &self,
        session_id: &str,
        file_path: &str,
        content: &str,
    ) -> ToolResponse<MessageResult> {
        self.try_write(session_id, file_path, content, "writing file", WRITE_OK)
            .await
            .into()
    }

    /// Create `file_name` under `destination_path` with the given content.
    pub async fn upload_file(
        &self,
        session_id: &str,
        file_name: &str,
        file_content: &str,
        destination_path: &str,
    ) -> ToolResponse<MessageResult> {
        let full_path = upload_path(destination_path, file_name);
        self.try_write(session_id, &full_path, file_content, "uploading file", UPLOAD_OK)
            .await
            .into()
    }

    async fn try_write(
        &self,
        session_id: &str,
        path: &str,
        content: &str,
        action: &'static str,
        message: &str,
    ) -> Result<MessageResult, ToolError> {
        let sandbox = self.session(session_id).await?;
        tracing::info!(
            session_id = %session_id,
            sandbox = %sandbox,
            path = %path,
            content_len = content.len(),
            "Writing file"
        );

        sandbox
            .files()
            .write(path, content)
            .await
            .map_err(|e| Self::backend_error(session_id, path, action, e))?;

        Ok(MessageResult {
            path: path.to_string(),
            message: message.to_string(),
        })
    }

    /// Delete a file.
    pub async fn delete_file(&self, session_id: &str, file_path: &str) -> ToolResponse<MessageResult> {
        self.try_delete_file(session_id, file_path).await.into()
    }

    async fn try_delete_file(
        &self,
        session_id: &str,
        file_path: &str,
    ) -> Result<MessageResult, ToolError> {
        let sandbox = self.session(session_id).await?;
        tracing::info!(session_id = %session_id, sandbox = %sandbox, path = %file_path, "Deleting file");

        sandbox
            .files()
            .delete(file_path)
            .await
            .map_err(|e| Self::backend_error(session_id, file_path, "deleting file", e))?;

        Ok(MessageResult {
            path: file_path.to_string(),
            message: DELETE_OK.to_string(),
        })
    }

    /// Get `is_dir` and `size` for a path.
    pub async fn get_file_metadata(
        &self,
        session_id: &str,
        file_path: &str,
    ) -> ToolResponse<FileMetadataResult> {
        self.try_get_file_metadata(session_id, file_path).await.into()
    }

    async fn try_get_file_metadata(
        &self,
        session_id: &str,
        file_path: &str,
    ) -> Result<FileMetadataResult, ToolError> {
        let sandbox = self.session(session_id).await?;
        tracing::debug!(session_id = %session_id, sandbox = %sandbox, path = %file_path, "Getting file metadata");

        let metadata = sandbox
            .files()
            .stat(file_path)
            .await
            .map_err(|e| Self::backend_error(session_id, file_path, "getting file metadata", e))?;

        Ok(FileMetadataResult {
            path: file_path.to_string(),
            metadata,
        })
    }
}
