//! The file capability set every sandbox backend provides.

use crate::error::FileError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Regular file.
    File,
    /// Directory.
    Dir,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Dir => write!(f, "dir"),
        }
    }
}

/// Entry returned by [`FileInterface::list`].
///
/// Mirrors what the backend reports; nothing beyond these three
/// attributes is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Entry name (last path component).
    pub name: String,
    /// Absolute path inside the sandbox.
    pub path: String,
    /// File or directory.
    #[serde(rename = "type")]
    pub kind: EntryType,
}

/// Metadata returned by [`FileInterface::stat`].
///
/// Backends narrow their native metadata down to these two fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// True if the path is a directory.
    pub is_dir: bool,
    /// Size in bytes.
    pub size: u64,
}

/// File operations on a single sandbox.
///
/// Implementations translate these calls into the backend's native file
/// API. Errors are classified into [`FileError`] but otherwise passed
/// through untouched; presenting them to users is the caller's job.
#[async_trait]
pub trait FileInterface: Send + Sync {
    /// List the entries of a directory.
    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, FileError>;

    /// Read a whole file as UTF-8 text.
    async fn read(&self, path: &str) -> Result<String, FileError>;

    /// Write a file, replacing any existing content.
    async fn write(&self, path: &str, content: &str) -> Result<(), FileError>;

    /// Delete a single file.
    async fn delete(&self, path: &str) -> Result<(), FileError>;

    /// Get the size and kind of a path.
    async fn stat(&self, path: &str) -> Result<FileMetadata, FileError>;
}
