//! The two file API families of an E2B sandbox.
//!
//! `files` covers listing, reading and writing. `filesystem` covers
//! metadata and removal. Both talk to the same envd instance.

use super::envd::EnvdClient;
use crate::error::FileError;
use crate::files::{EntryType, FileEntry, FileMetadata};
use serde::{Deserialize, Deserializer, Serialize};

const LIST_DIR: &str = "filesystem.Filesystem/ListDir";
const STAT: &str = "filesystem.Filesystem/Stat";
const REMOVE: &str = "filesystem.Filesystem/Remove";

/// Entry kind as reported by envd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum E2bFileType {
    #[serde(rename = "FILE_TYPE_FILE")]
    File,
    #[serde(rename = "FILE_TYPE_DIRECTORY")]
    Directory,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl From<E2bFileType> for EntryType {
    fn from(kind: E2bFileType) -> Self {
        match kind {
            E2bFileType::Directory => EntryType::Dir,
            E2bFileType::File | E2bFileType::Unspecified => EntryType::File,
        }
    }
}

/// Full entry information as returned by envd.
///
/// envd encodes protobuf messages as JSON, which omits zero values and
/// renders 64-bit integers as strings, hence the lenient defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: E2bFileType,
    #[serde(default)]
    pub path: String,
    #[serde(default, deserialize_with = "int64_lenient")]
    pub size: u64,
    #[serde(default)]
    pub mode: u32,
    #[serde(default)]
    pub permissions: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub symlink_target: Option<String>,
}

impl EntryInfo {
    /// Keep only the attributes listing callers rely on.
    pub fn to_file_entry(&self) -> FileEntry {
        FileEntry {
            name: self.name.clone(),
            path: self.path.clone(),
            kind: self.kind.into(),
        }
    }
}

impl From<&EntryInfo> for FileMetadata {
    fn from(info: &EntryInfo) -> Self {
        Self {
            is_dir: info.kind == E2bFileType::Directory,
            size: info.size,
        }
    }
}

fn int64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(u64),
        Text(String),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n),
        Int64::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Serialize)]
struct PathRequest<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct ListDirRequest<'a> {
    path: &'a str,
    depth: u32,
}

#[derive(Deserialize)]
struct ListDirResponse {
    #[serde(default)]
    entries: Vec<EntryInfo>,
}

#[derive(Deserialize)]
struct StatResponse {
    entry: EntryInfo,
}

#[derive(Deserialize)]
struct RemoveResponse {}

/// `sandbox.files` - directory listing and content transfer.
#[derive(Debug, Clone)]
pub struct E2bFiles {
    envd: EnvdClient,
}

impl E2bFiles {
    pub(crate) fn new(envd: EnvdClient) -> Self {
        Self { envd }
    }

    pub(crate) fn envd_url(&self) -> &str {
        self.envd.base_url()
    }

    /// List a directory, one level deep.
    pub async fn list(&self, path: &str) -> Result<Vec<EntryInfo>, FileError> {
        let resp: ListDirResponse = self
            .envd
            .rpc(LIST_DIR, &ListDirRequest { path, depth: 1 })
            .await?;
        tracing::trace!(path = %path, count = resp.entries.len(), "Directory entries received");
        Ok(resp.entries)
    }

    /// Read a file as text.
    pub async fn read(&self, path: &str) -> Result<String, FileError> {
        self.envd.download(path).await
    }

    /// Write a file, creating parent directories as envd sees fit.
    pub async fn write(&self, path: &str, content: &str) -> Result<(), FileError> {
        self.envd.upload(path, content).await
    }
}

/// `sandbox.filesystem` - entry metadata and removal.
#[derive(Debug, Clone)]
pub struct E2bFilesystem {
    envd: EnvdClient,
}

impl E2bFilesystem {
    pub(crate) fn new(envd: EnvdClient) -> Self {
        Self { envd }
    }

    /// Get full entry information for a path.
    pub async fn info(&self, path: &str) -> Result<EntryInfo, FileError> {
        let resp: StatResponse = self.envd.rpc(STAT, &PathRequest { path }).await?;
        Ok(resp.entry)
    }

    /// Remove a path.
    pub async fn remove(&self, path: &str) -> Result<(), FileError> {
        let _: RemoveResponse = self.envd.rpc(REMOVE, &PathRequest { path }).await?;
        Ok(())
    }
}
