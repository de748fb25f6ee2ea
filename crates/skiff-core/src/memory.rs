//! In-memory file backend.
//!
//! Stores files in a map keyed by absolute path. Directories are not
//! stored; a directory exists whenever some file lives beneath it, and
//! the root always exists.

use crate::error::FileError;
use crate::files::{EntryType, FileEntry, FileInterface, FileMetadata};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// File backend that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryFileInterface {
    files: RwLock<HashMap<String, String>>,
}

impl MemoryFileInterface {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem pre-populated with `(path, content)` pairs.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let files = files
            .into_iter()
            .map(|(p, c)| (p.into(), c.into()))
            .collect();
        Self {
            files: RwLock::new(files),
        }
    }

    /// `"/a/b/"` -> `"/a/b/"`, `"/a/b"` -> `"/a/b/"`, `"/"` -> `"/"`.
    fn dir_prefix(path: &str) -> String {
        let trimmed = path.trim_end_matches('/');
        format!("{trimmed}/")
    }

    fn is_implied_dir(files: &HashMap<String, String>, path: &str) -> bool {
        let prefix = Self::dir_prefix(path);
        prefix == "/" || files.keys().any(|k| k.starts_with(&prefix))
    }
}

#[async_trait]
impl FileInterface for MemoryFileInterface {
    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, FileError> {
        let files = self.files.read().await;

        if files.contains_key(path) {
            return Err(FileError::Unknown(format!("path '{path}' is not a directory")));
        }
        if !Self::is_implied_dir(&files, path) {
            return Err(FileError::NotFound(path.to_string()));
        }

        let prefix = Self::dir_prefix(path);
        let mut children: BTreeMap<&str, EntryType> = BTreeMap::new();
        for key in files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) if !dir.is_empty() => {
                    children.insert(dir, EntryType::Dir);
                }
                None if !rest.is_empty() => {
                    children.entry(rest).or_insert(EntryType::File);
                }
                _ => {}
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| FileEntry {
                name: name.to_string(),
                path: format!("{prefix}{name}"),
                kind,
            })
            .collect())
    }

    async fn read(&self, path: &str) -> Result<String, FileError> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), FileError> {
        self.files
            .write()
            .await
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), FileError> {
        self.files
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| FileError::NotFound(path.to_string()))
    }

    async fn stat(&self, path: &str) -> Result<FileMetadata, FileError> {
        let files = self.files.read().await;
        if let Some(content) = files.get(path) {
            return Ok(FileMetadata {
                is_dir: false,
                size: content.len() as u64,
            });
        }
        if Self::is_implied_dir(&files, path) {
            return Ok(FileMetadata {
                is_dir: true,
                size: 0,
            });
        }
        Err(FileError::NotFound(path.to_string()))
    }
}
