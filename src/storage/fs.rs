//! Filesystem object store using tokio::fs
//!
//! Keys map to paths under a root directory. Writes go to a temp file first
//! and are renamed into place.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::keys::{content_type_for_key, is_image_key, normalize_key};
use super::traits::{ObjectSource, ObjectStore, StoredObject};
use crate::error::ServiceError;

/// Store rooted at a directory; references are filesystem paths
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a key under the root. Keys escaping the root are rejected.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, ServiceError> {
        let key = normalize_key(key)?;
        Ok(self.root.join(key))
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> ServiceError {
    ServiceError::storage(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl ObjectSource for FsStore {
    async fn fetch(&self, key: &str) -> Result<StoredObject, ServiceError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(StoredObject::new(
                data,
                content_type_for_key(key).map(str::to_string),
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ServiceError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(storage_error(&path, e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let (dir, key_prefix) = if prefix.trim_matches('/').is_empty() {
            (self.root.clone(), String::new())
        } else {
            let normalized = normalize_key(prefix)?;
            (self.root.join(&normalized), format!("{}/", normalized))
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ServiceError::NotFound {
                    key: prefix.to_string(),
                })
            }
            Err(e) => return Err(storage_error(&dir, e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error(&dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| storage_error(&entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_image_key(&name) {
                keys.push(format!("{}{}", key_prefix, name));
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<String, ServiceError> {
        let path = self.path_for(key)?;

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }

        // Write to temp file, then rename into place
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &data)
            .await
            .map_err(|e| storage_error(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| storage_error(&path, e))?;

        Ok(path.display().to_string())
    }
}
