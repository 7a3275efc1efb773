//! In-memory object store
//!
//! Backs tests and embedding callers that keep objects themselves.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::keys::{content_type_for_key, is_image_key};
use super::traits::{ObjectSource, ObjectStore, StoredObject};
use crate::error::ServiceError;

/// HashMap-backed store; references are `memory://<key>`
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, guessing the content type from the key.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        let key = key.into();
        let content_type = content_type_for_key(&key).map(str::to_string);
        self.objects
            .write()
            .insert(key, StoredObject::new(data, content_type));
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectSource for MemoryStore {
    async fn fetch(&self, key: &str) -> Result<StoredObject, ServiceError> {
        self.get(key).ok_or_else(|| ServiceError::NotFound {
            key: key.to_string(),
        })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let dir = prefix.trim_end_matches('/');
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| match key.rsplit_once('/') {
                Some((parent, _)) => parent == dir,
                None => dir.is_empty(),
            })
            .filter(|key| is_image_key(key))
            .collect())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, ServiceError> {
        self.objects.write().insert(
            key.to_string(),
            StoredObject::new(data, Some(content_type.to_string())),
        );
        Ok(format!("memory://{}", key))
    }
}
