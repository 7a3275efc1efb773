//! Object storage collaborator traits
//!
//! The pipeline itself never does I/O. The service layer reads sources and
//! writes derived variants through these traits.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ServiceError;
use crate::image_optimizer::SourceImage;

/// An object as returned by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl StoredObject {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    /// Hand the object to the pipeline.
    pub fn into_source(self) -> SourceImage {
        SourceImage {
            bytes: self.bytes,
            declared_content_type: self.content_type,
        }
    }
}

/// Read side: source images
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fetch an object by key
    /// Returns `ServiceError::NotFound` if the key does not exist
    async fn fetch(&self, key: &str) -> Result<StoredObject, ServiceError>;

    /// List image keys directly under `prefix`, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>, ServiceError>;
}

/// Write side: derived variants
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist bytes under `key`
    /// Returns a reference (URL or path) the caller can hand out
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, ServiceError>;
}
