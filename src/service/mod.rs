// Processing service - async wrapper around the CPU-bound pipeline
//
// fetch (ObjectSource) -> spawn_blocking(Pipeline::process) under a timeout
// -> put both variants (ObjectStore)
//
// The service owns no retry policy. Errors are returned typed so callers can
// decide between showing a validation message and retrying later.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::album::AlbumSettingsCache;
use crate::constants::{
    DEFAULT_MAX_CONCURRENT_JOBS, DEFAULT_OPTIMIZED_PREFIX, DEFAULT_PROCESSING_TIMEOUT_SECS,
    DEFAULT_WATERMARKED_PREFIX,
};
use crate::error::ServiceError;
use crate::image_optimizer::{EncodedImage, SourceImage};
use crate::pipeline::{Pipeline, ProcessedImagePair};
use crate::storage::{derived_key, normalize_key, ObjectSource, ObjectStore};
use crate::watermark::{WatermarkInput, WatermarkSpec};

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Budget for one pipeline invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Images processed at once by `process_album`
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    #[serde(default = "default_optimized_prefix")]
    pub key_prefix_optimized: String,
    #[serde(default = "default_watermarked_prefix")]
    pub key_prefix_watermarked: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_PROCESSING_TIMEOUT_SECS
}

fn default_max_concurrent_jobs() -> usize {
    DEFAULT_MAX_CONCURRENT_JOBS
}

fn default_optimized_prefix() -> String {
    DEFAULT_OPTIMIZED_PREFIX.to_string()
}

fn default_watermarked_prefix() -> String {
    DEFAULT_WATERMARKED_PREFIX.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            key_prefix_optimized: default_optimized_prefix(),
            key_prefix_watermarked: default_watermarked_prefix(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("service.timeout_secs must be greater than 0".to_string());
        }
        if self.max_concurrent_jobs == 0 {
            return Err("service.max_concurrent_jobs must be greater than 0".to_string());
        }
        for (name, prefix) in [
            ("key_prefix_optimized", &self.key_prefix_optimized),
            ("key_prefix_watermarked", &self.key_prefix_watermarked),
        ] {
            if prefix.is_empty() || prefix.contains('/') {
                return Err(format!(
                    "service.{} must be non-empty and must not contain '/' (got '{}')",
                    name, prefix
                ));
            }
        }
        if self.key_prefix_optimized == self.key_prefix_watermarked {
            return Err(
                "service.key_prefix_optimized and key_prefix_watermarked must differ".to_string(),
            );
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One source object after processing and storage
#[derive(Debug, Clone)]
pub struct ProcessedObject {
    pub source_key: String,
    pub optimized_key: String,
    /// Reference returned by the store for the optimized variant
    pub optimized_ref: String,
    pub watermarked_key: Option<String>,
    pub watermarked_ref: Option<String>,
    /// Why the watermarked variant is missing, if it is: the pipeline
    /// failed it or the store rejected it
    pub watermark_error: Option<ServiceError>,
    pub width: u32,
    pub height: u32,
}

impl ProcessedObject {
    /// Whether both variants were stored.
    pub fn is_complete(&self) -> bool {
        self.watermarked_ref.is_some()
    }
}

/// Result for one key of a batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub key: String,
    pub result: Result<ProcessedObject, ServiceError>,
}

/// Summary of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub errors: usize,
    /// Per-key outcomes, sorted by key
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    fn from_outcomes(mut outcomes: Vec<BatchOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.key.cmp(&b.key));
        let errors = outcomes.iter().filter(|o| o.result.is_err()).count();
        Self {
            processed: outcomes.len() - errors,
            errors,
            outcomes,
        }
    }

    /// Outcomes that failed, with their keys.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ServiceError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.key.as_str(), e)))
    }
}

/// Fetch, process and store images
pub struct ProcessingService {
    pipeline: Arc<Pipeline>,
    source: Arc<dyn ObjectSource>,
    store: Arc<dyn ObjectStore>,
    albums: Arc<AlbumSettingsCache>,
    config: ServiceConfig,
    defaults: WatermarkInput,
}

impl std::fmt::Debug for ProcessingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingService")
            .field("pipeline", &self.pipeline)
            .field("albums", &self.albums)
            .field("config", &self.config)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl ProcessingService {
    pub fn new(
        pipeline: Arc<Pipeline>,
        source: Arc<dyn ObjectSource>,
        store: Arc<dyn ObjectStore>,
        albums: Arc<AlbumSettingsCache>,
        config: ServiceConfig,
        defaults: WatermarkInput,
    ) -> Self {
        Self {
            pipeline,
            source,
            store,
            albums,
            config,
            defaults,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn defaults(&self) -> &WatermarkInput {
        &self.defaults
    }

    pub fn albums(&self) -> &AlbumSettingsCache {
        &self.albums
    }

    /// Validate raw settings, then process one object.
    pub async fn process_object_with(
        &self,
        key: &str,
        input: &WatermarkInput,
    ) -> Result<ProcessedObject, ServiceError> {
        let spec = input.validate()?;
        self.process_object(key, &spec).await
    }

    /// Fetch `key`, run the pipeline and store both variants next to it.
    pub async fn process_object(
        &self,
        key: &str,
        spec: &WatermarkSpec,
    ) -> Result<ProcessedObject, ServiceError> {
        let key = normalize_key(key)?;

        let started = Instant::now();
        let object = self.source.fetch(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Failed to fetch source object");
            e
        })?;
        debug!(
            key = %key,
            bytes = object.bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched source object"
        );

        let pair = self.run_pipeline(object.into_source(), spec.clone()).await?;

        let optimized_key = derived_key(
            &key,
            &self.config.key_prefix_optimized,
            pair.optimized.extension,
        );
        let optimized_ref = self.store_variant(&optimized_key, pair.optimized).await?;

        // The optimized variant is stored; from here on a failure only
        // costs the watermarked one
        let (watermarked_key, watermarked_ref, watermark_error) = match pair.watermarked {
            Ok(watermarked) => {
                let wm_key =
                    derived_key(&key, &self.config.key_prefix_watermarked, watermarked.extension);
                match self.store_variant(&wm_key, watermarked).await {
                    Ok(wm_ref) => (Some(wm_key), Some(wm_ref), None),
                    Err(e) => (None, None, Some(e)),
                }
            }
            Err(e) => (None, None, Some(ServiceError::Processing(e))),
        };

        info!(
            key = %key,
            optimized_key = %optimized_key,
            watermarked_key = watermarked_key.as_deref().unwrap_or_default(),
            width = pair.width,
            height = pair.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Processed source object"
        );

        Ok(ProcessedObject {
            source_key: key,
            optimized_key,
            optimized_ref,
            watermarked_key,
            watermarked_ref,
            watermark_error,
            width: pair.width,
            height: pair.height,
        })
    }

    /// Process `keys` with the album's watermark settings.
    ///
    /// Settings are resolved and validated once; invalid album settings fail
    /// the whole batch. Individual image failures are collected in the report.
    pub async fn process_album(
        &self,
        album_id: &str,
        keys: Vec<String>,
    ) -> Result<BatchReport, ServiceError> {
        let input = self.albums.resolve(album_id, &self.defaults).await?;
        let spec = input.validate().map_err(|e| {
            warn!(album_id = %album_id, error = %e, "Album watermark settings are invalid");
            e
        })?;

        info!(
            album_id = %album_id,
            images = keys.len(),
            tier = %spec.tier(),
            concurrency = self.config.max_concurrent_jobs,
            "Processing album"
        );

        let spec = &spec;
        let outcomes: Vec<BatchOutcome> = stream::iter(keys)
            .map(|key| async move {
                let result = self.process_object(&key, spec).await;
                if let Err(e) = &result {
                    warn!(key = %key, error = %e, "Failed to process album image");
                }
                BatchOutcome { key, result }
            })
            .buffer_unordered(self.config.max_concurrent_jobs.max(1))
            .collect()
            .await;

        let report = BatchReport::from_outcomes(outcomes);
        info!(
            album_id = %album_id,
            processed = report.processed,
            errors = report.errors,
            "Album processing finished"
        );
        Ok(report)
    }

    /// Process every image directly under `prefix` with the album's settings.
    ///
    /// Variants written by earlier runs into the same prefix are skipped.
    pub async fn process_album_prefix(
        &self,
        album_id: &str,
        prefix: &str,
    ) -> Result<BatchReport, ServiceError> {
        let listed = self.source.list(prefix).await?;
        let total = listed.len();
        let keys: Vec<String> = listed
            .into_iter()
            .filter(|key| !self.is_derived_key(key))
            .collect();
        if keys.len() < total {
            debug!(
                prefix = %prefix,
                skipped = total - keys.len(),
                "Skipping previously derived variants"
            );
        }
        self.process_album(album_id, keys).await
    }

    /// Whether `key` names a variant this service writes.
    pub fn is_derived_key(&self, key: &str) -> bool {
        let name = key.rsplit('/').next().unwrap_or(key);
        name.starts_with(&self.config.key_prefix_optimized)
            || name.starts_with(&self.config.key_prefix_watermarked)
    }

    async fn run_pipeline(
        &self,
        source: SourceImage,
        spec: WatermarkSpec,
    ) -> Result<ProcessedImagePair, ServiceError> {
        let pipeline = Arc::clone(&self.pipeline);
        let handle = tokio::task::spawn_blocking(move || pipeline.process(&source, &spec));

        // A timed-out job keeps its blocking thread until it finishes
        match tokio::time::timeout(self.config.timeout(), handle).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join_error)) => Err(ServiceError::Worker {
                message: join_error.to_string(),
            }),
            Err(_) => Err(ServiceError::Timeout {
                timeout_ms: self.config.timeout().as_millis() as u64,
            }),
        }
    }

    async fn store_variant(&self, key: &str, image: EncodedImage) -> Result<String, ServiceError> {
        let size = image.len();
        let reference = self
            .store
            .put(key, Bytes::from(image.data), image.content_type)
            .await
            .map_err(|e| {
                warn!(key = %key, error = %e, "Failed to store variant");
                e
            })?;
        debug!(key = %key, bytes = size, reference = %reference, "Stored variant");
        Ok(reference)
    }
}
