//! Per-album watermark settings
//!
//! Albums may override the watermark text, tier, font and opacity. Missing
//! values fall back to the configured defaults. Lookups go through
//! `AlbumSettingsCache`, which is handed to the service by constructor and
//! lives as long as the process: positive lookups are never evicted, only
//! dropped by an explicit `clear()`.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::error::ServiceError;
use crate::watermark::WatermarkInput;

/// Album-level overrides; `None` means "use the default"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSettings {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub opacity_percent: Option<i64>,
}

impl AlbumSettings {
    /// Fill unset values from `defaults`.
    pub fn resolve(&self, defaults: &WatermarkInput) -> WatermarkInput {
        WatermarkInput {
            text: self.text.clone().unwrap_or_else(|| defaults.text.clone()),
            tier: self.tier.clone().unwrap_or_else(|| defaults.tier.clone()),
            font: self.font.clone().unwrap_or_else(|| defaults.font.clone()),
            opacity_percent: self.opacity_percent.unwrap_or(defaults.opacity_percent),
        }
    }
}

/// Where album settings come from (database, config file, ...)
#[async_trait]
pub trait AlbumSettingsSource: Send + Sync {
    /// Settings of an album
    /// Returns None if the album has no stored settings
    async fn album_settings(&self, album_id: &str) -> Result<Option<AlbumSettings>, ServiceError>;
}

/// Fixed table of album settings, e.g. from the configuration file
#[derive(Debug, Clone, Default)]
pub struct StaticAlbumSettings {
    albums: HashMap<String, AlbumSettings>,
}

impl StaticAlbumSettings {
    pub fn new(albums: HashMap<String, AlbumSettings>) -> Self {
        Self { albums }
    }
}

#[async_trait]
impl AlbumSettingsSource for StaticAlbumSettings {
    async fn album_settings(&self, album_id: &str) -> Result<Option<AlbumSettings>, ServiceError> {
        Ok(self.albums.get(album_id).cloned())
    }
}

/// Hit/miss counters of the album settings cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlbumCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

/// Eviction-free cache in front of an `AlbumSettingsSource`
pub struct AlbumSettingsCache {
    source: Arc<dyn AlbumSettingsSource>,
    entries: RwLock<HashMap<String, AlbumSettings>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for AlbumSettingsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumSettingsCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl AlbumSettingsCache {
    pub fn new(source: Arc<dyn AlbumSettingsSource>) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Settings of an album, from cache when possible.
    ///
    /// Only found settings are cached; an album without settings is asked
    /// again next time.
    pub async fn get(&self, album_id: &str) -> Result<Option<AlbumSettings>, ServiceError> {
        let cached = self.entries.read().get(album_id).cloned();
        if let Some(settings) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(settings));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let settings = self.source.album_settings(album_id).await?;
        if let Some(settings) = &settings {
            debug!(album_id = %album_id, "Caching album settings");
            self.entries
                .write()
                .insert(album_id.to_string(), settings.clone());
        }
        Ok(settings)
    }

    /// Resolved watermark input for an album.
    pub async fn resolve(
        &self,
        album_id: &str,
        defaults: &WatermarkInput,
    ) -> Result<WatermarkInput, ServiceError> {
        Ok(match self.get(album_id).await? {
            Some(settings) => settings.resolve(defaults),
            None => defaults.clone(),
        })
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> AlbumCacheStats {
        AlbumCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len() as u64,
        }
    }
}
