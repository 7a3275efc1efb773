// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::album::AlbumSettings;
use crate::constants::{MAX_EFFORT, MIN_GRID_MARGIN};
use crate::image_optimizer::SourceLimits;
use crate::logging::LoggingConfig;
use crate::pipeline::PipelineConfig;
use crate::service::ServiceConfig;
use crate::watermark::{FontConfig, WatermarkInput};

/// Top-level configuration. Every section has defaults, so an empty
/// document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub fonts: FontConfig,
    /// Watermark settings used when an album has none
    #[serde(default)]
    pub defaults: WatermarkInput,
    #[serde(default)]
    pub limits: SourceLimits,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-album overrides keyed by album id
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub albums: HashMap<String, AlbumSettings>,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        // An empty document deserializes to unit, not to a map
        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        // Pipeline
        if self.pipeline.horizontal_spacing_factor == 0 {
            return Err("pipeline.horizontal_spacing_factor must be at least 1".to_string());
        }
        if self.pipeline.grid_margin < MIN_GRID_MARGIN {
            return Err(format!(
                "pipeline.grid_margin must be at least {} (got {}); smaller margins leave untiled corners",
                MIN_GRID_MARGIN, self.pipeline.grid_margin
            ));
        }
        if !(1..=100).contains(&self.pipeline.quality) {
            return Err(format!(
                "pipeline.quality must be between 1 and 100 (got {})",
                self.pipeline.quality
            ));
        }
        if self.pipeline.effort > MAX_EFFORT {
            return Err(format!(
                "pipeline.effort must be between 0 and {} (got {})",
                MAX_EFFORT, self.pipeline.effort
            ));
        }

        // Limits
        if self.limits.max_source_bytes == 0
            || self.limits.max_source_pixels == 0
            || self.limits.max_source_dimension == 0
        {
            return Err("limits must all be greater than 0".to_string());
        }

        self.service.validate()?;
        self.logging.validate()?;

        // Defaults go through the same validation as caller input
        self.defaults
            .validate()
            .map_err(|e| format!("defaults: {}", e))?;

        for (album_id, settings) in &self.albums {
            settings
                .resolve(&self.defaults)
                .validate()
                .map_err(|e| format!("albums.{}: {}", album_id, e))?;
        }

        Ok(())
    }
}
