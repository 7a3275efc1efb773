//! Rendering parameters shared by the resizer and the tile layout
//!
//! - `QualityTier`: named resolution preset mapping to a target long edge
//! - `ResizeMode`: how the computed target dimensions are applied

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::REFERENCE_RESOLUTION;
use crate::error::ProcessingError;

/// Resolution preset for both output variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "512p")]
    P512,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "2K")]
    K2,
    #[serde(rename = "4K")]
    K4,
}

impl QualityTier {
    /// All tiers, smallest first.
    pub const ALL: [QualityTier; 4] = [
        QualityTier::P512,
        QualityTier::P1080,
        QualityTier::K2,
        QualityTier::K4,
    ];

    /// Target size in pixels for the computed long side.
    pub fn target_size(&self) -> u32 {
        match self {
            Self::P512 => 512,
            Self::P1080 => 1080,
            Self::K2 => 1440,
            Self::K4 => 2160,
        }
    }

    /// Typography scale relative to the 512 reference resolution.
    pub fn scale_factor(&self) -> f64 {
        self.target_size() as f64 / REFERENCE_RESOLUTION
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P512 => "512p",
            Self::P1080 => "1080p",
            Self::K2 => "2K",
            Self::K4 => "4K",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "512p" | "512" => Ok(QualityTier::P512),
            "1080p" | "1080" => Ok(QualityTier::P1080),
            "2k" | "1440p" | "1440" => Ok(QualityTier::K2),
            "4k" | "2160p" | "2160" => Ok(QualityTier::K4),
            _ => Err(ProcessingError::invalid_spec(
                "tier",
                format!("unknown quality tier: {}", s),
            )),
        }
    }
}

/// How the computed target dimensions are applied to the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    /// Stretch to the exact computed dimensions; small sources are upscaled
    #[default]
    Fill,
    /// Keep the source size whenever the computed target is larger on either axis
    FitNoEnlarge,
}

impl FromStr for ResizeMode {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fill" => Ok(ResizeMode::Fill),
            "fit-no-enlarge" | "inside" => Ok(ResizeMode::FitNoEnlarge),
            _ => Err(ProcessingError::failure(
                "config",
                format!("unknown resize mode: {}", s),
            )),
        }
    }
}
