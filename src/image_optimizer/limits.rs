//! Source image limits
//!
//! Image bomb protection: the byte size and the header-reported pixel count
//! are checked before the full decode allocates the pixel buffer.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_SOURCE_BYTES, DEFAULT_MAX_SOURCE_DIMENSION, DEFAULT_MAX_SOURCE_PIXELS,
};
use super::encoder::WEBP_MAX_DIMENSION;
use crate::error::ProcessingError;

/// Limits applied to every source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLimits {
    /// Maximum source file size in bytes
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: usize,
    /// Maximum allowed total pixels (width * height)
    #[serde(default = "default_max_source_pixels")]
    pub max_source_pixels: u64,
    /// Maximum allowed width or height
    #[serde(default = "default_max_source_dimension")]
    pub max_source_dimension: u32,
}

fn default_max_source_bytes() -> usize {
    DEFAULT_MAX_SOURCE_BYTES
}

fn default_max_source_pixels() -> u64 {
    DEFAULT_MAX_SOURCE_PIXELS
}

fn default_max_source_dimension() -> u32 {
    DEFAULT_MAX_SOURCE_DIMENSION
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            max_source_pixels: DEFAULT_MAX_SOURCE_PIXELS,
            max_source_dimension: DEFAULT_MAX_SOURCE_DIMENSION,
        }
    }
}

impl SourceLimits {
    /// Validate source size before any decoding.
    pub fn validate_file_size(&self, size: usize) -> Result<(), ProcessingError> {
        if size == 0 {
            return Err(ProcessingError::invalid_image("source buffer is empty"));
        }
        if size > self.max_source_bytes {
            return Err(ProcessingError::invalid_image(format!(
                "file size {} bytes exceeds maximum {} bytes",
                size, self.max_source_bytes
            )));
        }
        Ok(())
    }

    /// Validate header-reported dimensions.
    ///
    /// Zero width or height is rejected here, before anything divides by it.
    pub fn validate_dimensions(&self, width: u32, height: u32) -> Result<(), ProcessingError> {
        if width == 0 || height == 0 {
            return Err(ProcessingError::invalid_image(format!(
                "image reports {}x{} dimensions",
                width, height
            )));
        }

        if width > self.max_source_dimension || height > self.max_source_dimension {
            return Err(ProcessingError::invalid_image(format!(
                "dimensions {}x{} exceed maximum side of {} pixels",
                width, height, self.max_source_dimension
            )));
        }

        let pixels = width as u64 * height as u64;
        if pixels > self.max_source_pixels {
            return Err(ProcessingError::invalid_image(format!(
                "dimensions {}x{} ({} pixels) exceed limit of {} pixels",
                width, height, pixels, self.max_source_pixels
            )));
        }

        Ok(())
    }

    /// Validate the planned output size.
    ///
    /// Extreme aspect ratios blow up the short-side target (a 5000x1 source
    /// at 512p is 2,560,000 pixels wide), so the output goes through the same
    /// bounds as the source. The side is also capped at what WebP can encode.
    pub fn validate_output_dimensions(
        &self,
        width: u32,
        height: u32,
    ) -> Result<(), ProcessingError> {
        let max_side = self.max_output_dimension();
        let pixels = width as u64 * height as u64;
        if width > max_side || height > max_side || pixels > self.max_source_pixels
        {
            return Err(ProcessingError::invalid_image(format!(
                "aspect ratio too extreme: output would be {}x{}",
                width, height
            )));
        }
        Ok(())
    }

    /// Largest output side that is both allowed and encodable.
    pub fn max_output_dimension(&self) -> u32 {
        self.max_source_dimension.min(WEBP_MAX_DIMENSION)
    }
}
