//! Image encoder abstraction
//!
//! Provides a trait-based encoder so that:
//! - Both output variants share one quality/effort setting
//! - Tests can swap in failing or recording encoders

use image::RgbaImage;

use crate::constants::{
    DEFAULT_EFFORT, DEFAULT_QUALITY, MAX_EFFORT, OUTPUT_CONTENT_TYPE, OUTPUT_EXTENSION,
};
use crate::error::ProcessingError;

/// Largest width or height a WebP bitstream can carry
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Quality settings for image encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
    /// Effort/speed trade-off (0-6, where 6 is slowest/best compression)
    pub effort: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            effort: DEFAULT_EFFORT,
        }
    }
}

impl EncoderQuality {
    /// Create quality settings with specified quality level
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            effort: DEFAULT_EFFORT,
        }
    }

    /// Set the encoding effort (speed vs compression trade-off)
    pub fn with_effort(mut self, effort: u8) -> Self {
        self.effort = effort.min(MAX_EFFORT);
        self
    }
}

/// Result of encoding an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// Content-Type header value
    pub content_type: &'static str,
    /// File extension for derived object keys
    pub extension: &'static str,
}

impl EncodedImage {
    pub fn webp(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: OUTPUT_CONTENT_TYPE,
            extension: OUTPUT_EXTENSION,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Trait for image encoders
///
/// Implementations encode raw RGBA pixels. The trait is object-safe so the
/// pipeline can hold a `Box<dyn ImageEncoder>`.
pub trait ImageEncoder: Send + Sync {
    /// Content type of the produced bytes
    fn content_type(&self) -> &'static str;

    /// Encode raw RGBA image data (4 bytes per pixel)
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ProcessingError>;

    /// Encode an RGBA image buffer
    fn encode_image(
        &self,
        image: &RgbaImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ProcessingError> {
        self.encode(image.as_raw(), image.width(), image.height(), quality)
    }
}

/// Lossy WebP encoder backed by libwebp
///
/// Encoder settings are fixed per call and libwebp runs single threaded, so
/// the same pixels always produce the same bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn content_type(&self) -> &'static str {
        OUTPUT_CONTENT_TYPE
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ProcessingError> {
        if width == 0 || height == 0 {
            return Err(ProcessingError::failure(
                "encode",
                format!("cannot encode {}x{} image", width, height),
            ));
        }

        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(ProcessingError::failure(
                "encode",
                format!(
                    "{}x{} exceeds the WebP limit of {} pixels per side",
                    width, height, WEBP_MAX_DIMENSION
                ),
            ));
        }

        let expected_len = width as usize * height as usize * 4;
        if data.len() != expected_len {
            return Err(ProcessingError::failure(
                "encode",
                format!(
                    "pixel buffer is {} bytes, expected {}",
                    data.len(),
                    expected_len
                ),
            ));
        }

        let mut config = webp::WebPConfig::new()
            .map_err(|_| ProcessingError::failure("encode", "failed to initialize WebP config"))?;
        config.lossless = 0;
        config.quality = f32::from(quality.quality);
        config.method = i32::from(quality.effort);
        config.alpha_compression = 1;

        let memory = webp::Encoder::from_rgba(data, width, height)
            .encode_advanced(&config)
            .map_err(|e| ProcessingError::failure("encode", format!("{:?}", e)))?;

        Ok(EncodedImage::webp(memory.to_vec()))
    }
}
