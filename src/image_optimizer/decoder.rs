//! Source image decoding
//!
//! Two passes over the source buffer:
//! 1. `probe` reads only the header. It never fails: unreadable headers
//!    yield `0x0` metadata so the caller can reject the image before any
//!    division or allocation happens.
//! 2. `decode` produces the pixel buffer plus the final metadata
//!    (alpha channel presence is only known after decoding).

use bytes::Bytes;
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::io::Cursor;

use crate::error::ProcessingError;

/// Raw source bytes plus the content type the collaborator declared
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Bytes,
    pub declared_content_type: Option<String>,
}

impl SourceImage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            declared_content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Container format detected from the source bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
    Unknown,
}

impl SourceFormat {
    fn from_image_format(format: Option<ImageFormat>) -> Self {
        match format {
            Some(ImageFormat::Jpeg) => SourceFormat::Jpeg,
            Some(ImageFormat::Png) => SourceFormat::Png,
            Some(ImageFormat::WebP) => SourceFormat::WebP,
            Some(ImageFormat::Gif) => SourceFormat::Gif,
            Some(ImageFormat::Bmp) => SourceFormat::Bmp,
            Some(ImageFormat::Tiff) => SourceFormat::Tiff,
            _ => SourceFormat::Unknown,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Pixel dimensions and color metadata of a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    pub format: SourceFormat,
}

impl ImageMetadata {
    /// Aspect ratio (width / height). Only meaningful once dimensions are validated.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A decoded source image
pub struct DecodedImage {
    pub image: DynamicImage,
    pub metadata: ImageMetadata,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Read header metadata without decoding pixels.
///
/// Missing or unreadable dimensions are reported as `0`.
pub fn probe(data: &[u8]) -> ImageMetadata {
    let format = SourceFormat::from_image_format(image::guess_format(data).ok());

    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
        .unwrap_or((0, 0));

    ImageMetadata {
        width,
        height,
        has_alpha: false,
        format,
    }
}

/// Decode image data into pixels and final metadata
pub fn decode(data: &[u8]) -> Result<DecodedImage, ProcessingError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::invalid_image(e.to_string()))?;

    let format = SourceFormat::from_image_format(reader.format());
    if format == SourceFormat::Unknown {
        return Err(ProcessingError::invalid_image("unrecognized image format"));
    }

    let image = reader
        .decode()
        .map_err(|e| ProcessingError::invalid_image(e.to_string()))?;

    let metadata = ImageMetadata {
        width: image.width(),
        height: image.height(),
        has_alpha: image.color().has_alpha(),
        format,
    };

    if !metadata.has_dimensions() {
        return Err(ProcessingError::invalid_image(format!(
            "decoded image is {}x{}",
            metadata.width, metadata.height
        )));
    }

    Ok(DecodedImage { image, metadata })
}

/// Whether a declared content type agrees with the sniffed format.
///
/// Absent declarations always agree.
pub fn declared_type_matches(declared: Option<&str>, format: SourceFormat) -> bool {
    match declared {
        None => true,
        Some(declared) => {
            let declared = declared
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            declared == format.content_type()
                || (declared == "image/jpg" && format == SourceFormat::Jpeg)
        }
    }
}
