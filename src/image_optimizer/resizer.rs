//! Tier-driven resizing
//!
//! Handles decode output → target dimension maths → Lanczos3 resample.
//! The long side of the source maps to the tier's target size and the other
//! side follows the source aspect ratio.

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::RgbaImage;
use std::num::NonZeroU32;

use super::decoder::{DecodedImage, ImageMetadata};
use super::params::{QualityTier, ResizeMode};
use crate::error::ProcessingError;

/// Resized RGBA buffer shared by both output paths
#[derive(Clone)]
pub struct ResizedImage {
    pub pixels: RgbaImage,
}

impl ResizedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

impl std::fmt::Debug for ResizedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizedImage")
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

/// Compute `(new_width, new_height)` for a source size and tier.
///
/// Landscape sources get `new_height = target`; portrait and square sources
/// get `new_width = target`. Both sides are at least 1 pixel.
pub fn target_dimensions(width: u32, height: u32, tier: QualityTier) -> (u32, u32) {
    let target = tier.target_size() as f64;
    let aspect_ratio = width as f64 / height as f64;

    let (new_width, new_height) = if width > height {
        ((target * aspect_ratio).round(), target)
    } else {
        (target, (target / aspect_ratio).round())
    };

    ((new_width as u32).max(1), (new_height as u32).max(1))
}

/// Apply the resize mode on top of `target_dimensions`.
///
/// `FitNoEnlarge` keeps the source size when the computed target would be
/// larger than the source on either axis.
pub fn plan_dimensions(metadata: &ImageMetadata, tier: QualityTier, mode: ResizeMode) -> (u32, u32) {
    let (new_width, new_height) = target_dimensions(metadata.width, metadata.height, tier);

    match mode {
        ResizeMode::Fill => (new_width, new_height),
        ResizeMode::FitNoEnlarge => {
            if new_width > metadata.width || new_height > metadata.height {
                (metadata.width, metadata.height)
            } else {
                (new_width, new_height)
            }
        }
    }
}

/// Resize a decoded image to the given dimensions
pub fn resize(
    decoded: &DecodedImage,
    target_w: u32,
    target_h: u32,
) -> Result<ResizedImage, ProcessingError> {
    let rgba = decoded.image.to_rgba8();

    if rgba.dimensions() == (target_w, target_h) {
        return Ok(ResizedImage { pixels: rgba });
    }

    let pixels = resize_rgba(rgba, target_w, target_h, decoded.metadata.has_alpha)?;
    Ok(ResizedImage { pixels })
}

/// Resize RGBA pixels using fast-image-resize with Lanczos3 filter
fn resize_rgba(
    img: RgbaImage,
    target_w: u32,
    target_h: u32,
    has_alpha: bool,
) -> Result<RgbaImage, ProcessingError> {
    let (src_w, src_h) = img.dimensions();

    let src_width = NonZeroU32::new(src_w)
        .ok_or_else(|| ProcessingError::failure("resize", "source width is 0"))?;
    let src_height = NonZeroU32::new(src_h)
        .ok_or_else(|| ProcessingError::failure("resize", "source height is 0"))?;
    let dst_width = NonZeroU32::new(target_w)
        .ok_or_else(|| ProcessingError::failure("resize", "target width is 0"))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| ProcessingError::failure("resize", "target height is 0"))?;

    let mut src_image =
        Image::from_vec_u8(src_width, src_height, img.into_raw(), PixelType::U8x4).map_err(
            |e| ProcessingError::failure("resize", format!("invalid source buffer: {:?}", e)),
        )?;

    let mul_div = MulDiv::default();
    if has_alpha {
        mul_div
            .multiply_alpha_inplace(&mut src_image.view_mut())
            .map_err(|e| ProcessingError::failure("resize", format!("{:?}", e)))?;
    }

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ProcessingError::failure("resize", format!("{:?}", e)))?;

    if has_alpha {
        mul_div
            .divide_alpha_inplace(&mut dst_image.view_mut())
            .map_err(|e| ProcessingError::failure("resize", format!("{:?}", e)))?;
    }

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ProcessingError::failure("resize", "output buffer size mismatch"))
}
