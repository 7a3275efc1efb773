//! Watermark compositor for blending the text overlay onto images.
//!
//! The overlay markup is rasterized into a layer the size of the resized
//! image, alpha-blended "over" it and re-encoded.
//!
//! # Example
//!
//! ```ignore
//! use proofmark::watermark::compositor::{Compositor, SvgRasterizer};
//!
//! let compositor = Compositor::new(Arc::new(SvgRasterizer::new(fonts)), Arc::new(WebPEncoder));
//! let watermarked = compositor.composite(&resized.pixels, &overlay, EncoderQuality::default())?;
//! ```

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use std::sync::Arc;

use super::fonts::FontRegistry;
use super::overlay::Overlay;
use crate::error::ProcessingError;
use crate::image_optimizer::{EncodedImage, EncoderQuality, ImageEncoder};

/// Turns overlay markup into an RGBA layer (straight alpha)
pub trait OverlayRenderer: Send + Sync {
    fn render(&self, overlay: &Overlay) -> Result<RgbaImage, ProcessingError>;
}

/// resvg-backed rasterizer reading from the startup font registry
#[derive(Debug, Clone)]
pub struct SvgRasterizer {
    fonts: FontRegistry,
}

impl SvgRasterizer {
    pub fn new(fonts: FontRegistry) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }
}

impl OverlayRenderer for SvgRasterizer {
    fn render(&self, overlay: &Overlay) -> Result<RgbaImage, ProcessingError> {
        // Text without a face renders nothing at all
        if self.fonts.is_empty() {
            return Err(ProcessingError::failure("overlay", "no font faces loaded"));
        }

        let options = usvg::Options {
            fontdb: self.fonts.database(),
            font_resolver: font_resolver(),
            ..Default::default()
        };

        let tree = usvg::Tree::from_str(&overlay.markup, &options)
            .map_err(|e| ProcessingError::failure("overlay", e.to_string()))?;

        let (width, height) = (overlay.width(), overlay.height());
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ProcessingError::failure(
                "overlay",
                format!("failed to allocate {}x{} pixmap", width, height),
            )
        })?;

        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        // Pixmap data is premultiplied
        let mut layer = RgbaImage::new(width, height);
        for (dst, src) in layer.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(layer)
    }
}

/// Font selection that never drops text while any face is loaded.
///
/// The requested family wins; otherwise the first loaded face is used.
fn font_resolver() -> usvg::FontResolver<'static> {
    let select_requested = usvg::FontResolver::default_font_selector();
    usvg::FontResolver {
        select_font: Box::new(move |font, fontdb| {
            select_requested(font, fontdb).or_else(|| fontdb.faces().next().map(|face| face.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

/// Rasterize, blend and encode the watermarked variant.
#[derive(Clone)]
pub struct Compositor {
    renderer: Arc<dyn OverlayRenderer>,
    encoder: Arc<dyn ImageEncoder>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("content_type", &self.encoder.content_type())
            .finish()
    }
}

impl Compositor {
    pub fn new(renderer: Arc<dyn OverlayRenderer>, encoder: Arc<dyn ImageEncoder>) -> Self {
        Self { renderer, encoder }
    }

    /// Blend the rasterized overlay onto a copy of `base` and encode it.
    pub fn composite(
        &self,
        base: &RgbaImage,
        overlay: &Overlay,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ProcessingError> {
        let watermarked = self.apply(base, overlay)?;
        self.encoder.encode_image(&watermarked, quality)
    }

    /// Blend the rasterized overlay onto a copy of `base`.
    ///
    /// A layer without a single painted pixel is a failure: the result
    /// would be the unmarked image.
    pub fn apply(&self, base: &RgbaImage, overlay: &Overlay) -> Result<RgbaImage, ProcessingError> {
        if base.dimensions() != (overlay.width(), overlay.height()) {
            return Err(ProcessingError::failure(
                "composite",
                format!(
                    "overlay is {}x{} but image is {}x{}",
                    overlay.width(),
                    overlay.height(),
                    base.width(),
                    base.height()
                ),
            ));
        }

        let layer = self.renderer.render(overlay)?;
        if layer.dimensions() != base.dimensions() {
            return Err(ProcessingError::failure(
                "composite",
                format!(
                    "rendered layer is {}x{} but image is {}x{}",
                    layer.width(),
                    layer.height(),
                    base.width(),
                    base.height()
                ),
            ));
        }

        if !layer.pixels().any(|p| p[3] > 0) {
            return Err(ProcessingError::failure(
                "composite",
                "rendered overlay has no painted pixel",
            ));
        }

        let mut target = base.clone();
        blend_layer(&mut target, &layer);
        Ok(target)
    }
}

/// Blend a full-size layer onto the target image.
fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage) {
    for (bg, fg) in target.pixels_mut().zip(layer.pixels()) {
        if fg[3] == 0 {
            continue;
        }
        *bg = blend_pixels(*bg, *fg);
    }
}

/// Blend two pixels using alpha compositing.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    // Porter-Duff "over" operator
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
