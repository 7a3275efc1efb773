// Processing pipeline module - one source image in, two WebP variants out
//
// decode -> resize -> { encode (optimized) | layout -> overlay -> composite (watermarked) }
//
// Both output paths run off the same resized buffer. A failure on the
// watermark path is reported inside the result; the optimized variant is
// still returned.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, field, info_span, warn};

use crate::constants::{
    DEFAULT_EFFORT, DEFAULT_GRID_MARGIN, DEFAULT_HORIZONTAL_SPACING_FACTOR, DEFAULT_QUALITY,
    OUTPUT_CONTENT_TYPE,
};
use crate::error::ProcessingError;
use crate::image_optimizer::{
    decode, declared_type_matches, plan_dimensions, probe, resize, EncodedImage, EncoderQuality,
    ImageEncoder, ImageMetadata, ResizeMode, ResizedImage, SourceImage, SourceLimits, WebPEncoder,
};
use crate::watermark::{
    Compositor, FontRegistry, Overlay, OverlayRenderer, SvgRasterizer, TileLayout, TilingConfig,
    WatermarkInput, WatermarkSpec,
};

/// Tunable pipeline constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub resize_mode: ResizeMode,
    #[serde(default = "default_horizontal_spacing_factor")]
    pub horizontal_spacing_factor: u32,
    #[serde(default = "default_grid_margin")]
    pub grid_margin: u32,
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default = "default_effort")]
    pub effort: u8,
}

fn default_horizontal_spacing_factor() -> u32 {
    DEFAULT_HORIZONTAL_SPACING_FACTOR
}

fn default_grid_margin() -> u32 {
    DEFAULT_GRID_MARGIN
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

fn default_effort() -> u8 {
    DEFAULT_EFFORT
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resize_mode: ResizeMode::default(),
            horizontal_spacing_factor: DEFAULT_HORIZONTAL_SPACING_FACTOR,
            grid_margin: DEFAULT_GRID_MARGIN,
            quality: DEFAULT_QUALITY,
            effort: DEFAULT_EFFORT,
        }
    }
}

impl PipelineConfig {
    pub fn tiling(&self) -> TilingConfig {
        TilingConfig {
            horizontal_spacing_factor: self.horizontal_spacing_factor,
            grid_margin: self.grid_margin,
        }
    }

    pub fn encoder_quality(&self) -> EncoderQuality {
        EncoderQuality::with_quality(self.quality).with_effort(self.effort)
    }
}

/// Output of one pipeline invocation
#[derive(Debug, Clone)]
pub struct ProcessedImagePair {
    /// Resized, re-encoded image without overlay
    pub optimized: EncodedImage,
    /// Resized image with the tiled overlay, or why it could not be produced
    pub watermarked: Result<EncodedImage, ProcessingError>,
    /// Content type shared by both variants
    pub content_type: &'static str,
    /// Metadata of the decoded source
    pub source: ImageMetadata,
    /// Output dimensions of both variants
    pub width: u32,
    pub height: u32,
    /// Geometry of the overlay, when it could be computed
    pub layout: Option<TileLayout>,
}

impl ProcessedImagePair {
    pub fn watermarked_bytes(&self) -> Option<&[u8]> {
        self.watermarked.as_ref().ok().map(|img| img.data.as_slice())
    }

    /// Whether both variants were produced.
    pub fn is_complete(&self) -> bool {
        self.watermarked.is_ok()
    }
}

/// The image pipeline. Holds no per-request state; share it freely.
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    limits: SourceLimits,
    fonts: FontRegistry,
    encoder: Arc<dyn ImageEncoder>,
    compositor: Compositor,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("limits", &self.limits)
            .field("fonts", &self.fonts)
            .finish()
    }
}

impl Pipeline {
    /// Pipeline with the WebP encoder and the resvg overlay rasterizer.
    pub fn new(config: PipelineConfig, limits: SourceLimits, fonts: FontRegistry) -> Self {
        let encoder: Arc<dyn ImageEncoder> = Arc::new(WebPEncoder);
        let renderer: Arc<dyn OverlayRenderer> = Arc::new(SvgRasterizer::new(fonts.clone()));
        Self {
            config,
            limits,
            fonts,
            compositor: Compositor::new(renderer, Arc::clone(&encoder)),
            encoder,
        }
    }

    /// Replace the overlay renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn OverlayRenderer>) -> Self {
        self.compositor = Compositor::new(renderer, Arc::clone(&self.encoder));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn limits(&self) -> &SourceLimits {
        &self.limits
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Validate raw settings, then process.
    ///
    /// Invalid settings fail before any decode or resize work.
    pub fn process_input(
        &self,
        source: &SourceImage,
        input: &WatermarkInput,
    ) -> Result<ProcessedImagePair, ProcessingError> {
        let spec = input.validate()?;
        self.process(source, &spec)
    }

    /// Produce the optimized and watermarked variants of `source`.
    pub fn process(
        &self,
        source: &SourceImage,
        spec: &WatermarkSpec,
    ) -> Result<ProcessedImagePair, ProcessingError> {
        let span = info_span!(
            "watermark_pipeline",
            tier = %spec.tier(),
            text_len = spec.text_len(),
            font = %spec.font(),
            source_bytes = source.len(),
            width = field::Empty,
            height = field::Empty,
            new_width = field::Empty,
            new_height = field::Empty,
        );
        let _enter = span.enter();

        // Step 1: Reject oversized and unreadable sources before decoding
        self.limits.validate_file_size(source.len())?;
        let probed = probe(&source.bytes);
        self.limits
            .validate_dimensions(probed.width, probed.height)?;
        if !declared_type_matches(source.declared_content_type.as_deref(), probed.format) {
            debug!(
                declared = source.declared_content_type.as_deref().unwrap_or_default(),
                sniffed = probed.format.content_type(),
                "Declared content type does not match image data"
            );
        }

        // Step 2: Decode
        let started = Instant::now();
        let decoded = decode(&source.bytes).map_err(|e| {
            debug!(step = "decode", elapsed_ms = elapsed_ms(started), error = %e, "Pipeline step failed");
            e
        })?;
        let metadata = decoded.metadata;
        span.record("width", metadata.width);
        span.record("height", metadata.height);
        debug!(
            step = "decode",
            elapsed_ms = elapsed_ms(started),
            format = ?metadata.format,
            has_alpha = metadata.has_alpha,
            "Pipeline step complete"
        );

        // Step 3: Resize
        let started = Instant::now();
        let (new_width, new_height) = plan_dimensions(&metadata, spec.tier(), self.config.resize_mode);
        self.limits
            .validate_output_dimensions(new_width, new_height)?;
        span.record("new_width", new_width);
        span.record("new_height", new_height);
        let resized = resize(&decoded, new_width, new_height)?;
        drop(decoded);
        debug!(step = "resize", elapsed_ms = elapsed_ms(started), "Pipeline step complete");

        // Step 4: Both output paths off the same buffer
        let quality = self.config.encoder_quality();
        let (optimized, (watermarked, layout)) = rayon::join(
            || span.in_scope(|| self.encode_optimized(&resized, quality)),
            || span.in_scope(|| self.watermark(&resized, spec, quality)),
        );

        let optimized = optimized?;
        if let Err(e) = &watermarked {
            warn!(error = %e, kind = e.kind(), "Watermarked variant failed, returning optimized only");
        }

        Ok(ProcessedImagePair {
            optimized,
            watermarked,
            content_type: OUTPUT_CONTENT_TYPE,
            source: metadata,
            width: new_width,
            height: new_height,
            layout,
        })
    }

    /// Geometry of the overlay for a spec on a canvas of the given size.
    pub fn layout_for(
        &self,
        spec: &WatermarkSpec,
        width: u32,
        height: u32,
    ) -> Result<TileLayout, ProcessingError> {
        TileLayout::compute(
            spec.text_len(),
            spec.tier(),
            width,
            height,
            &self.config.tiling(),
        )
    }

    fn encode_optimized(
        &self,
        resized: &ResizedImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ProcessingError> {
        let started = Instant::now();
        let result = self.encoder.encode_image(&resized.pixels, quality);
        debug!(
            step = "encode_optimized",
            elapsed_ms = elapsed_ms(started),
            ok = result.is_ok(),
            bytes = result.as_ref().map(|img| img.len()).unwrap_or_default(),
            "Pipeline step complete"
        );
        result
    }

    fn watermark(
        &self,
        resized: &ResizedImage,
        spec: &WatermarkSpec,
        quality: EncoderQuality,
    ) -> (Result<EncodedImage, ProcessingError>, Option<TileLayout>) {
        let started = Instant::now();
        let (width, height) = resized.dimensions();
        let layout = match self.layout_for(spec, width, height) {
            Ok(layout) => layout,
            Err(e) => return (Err(e), None),
        };
        debug!(
            step = "layout",
            elapsed_ms = elapsed_ms(started),
            rows = layout.num_rows,
            cols = layout.num_cols,
            diagonal = layout.diagonal_length,
            "Pipeline step complete"
        );

        let started = Instant::now();
        let result = Overlay::build(
            layout.clone(),
            spec.text(),
            &spec.font().css_family(),
            spec.opacity(),
        )
        .and_then(|overlay| self.compositor.composite(&resized.pixels, &overlay, quality));
        debug!(
            step = "composite",
            elapsed_ms = elapsed_ms(started),
            ok = result.is_ok(),
            "Pipeline step complete"
        );

        (result, Some(layout))
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
