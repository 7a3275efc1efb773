// End-to-end pipeline scenarios

use super::test_images::{default_pipeline, jpeg, png};
use image::{GenericImageView, RgbaImage};
use proofmark::image_optimizer::{QualityTier, SourceImage, SourceLimits};
use proofmark::watermark::{
    FontId, FontRegistry, Overlay, OverlayRenderer, WatermarkInput, WatermarkSpec,
};
use proofmark::{Pipeline, PipelineConfig, ProcessingError};
use std::sync::Arc;

/// Renders a half-transparent white layer regardless of fonts
struct FlatRenderer;

impl OverlayRenderer for FlatRenderer {
    fn render(&self, overlay: &Overlay) -> Result<RgbaImage, ProcessingError> {
        Ok(RgbaImage::from_pixel(
            overlay.width(),
            overlay.height(),
            image::Rgba([255, 255, 255, 128]),
        ))
    }
}

struct BrokenRenderer;

impl OverlayRenderer for BrokenRenderer {
    fn render(&self, _overlay: &Overlay) -> Result<RgbaImage, ProcessingError> {
        Err(ProcessingError::failure("composite", "renderer unavailable"))
    }
}

fn input(text: &str, tier: &str, font: &str) -> WatermarkInput {
    WatermarkInput {
        text: text.to_string(),
        tier: tier.to_string(),
        font: font.to_string(),
        opacity_percent: 30,
    }
}

// Test: 4:3 landscape at 1080p becomes 1440x1080
#[test]
fn test_landscape_aspect_preserved() {
    let source = SourceImage::new(jpeg(400, 300));
    let result = default_pipeline()
        .process_input(&source, &input("PROOF", "1080p", "Space Mono"))
        .unwrap();
    assert_eq!((result.width, result.height), (1440, 1080));
    assert_eq!((result.source.width, result.source.height), (400, 300));
}

// Test: DRAFT at 512p uses base metrics
#[test]
fn test_draft_at_512p() {
    let source = SourceImage::new(png(512, 512));
    let result = default_pipeline()
        .process_input(&source, &input("DRAFT", "512p", "Space Mono"))
        .unwrap();
    let layout = result.layout.unwrap();
    assert_eq!(layout.scale_factor, 1.0);
    assert_eq!(layout.font_size_px, 24);
    assert_eq!(layout.char_width, 14);
    assert_eq!(layout.watermark_width, 70);
    assert_eq!(layout.diagonal_length, 977);
    assert_eq!((layout.num_cols, layout.num_rows), (12, 23));
}

// Test: Unknown font still produces both variants
#[test]
fn test_unknown_font_falls_back() {
    let source = SourceImage::new(png(64, 64));
    let watermark = input("PROOF", "512p", "Comic Sans");
    assert_eq!(watermark.validate().unwrap().font(), FontId::SpaceMono);

    let result = default_pipeline().process_input(&source, &watermark).unwrap();
    assert!(result.is_complete());
    assert_ne!(result.watermarked_bytes().unwrap(), result.optimized.data.as_slice());
}

// Test: Empty text fails before any image work
#[test]
fn test_empty_text_rejected() {
    let source = SourceImage::new(png(64, 64));
    let err = default_pipeline()
        .process_input(&source, &input("", "512p", "Space Mono"))
        .unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidWatermarkSpec { .. }));
    assert!(err.is_client_error());
}

// Test: Composite failure leaves the optimized variant intact
#[test]
fn test_independent_outputs() {
    let source = SourceImage::new(png(64, 48));
    let spec = WatermarkSpec::new("PROOF", FontId::SpaceMono, 30, QualityTier::P512).unwrap();
    let result = default_pipeline()
        .with_renderer(Arc::new(BrokenRenderer))
        .process(&source, &spec)
        .unwrap();

    assert!(!result.is_complete());
    assert!(matches!(
        result.watermarked,
        Err(ProcessingError::ProcessingFailure { .. })
    ));
    let optimized = image::load_from_memory(&result.optimized.data).unwrap();
    assert_eq!(optimized.dimensions(), (683, 512));
}

// Test: The overlay is blended onto the watermarked variant only
#[test]
fn test_overlay_lightens_watermarked_variant() {
    let source = SourceImage::new(png(64, 64));
    let spec = WatermarkSpec::new("PROOF", FontId::SpaceMono, 30, QualityTier::P512).unwrap();
    let result = default_pipeline()
        .with_renderer(Arc::new(FlatRenderer))
        .process(&source, &spec)
        .unwrap();

    let optimized = image::load_from_memory(&result.optimized.data).unwrap().to_rgba8();
    let watermarked = image::load_from_memory(result.watermarked_bytes().unwrap())
        .unwrap()
        .to_rgba8();

    let brightness = |img: &RgbaImage| -> u64 {
        img.pixels()
            .map(|p| p[0] as u64 + p[1] as u64 + p[2] as u64)
            .sum()
    };
    assert!(brightness(&watermarked) > brightness(&optimized));
}

// Test: The built-in rasterizer lightens the watermarked variant with text
#[test]
fn test_rasterized_text_marks_watermarked_variant() {
    let source = SourceImage::new(png(64, 64));
    let spec = WatermarkSpec::new("PROOF", FontId::SpaceMono, 90, QualityTier::P512).unwrap();
    let result = default_pipeline().process(&source, &spec).unwrap();
    assert!(result.is_complete());

    let optimized = image::load_from_memory(&result.optimized.data).unwrap().to_rgba8();
    let watermarked = image::load_from_memory(result.watermarked_bytes().unwrap())
        .unwrap()
        .to_rgba8();
    let sum = |p: &image::Rgba<u8>| p[0] as i32 + p[1] as i32 + p[2] as i32;
    let lighter = optimized
        .pixels()
        .zip(watermarked.pixels())
        .filter(|(o, w)| sum(w) > sum(o) + 60)
        .count();
    assert!(lighter > 1000, "only {} pixels carry the overlay", lighter);
}

// Test: Without any font face the watermarked variant is withheld, never unmarked
#[test]
fn test_no_fonts_withholds_watermarked_variant() {
    let pipeline = Pipeline::new(
        PipelineConfig::default(),
        SourceLimits::default(),
        FontRegistry::empty(),
    );
    let spec = WatermarkSpec::new("PROOF", FontId::SpaceMono, 90, QualityTier::P512).unwrap();
    let result = pipeline.process(&SourceImage::new(png(64, 64)), &spec).unwrap();

    assert!(!result.is_complete());
    assert!(result.watermarked_bytes().is_none());
    assert!(matches!(
        result.watermarked,
        Err(ProcessingError::ProcessingFailure { .. })
    ));
}
