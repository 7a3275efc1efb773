// Pipeline tests through the public API

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use proofmark::image_optimizer::{QualityTier, ResizeMode, SourceImage, SourceLimits};
use proofmark::watermark::{FontRegistry, WatermarkInput};
use proofmark::{Pipeline, PipelineConfig, ProcessingError};
use std::io::Cursor;

fn jpeg_source(width: u32, height: u32) -> SourceImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 255) as u8, (y * 3 % 255) as u8, 128, 255])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .to_rgb8()
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .unwrap();
    SourceImage::new(buffer.into_inner()).with_content_type("image/jpeg")
}

fn pipeline(config: PipelineConfig) -> Pipeline {
    Pipeline::new(config, SourceLimits::default(), FontRegistry::embedded())
}

fn input(text: &str, tier: &str) -> WatermarkInput {
    WatermarkInput {
        text: text.to_string(),
        tier: tier.to_string(),
        ..Default::default()
    }
}

// Test: Both variants share dimensions and content type
#[test]
fn test_variants_share_dimensions() {
    let result = pipeline(PipelineConfig::default())
        .process_input(&jpeg_source(400, 300), &input("PROOF", "512p"))
        .unwrap();

    assert_eq!((result.width, result.height), (683, 512));
    assert_eq!(result.content_type, "image/webp");

    let optimized = image::load_from_memory(&result.optimized.data).unwrap();
    let watermarked = image::load_from_memory(result.watermarked_bytes().unwrap()).unwrap();
    assert_eq!((optimized.width(), optimized.height()), (683, 512));
    assert_eq!((watermarked.width(), watermarked.height()), (683, 512));
}

// Test: FitNoEnlarge keeps a small source at its own size
#[test]
fn test_fit_no_enlarge_pipeline() {
    let config = PipelineConfig {
        resize_mode: ResizeMode::FitNoEnlarge,
        ..Default::default()
    };
    let result = pipeline(config)
        .process_input(&jpeg_source(120, 80), &input("PROOF", "1080p"))
        .unwrap();
    assert_eq!((result.width, result.height), (120, 80));
    assert_eq!(result.layout.unwrap().canvas_width, 120);
}

// Test: Empty text fails before decoding, even for garbage bytes
#[test]
fn test_empty_text_rejected_before_decode() {
    let garbage = SourceImage::new(vec![0u8; 16]);
    let err = pipeline(PipelineConfig::default())
        .process_input(&garbage, &input("", "1080p"))
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessingError::InvalidWatermarkSpec { ref field, .. } if field == "text"
    ));
}

// Test: Oversized sources are rejected as invalid images
#[test]
fn test_source_byte_limit() {
    let limits = SourceLimits {
        max_source_bytes: 64,
        ..Default::default()
    };
    let pipeline = Pipeline::new(PipelineConfig::default(), limits, FontRegistry::embedded());
    let err = pipeline
        .process_input(&jpeg_source(64, 64), &input("PROOF", "512p"))
        .unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidImage { .. }));
}

// Test: Layout reported with the result matches the output canvas
#[test]
fn test_layout_matches_output() {
    let pipeline = pipeline(PipelineConfig::default());
    let result = pipeline
        .process_input(&jpeg_source(300, 400), &input("CLIENT", "512p"))
        .unwrap();
    let layout = result.layout.clone().unwrap();
    assert_eq!((layout.canvas_width, layout.canvas_height), (512, 683));

    let spec = input("CLIENT", "512p").validate().unwrap();
    assert_eq!(pipeline.layout_for(&spec, 512, 683).unwrap(), layout);
    assert_eq!(spec.tier(), QualityTier::P512);
}

// Test: Outputs wider than WebP can encode are rejected before any resize
#[test]
fn test_output_beyond_webp_limit_is_invalid_image() {
    // 1x33 at 512p plans a 512x16896 output
    let err = pipeline(PipelineConfig::default())
        .process_input(&jpeg_source(1, 33), &input("PROOF", "512p"))
        .unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidImage { .. }));
    assert!(err.to_string().contains("512x16896"));
}

// Test: The encodable side limit is inclusive
#[test]
fn test_output_side_limit_boundary() {
    let limits = SourceLimits::default();
    assert!(limits.validate_output_dimensions(512, 16_383).is_ok());
    // 1x32 at 512p plans 512x16384, one past the limit
    let err = pipeline(PipelineConfig::default())
        .process_input(&jpeg_source(1, 32), &input("PROOF", "512p"))
        .unwrap_err();
    assert!(err.to_string().contains("512x16384"));
}
