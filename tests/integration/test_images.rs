// Test image and service builders shared by the integration tests

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use proofmark::album::{AlbumSettings, AlbumSettingsCache, StaticAlbumSettings};
use proofmark::image_optimizer::SourceLimits;
use proofmark::storage::{ObjectSource, ObjectStore};
use proofmark::watermark::{FontRegistry, WatermarkInput};
use proofmark::{Pipeline, PipelineConfig, ProcessingService, ServiceConfig};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

/// Gradient image encoded in the given format
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 200) as u8, (y % 200) as u8, 40, 255])
    });
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Jpeg)
}

pub fn default_pipeline() -> Pipeline {
    Pipeline::new(
        PipelineConfig::default(),
        SourceLimits::default(),
        FontRegistry::embedded(),
    )
}

/// Defaults at the smallest tier to keep tests fast
pub fn small_defaults() -> WatermarkInput {
    WatermarkInput {
        text: "PROOF".to_string(),
        tier: "512p".to_string(),
        ..Default::default()
    }
}

pub fn build_service(
    pipeline: Pipeline,
    source: Arc<dyn ObjectSource>,
    store: Arc<dyn ObjectStore>,
    albums: HashMap<String, AlbumSettings>,
    config: ServiceConfig,
) -> ProcessingService {
    let cache = AlbumSettingsCache::new(Arc::new(StaticAlbumSettings::new(albums)));
    ProcessingService::new(
        Arc::new(pipeline),
        source,
        store,
        Arc::new(cache),
        config,
        small_defaults(),
    )
}
