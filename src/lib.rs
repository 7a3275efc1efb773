// Proofmark image pipeline library
// Resizes photos to a quality tier and produces an optimized and a
// watermarked WebP variant of each.

pub mod album;
pub mod config;
pub mod constants;
pub mod error;
pub mod image_optimizer;
pub mod logging;
pub mod pipeline; // decode -> resize -> encode | overlay -> composite
pub mod service;
pub mod storage;
pub mod watermark;

pub use error::{ProcessingError, ServiceError};
pub use image_optimizer::{QualityTier, ResizeMode, SourceImage};
pub use pipeline::{Pipeline, PipelineConfig, ProcessedImagePair};
pub use service::{BatchReport, ProcessedObject, ProcessingService, ServiceConfig};
pub use watermark::{FontId, FontRegistry, TileLayout, WatermarkInput, WatermarkSpec};
