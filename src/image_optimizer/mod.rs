//! Image optimization module
//!
//! Turns a source buffer of any common raster format into the resized pixel
//! buffer shared by both output variants, and encodes it:
//! - Header probe and full decode with graceful handling of broken metadata
//! - Source limits checked before the pixel buffer is allocated
//! - Tier-driven, aspect-preserving Lanczos3 resize
//! - Lossy WebP encoding
//!
//! # Tiers
//!
//! ```text
//! 512p  -> 512
//! 1080p -> 1080
//! 2K    -> 1440
//! 4K    -> 2160
//! ```

pub mod decoder;
pub mod encoder;
pub mod limits;
pub mod params;
pub mod resizer;

// Re-export commonly used types
pub use decoder::{
    decode, declared_type_matches, probe, DecodedImage, ImageMetadata, SourceFormat, SourceImage,
};
pub use encoder::{EncodedImage, EncoderQuality, ImageEncoder, WebPEncoder};
pub use limits::SourceLimits;
pub use params::{QualityTier, ResizeMode};
pub use resizer::{plan_dimensions, resize, target_dimensions, ResizedImage};
