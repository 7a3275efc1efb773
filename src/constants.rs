// Constants module - centralized default values for the processing pipeline
//
// Tunable values that used to be re-derived per call site live here so the
// pipeline, the config layer and the tests agree on one table.

// =============================================================================
// Tiling geometry
// =============================================================================

/// Reference long edge the typography constants are expressed against.
pub const REFERENCE_RESOLUTION: f64 = 512.0;

/// Font size in pixels at the reference resolution.
pub const BASE_FONT_SIZE_PX: f64 = 24.0;

/// Approximate monospace glyph advance at `BASE_FONT_SIZE_PX`.
pub const BASE_CHAR_WIDTH_PX: f64 = 14.0;

/// Horizontal gap between repeated texts, in glyph advances (`k_h`).
pub const DEFAULT_HORIZONTAL_SPACING_FACTOR: u32 = 4;

/// Vertical gap between rows, in glyph advances.
pub const VERTICAL_SPACING_FACTOR: u32 = 2;

/// Extra rows/cols beyond the diagonal coverage. Values below 2 leave untiled
/// corners after rotation.
pub const DEFAULT_GRID_MARGIN: u32 = 4;

/// Smallest grid margin accepted by configuration validation.
pub const MIN_GRID_MARGIN: u32 = 2;

/// Rotation applied to the tiled grid, in degrees.
pub const ROTATION_DEGREES: f64 = 45.0;

// =============================================================================
// Watermark input bounds and fallbacks
// =============================================================================

/// Maximum watermark text length in characters.
pub const MAX_WATERMARK_LENGTH: usize = 15;

/// Lowest accepted opacity percentage.
pub const MIN_OPACITY_PERCENT: u8 = 10;

/// Highest accepted opacity percentage.
pub const MAX_OPACITY_PERCENT: u8 = 90;

/// Watermark text used when an album has none configured.
pub const DEFAULT_WATERMARK_TEXT: &str = "fotowinnow";

/// Tier used when an album has none configured.
pub const DEFAULT_TIER: &str = "1080p";

/// Font family used when an album has none configured.
pub const DEFAULT_FONT: &str = "Space Mono";

/// Opacity used when an album has none configured.
pub const DEFAULT_OPACITY_PERCENT: u8 = 30;

// =============================================================================
// Encoder defaults
// =============================================================================

/// Lossy quality for both output variants (1-100).
pub const DEFAULT_QUALITY: u8 = 80;

/// Compression effort (WebP method, 0-6, 6 = slowest/smallest).
pub const DEFAULT_EFFORT: u8 = 6;

/// Highest WebP compression method.
pub const MAX_EFFORT: u8 = 6;

/// Content type of every produced variant.
pub const OUTPUT_CONTENT_TYPE: &str = "image/webp";

/// File extension of every produced variant.
pub const OUTPUT_EXTENSION: &str = "webp";

// =============================================================================
// Source limits
// =============================================================================

/// Default maximum source size in bytes (50 MB)
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 50 * 1024 * 1024;

/// Default maximum source pixel count (100 megapixels)
pub const DEFAULT_MAX_SOURCE_PIXELS: u64 = 100_000_000;

/// Default maximum source width or height
pub const DEFAULT_MAX_SOURCE_DIMENSION: u32 = 20_000;

// =============================================================================
// Service defaults
// =============================================================================

/// Per-image processing timeout, sized for the 4K tier.
pub const DEFAULT_PROCESSING_TIMEOUT_SECS: u64 = 30;

/// Default number of images processed concurrently in a batch.
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

/// Key prefix of the optimized variant.
pub const DEFAULT_OPTIMIZED_PREFIX: &str = "optimized_";

/// Key prefix of the watermarked variant.
pub const DEFAULT_WATERMARKED_PREFIX: &str = "watermarked_";
