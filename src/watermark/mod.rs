//! Watermark module for the tiled, rotated text overlay.
//!
//! Every watermarked variant carries the same kind of pattern: the
//! watermark text repeated on a staggered grid, rotated 45° and blended
//! over the whole image in translucent white.
//!
//! # Features
//!
//! - **Validated parameters**: text 1-15 characters, opacity 10-90%, tier
//! - **Six monospace families**, unknown names fall back to Space Mono
//! - **Resolution-aware typography** scaled from a 512px reference
//! - **Full coverage** of any aspect ratio after rotation
//!
//! # Flow
//!
//! ```text
//! WatermarkSpec + (width, height)
//!     -> TileLayout (geometry)
//!     -> Overlay (SVG markup)
//!     -> Compositor (rasterize, blend "over", encode)
//! ```

pub mod compositor;
pub mod fonts;
pub mod layout;
pub mod overlay;
pub mod spec;

// Re-export main types for convenience
pub use compositor::{Compositor, OverlayRenderer, SvgRasterizer};
pub use fonts::{FontConfig, FontRegistry};
pub use layout::{GlyphPosition, TileLayout, TilingConfig};
pub use overlay::{escape_xml, Overlay};
pub use spec::{FontId, WatermarkInput, WatermarkSpec};
