//! Tile layout geometry for the diagonal text pattern.
//!
//! The overlay is a staggered ("brick") grid of repeated text, built in its
//! own grid space and then rotated 45° around the canvas centre. The grid
//! is a square with side `diagonal_length`, which is longer than the canvas
//! diagonal by a safety margin, so every canvas pixel lands inside the
//! rotated grid.
//!
//! # Geometry
//!
//! ```text
//! scale_factor        = tier.target_size / 512
//! font_size_px        = round(24 * scale_factor)
//! char_width          = round(14 * scale_factor)
//! watermark_width     = text_len * char_width
//! horizontal_spacing  = k_h * char_width
//! vertical_spacing    = 2 * char_width
//! total_h             = watermark_width + horizontal_spacing
//! total_v             = font_size_px + vertical_spacing
//! diagonal_length     = ceil(hypot(w, h)) + 2 * max(total_h, total_v)
//! num_cols            = ceil(diagonal_length / total_h) + margin
//! num_rows            = ceil(diagonal_length / total_v) + margin
//! ```
//!
//! Glyph `(row, col)` sits at `(col * total_h + (row odd ? total_h / 2 : 0),
//! row * total_v)`. The grid is mapped to the canvas with
//! `translate(w/2, h/2) rotate(45) translate(-d/2, -d/2)`.
//!
//! # Example
//!
//! ```ignore
//! use proofmark::watermark::layout::{TileLayout, TilingConfig};
//! use proofmark::image_optimizer::QualityTier;
//!
//! let layout = TileLayout::compute(5, QualityTier::P512, 512, 512, &TilingConfig::default())?;
//! assert_eq!(layout.watermark_width, 70);
//! assert!(layout.covers_canvas());
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_CHAR_WIDTH_PX, BASE_FONT_SIZE_PX, DEFAULT_GRID_MARGIN, DEFAULT_HORIZONTAL_SPACING_FACTOR,
    ROTATION_DEGREES, VERTICAL_SPACING_FACTOR,
};
use crate::error::ProcessingError;
use crate::image_optimizer::QualityTier;

/// Tunable tiling constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Gap between repeated texts on a row, in glyph advances (`k_h`)
    #[serde(default = "default_horizontal_spacing_factor")]
    pub horizontal_spacing_factor: u32,
    /// Extra rows and columns beyond the diagonal coverage
    #[serde(default = "default_grid_margin")]
    pub grid_margin: u32,
}

fn default_horizontal_spacing_factor() -> u32 {
    DEFAULT_HORIZONTAL_SPACING_FACTOR
}

fn default_grid_margin() -> u32 {
    DEFAULT_GRID_MARGIN
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing_factor: DEFAULT_HORIZONTAL_SPACING_FACTOR,
            grid_margin: DEFAULT_GRID_MARGIN,
        }
    }
}

/// Computed tile grid for one canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scale_factor: f64,
    pub font_size_px: u32,
    pub char_width: u32,
    pub watermark_width: u32,
    pub horizontal_spacing: u32,
    pub vertical_spacing: u32,
    pub total_horizontal_space: u32,
    pub total_vertical_space: u32,
    pub diagonal_length: u32,
    pub num_rows: u32,
    pub num_cols: u32,
}

/// Position of one text element in grid space (`y` is the baseline)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPosition {
    pub row: u32,
    pub col: u32,
    pub x: f64,
    pub y: f64,
}

impl TileLayout {
    /// Compute the layout for a text of `text_len` characters on a
    /// `width x height` canvas.
    pub fn compute(
        text_len: usize,
        tier: QualityTier,
        width: u32,
        height: u32,
        config: &TilingConfig,
    ) -> Result<Self, ProcessingError> {
        if text_len == 0 {
            return Err(ProcessingError::invalid_spec("text", "must not be empty"));
        }
        if width == 0 || height == 0 {
            return Err(ProcessingError::failure(
                "layout",
                format!("canvas is {}x{}", width, height),
            ));
        }
        if config.horizontal_spacing_factor == 0 {
            return Err(ProcessingError::failure(
                "layout",
                "horizontal spacing factor must be at least 1",
            ));
        }

        let scale_factor = tier.scale_factor();
        let font_size_px = (BASE_FONT_SIZE_PX * scale_factor).round() as u32;
        let char_width = (BASE_CHAR_WIDTH_PX * scale_factor).round() as u32;
        let watermark_width = text_len as u32 * char_width;

        let horizontal_spacing = config.horizontal_spacing_factor * char_width;
        let vertical_spacing = VERTICAL_SPACING_FACTOR * char_width;
        let total_horizontal_space = watermark_width + horizontal_spacing;
        let total_vertical_space = font_size_px + vertical_spacing;

        let hypot = (width as f64).hypot(height as f64).ceil() as u32;
        let safety = 2 * total_horizontal_space.max(total_vertical_space);
        let diagonal_length = hypot + safety;

        let num_cols = diagonal_length.div_ceil(total_horizontal_space) + config.grid_margin;
        let num_rows = diagonal_length.div_ceil(total_vertical_space) + config.grid_margin;

        Ok(Self {
            canvas_width: width,
            canvas_height: height,
            scale_factor,
            font_size_px,
            char_width,
            watermark_width,
            horizontal_spacing,
            vertical_spacing,
            total_horizontal_space,
            total_vertical_space,
            diagonal_length,
            num_rows,
            num_cols,
        })
    }

    pub fn glyph_count(&self) -> u64 {
        self.num_rows as u64 * self.num_cols as u64
    }

    /// Horizontal shift of a row (odd rows move by half a cell).
    pub fn row_offset(&self, row: u32) -> f64 {
        if row % 2 == 1 {
            self.total_horizontal_space as f64 / 2.0
        } else {
            0.0
        }
    }

    /// Grid-space positions of every text element, row by row.
    pub fn glyph_positions(&self) -> impl Iterator<Item = GlyphPosition> + '_ {
        (0..self.num_rows).flat_map(move |row| {
            let offset = self.row_offset(row);
            (0..self.num_cols).map(move |col| GlyphPosition {
                row,
                col,
                x: col as f64 * self.total_horizontal_space as f64 + offset,
                y: row as f64 * self.total_vertical_space as f64,
            })
        })
    }

    /// Canvas centre, the pivot of the rotation.
    pub fn center(&self) -> (f64, f64) {
        (
            self.canvas_width as f64 / 2.0,
            self.canvas_height as f64 / 2.0,
        )
    }

    /// Map a grid-space point onto the canvas.
    pub fn to_canvas_space(&self, u: f64, v: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let half = self.diagonal_length as f64 / 2.0;
        let (sin, cos) = ROTATION_DEGREES.to_radians().sin_cos();
        let (gx, gy) = (u - half, v - half);
        (cx + gx * cos - gy * sin, cy + gx * sin + gy * cos)
    }

    /// Map a canvas point back into grid space.
    pub fn to_grid_space(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let half = self.diagonal_length as f64 / 2.0;
        let (sin, cos) = ROTATION_DEGREES.to_radians().sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        (dx * cos + dy * sin + half, -dx * sin + dy * cos + half)
    }

    /// Grid cell `(row, col)` containing a grid-space point, if the grid has one.
    pub fn cell_at(&self, u: f64, v: f64) -> Option<(u32, u32)> {
        if u < 0.0 || v < 0.0 {
            return None;
        }
        let row = (v / self.total_vertical_space as f64).floor();
        if row >= self.num_rows as f64 {
            return None;
        }
        let row = row as u32;

        let shifted = u - self.row_offset(row);
        if shifted < 0.0 {
            return None;
        }
        let col = (shifted / self.total_horizontal_space as f64).floor();
        if col >= self.num_cols as f64 {
            return None;
        }
        Some((row, col as u32))
    }

    /// Whether the rotated grid covers the whole canvas.
    ///
    /// The grid-to-canvas mapping is affine, so checking the four canvas
    /// corners is enough.
    pub fn covers_canvas(&self) -> bool {
        let (w, h) = (self.canvas_width as f64, self.canvas_height as f64);
        [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
            .into_iter()
            .all(|(x, y)| {
                let (u, v) = self.to_grid_space(x, y);
                self.cell_at(u, v).is_some()
            })
    }

    /// Largest distance between neighbouring text origins, in canvas pixels.
    pub fn max_tile_gap(&self) -> f64 {
        (self.total_horizontal_space as f64).hypot(self.total_vertical_space as f64)
    }
}
