//! Vector markup for the tiled text pattern.
//!
//! The overlay is a plain SVG document the size of the canvas: one group
//! carrying the rotation transform and the text style, and one `<text>`
//! element per grid cell.

use std::fmt::Write;

use super::layout::TileLayout;
use crate::constants::ROTATION_DEGREES;
use crate::error::ProcessingError;

/// SVG overlay plus the geometry it was generated from
#[derive(Debug, Clone)]
pub struct Overlay {
    pub markup: String,
    pub layout: TileLayout,
}

impl Overlay {
    /// Build the overlay markup for `text` on the given layout.
    ///
    /// `font_family` is used verbatim as the CSS `font-family` value.
    /// `opacity` is the fill alpha in `0.0..=1.0`.
    pub fn build(
        layout: TileLayout,
        text: &str,
        font_family: &str,
        opacity: f32,
    ) -> Result<Self, ProcessingError> {
        let markup = render_markup(&layout, text, font_family, opacity)
            .map_err(|e| ProcessingError::failure("overlay", e.to_string()))?;
        Ok(Self { markup, layout })
    }

    pub fn width(&self) -> u32 {
        self.layout.canvas_width
    }

    pub fn height(&self) -> u32 {
        self.layout.canvas_height
    }
}

/// The group transform: centre, rotate, move the grid centre onto the pivot.
pub fn transform_attribute(layout: &TileLayout) -> String {
    let (cx, cy) = layout.center();
    let half = layout.diagonal_length as f64 / 2.0;
    format!(
        "translate({} {}) rotate({}) translate({} {})",
        cx, cy, ROTATION_DEGREES, -half, -half
    )
}

fn render_markup(
    layout: &TileLayout,
    text: &str,
    font_family: &str,
    opacity: f32,
) -> Result<String, std::fmt::Error> {
    let text = escape_xml(text);
    let font_family = escape_xml(font_family);

    // Roughly 48 bytes of markup per element plus the text itself
    let capacity = layout.glyph_count() as usize * (48 + text.len()) + 512;
    let mut svg = String::with_capacity(capacity);

    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = layout.canvas_width,
        h = layout.canvas_height
    )?;
    write!(
        svg,
        r##"<g transform="{}" font-family="{}" font-size="{}" fill="#ffffff" fill-opacity="{}">"##,
        transform_attribute(layout),
        font_family,
        layout.font_size_px,
        opacity.clamp(0.0, 1.0)
    )?;

    for glyph in layout.glyph_positions() {
        write!(svg, r#"<text x="{}" y="{}">{}</text>"#, glyph.x, glyph.y, text)?;
    }

    svg.push_str("</g></svg>");
    Ok(svg)
}

/// Escape the five XML special characters.
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
