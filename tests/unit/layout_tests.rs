// Tile layout geometry tests

use proofmark::image_optimizer::QualityTier;
use proofmark::watermark::{TileLayout, TilingConfig};
use proptest::prelude::*;

fn any_tier() -> impl Strategy<Value = QualityTier> {
    prop::sample::select(QualityTier::ALL.to_vec())
}

// Test: "DRAFT" at 512p uses the unscaled base metrics
#[test]
fn test_draft_at_512p_base_metrics() {
    let layout = TileLayout::compute(5, QualityTier::P512, 512, 512, &TilingConfig::default()).unwrap();
    assert_eq!(layout.scale_factor, 1.0);
    assert_eq!(layout.font_size_px, 24);
    assert_eq!(layout.char_width, 14);
    assert_eq!(layout.watermark_width, 70);
}

// Test: Metrics scale with the tier
#[test]
fn test_metrics_scale_with_tier() {
    let layout = TileLayout::compute(5, QualityTier::K4, 3840, 2160, &TilingConfig::default()).unwrap();
    // 2160 / 512 = 4.21875
    assert_eq!(layout.font_size_px, 101);
    assert_eq!(layout.char_width, 59);
    assert_eq!(layout.watermark_width, 295);
    assert_eq!(layout.vertical_spacing, 118);
    assert!(layout.covers_canvas());
}

// Test: Smaller margin yields fewer rows and columns
#[test]
fn test_grid_margin_is_added_to_both_axes() {
    let wide = TilingConfig::default();
    let narrow = TilingConfig {
        grid_margin: 2,
        ..TilingConfig::default()
    };
    let a = TileLayout::compute(8, QualityTier::P1080, 1920, 1080, &wide).unwrap();
    let b = TileLayout::compute(8, QualityTier::P1080, 1920, 1080, &narrow).unwrap();
    assert_eq!(a.num_cols, b.num_cols + 2);
    assert_eq!(a.num_rows, b.num_rows + 2);
    assert!(b.covers_canvas());
}

// Test: Layout serializes with the documented field names
#[test]
fn test_layout_json_fields() {
    let layout = TileLayout::compute(5, QualityTier::P512, 512, 512, &TilingConfig::default()).unwrap();
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["font_size_px"], 24);
    assert_eq!(json["num_cols"], layout.num_cols);
    assert_eq!(json["diagonal_length"], layout.diagonal_length);
}

proptest! {
    // Test: The rotated grid covers every canvas corner for any input
    #[test]
    fn prop_layout_covers_canvas(
        width in 1u32..8000,
        height in 1u32..8000,
        text_len in 1usize..=15,
        tier in any_tier(),
    ) {
        let layout = TileLayout::compute(text_len, tier, width, height, &TilingConfig::default()).unwrap();
        prop_assert!(layout.covers_canvas());
        prop_assert!(
            layout.num_cols >= layout.diagonal_length.div_ceil(layout.total_horizontal_space)
        );
        prop_assert!(
            layout.num_rows >= layout.diagonal_length.div_ceil(layout.total_vertical_space)
        );
    }

    // Test: The diagonal always includes the safety margin
    #[test]
    fn prop_diagonal_exceeds_canvas_diagonal(
        width in 1u32..8000,
        height in 1u32..8000,
        tier in any_tier(),
    ) {
        let layout = TileLayout::compute(10, tier, width, height, &TilingConfig::default()).unwrap();
        let hypot = (width as f64).hypot(height as f64);
        let margin = 2 * layout.total_horizontal_space.max(layout.total_vertical_space);
        prop_assert!(layout.diagonal_length as f64 >= hypot + margin as f64);
    }
}
