// Overlay rasterization with the embedded face and with host fonts

use image::{Rgba, RgbaImage};
use proofmark::image_optimizer::{QualityTier, WebPEncoder};
use proofmark::watermark::{
    Compositor, FontConfig, FontId, FontRegistry, Overlay, OverlayRenderer, SvgRasterizer,
    TileLayout, TilingConfig,
};
use rstest::rstest;
use std::sync::Arc;

fn overlay(text: &str, tier: QualityTier, width: u32, height: u32) -> Overlay {
    let layout = TileLayout::compute(
        text.chars().count(),
        tier,
        width,
        height,
        &TilingConfig::default(),
    )
    .unwrap();
    Overlay::build(layout, text, &FontId::SpaceMono.css_family(), 0.3).unwrap()
}

// Test: Markup-significant characters in the text do not break rendering
#[test]
fn test_text_with_markup_characters_renders() {
    let overlay = overlay("<A&B> \"C\"", QualityTier::P512, 128, 96);
    assert!(!overlay.markup.contains("<A&B>"));

    let layer = SvgRasterizer::new(FontRegistry::embedded())
        .render(&overlay)
        .unwrap();
    assert_eq!(layer.dimensions(), (128, 96));
    assert!(layer.pixels().any(|p| p[3] > 0));
}

// Test: A registry without faces is a render failure, not a blank layer
#[test]
fn test_render_without_faces_fails() {
    let err = SvgRasterizer::new(FontRegistry::empty())
        .render(&overlay("PROOF", QualityTier::P512, 64, 64))
        .unwrap_err();
    assert_eq!(err.kind(), "processing_failure");
}

// Test: The overlay paints semi-transparent white text on every canvas shape
#[rstest]
#[case::square(QualityTier::P512, 256, 256, false)]
#[case::portrait(QualityTier::P512, 512, 910, false)]
#[case::extreme_aspect(QualityTier::P512, 512, 3072, false)]
#[case::uhd(QualityTier::K4, 3840, 2160, false)]
#[case::host_fonts(QualityTier::P512, 683, 512, true)]
fn test_rendered_text_is_white_and_translucent(
    #[case] tier: QualityTier,
    #[case] width: u32,
    #[case] height: u32,
    #[case] load_system_fonts: bool,
) {
    let fonts = FontRegistry::load(&FontConfig {
        dir: None,
        load_system_fonts,
    });
    let overlay = overlay("PROOF", tier, width, height);
    let layer = SvgRasterizer::new(fonts.clone()).render(&overlay).unwrap();
    assert_eq!(layer.dimensions(), (width, height));

    let painted: Vec<&Rgba<u8>> = layer.pixels().filter(|p| p[3] > 0).collect();
    assert!(!painted.is_empty());
    // 30% opacity caps coverage at 0.3 * 255
    assert!(painted.iter().all(|p| p[3] <= 77));
    assert!(painted.iter().all(|p| p[0] >= 240 && p[1] >= 240 && p[2] >= 240));

    let compositor = Compositor::new(Arc::new(SvgRasterizer::new(fonts)), Arc::new(WebPEncoder));
    let base = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    let blended = compositor.apply(&base, &overlay).unwrap();
    assert!(blended.pixels().any(|p| p[0] > 0));
    assert!(blended.pixels().all(|p| p[3] == 255));
}
