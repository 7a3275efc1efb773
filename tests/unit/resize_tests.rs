// Resize dimension tests

use proofmark::image_optimizer::{
    plan_dimensions, target_dimensions, ImageMetadata, QualityTier, ResizeMode, SourceFormat,
};
use proptest::prelude::*;
use rstest::rstest;

fn metadata(width: u32, height: u32) -> ImageMetadata {
    ImageMetadata {
        width,
        height,
        format: SourceFormat::Png,
        has_alpha: false,
    }
}

// Test: 4000x3000 at 1080p keeps 4:3 with the short edge at the target
#[test]
fn test_landscape_4000x3000_at_1080p() {
    assert_eq!(target_dimensions(4000, 3000, QualityTier::P1080), (1440, 1080));
}

#[rstest]
#[case(3000, 4000, QualityTier::P1080, (1080, 1440))]
#[case(1000, 1000, QualityTier::K2, (1440, 1440))]
#[case(1920, 1080, QualityTier::P512, (910, 512))]
#[case(6000, 4000, QualityTier::K4, (3240, 2160))]
fn test_target_dimensions(
    #[case] width: u32,
    #[case] height: u32,
    #[case] tier: QualityTier,
    #[case] expected: (u32, u32),
) {
    assert_eq!(target_dimensions(width, height, tier), expected);
}

// Test: Fill upscales small sources, FitNoEnlarge keeps them
#[test]
fn test_resize_modes_on_small_source() {
    let small = metadata(400, 300);
    assert_eq!(
        plan_dimensions(&small, QualityTier::P1080, ResizeMode::Fill),
        (1440, 1080)
    );
    assert_eq!(
        plan_dimensions(&small, QualityTier::P1080, ResizeMode::FitNoEnlarge),
        (400, 300)
    );
}

// Test: Both modes agree when the source is large enough
#[test]
fn test_resize_modes_agree_on_large_source() {
    let large = metadata(4000, 3000);
    assert_eq!(
        plan_dimensions(&large, QualityTier::P1080, ResizeMode::Fill),
        plan_dimensions(&large, QualityTier::P1080, ResizeMode::FitNoEnlarge)
    );
}

proptest! {
    // Test: Aspect ratio is preserved to within one pixel
    #[test]
    fn prop_aspect_ratio_preserved(
        width in 1u32..8000,
        height in 1u32..8000,
        tier in prop::sample::select(QualityTier::ALL.to_vec()),
    ) {
        let (new_width, new_height) = target_dimensions(width, height, tier);
        let target = tier.target_size();
        if width > height {
            prop_assert_eq!(new_height, target);
            let exact = target as f64 * width as f64 / height as f64;
            prop_assert!((new_width as f64 - exact).abs() <= 1.0);
        } else {
            prop_assert_eq!(new_width, target);
            let exact = target as f64 * height as f64 / width as f64;
            prop_assert!((new_height as f64 - exact).abs() <= 1.0);
        }
    }

    // Test: FitNoEnlarge never exceeds the source on either axis
    #[test]
    fn prop_fit_no_enlarge_never_upscales(
        width in 1u32..8000,
        height in 1u32..8000,
        tier in prop::sample::select(QualityTier::ALL.to_vec()),
    ) {
        let (new_width, new_height) =
            plan_dimensions(&metadata(width, height), tier, ResizeMode::FitNoEnlarge);
        prop_assert!(new_width <= width && new_height <= height);
    }
}
