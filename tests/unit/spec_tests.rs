// Watermark settings validation tests

use proofmark::image_optimizer::QualityTier;
use proofmark::watermark::{FontId, WatermarkInput, WatermarkSpec};
use proofmark::ProcessingError;
use rstest::rstest;

fn input(text: &str, tier: &str, font: &str, opacity_percent: i64) -> WatermarkInput {
    WatermarkInput {
        text: text.to_string(),
        tier: tier.to_string(),
        font: font.to_string(),
        opacity_percent,
    }
}

fn invalid_field(err: ProcessingError) -> String {
    match err {
        ProcessingError::InvalidWatermarkSpec { field, .. } => field,
        other => panic!("expected InvalidWatermarkSpec, got {:?}", other),
    }
}

// Test: Unknown font falls back to the default family without an error
#[test]
fn test_unknown_font_falls_back() {
    let spec = input("PROOF", "1080p", "Comic Sans", 30).validate().unwrap();
    assert_eq!(spec.font(), FontId::SpaceMono);
}

// Test: Font names match loosely
#[rstest]
#[case("JetBrains Mono", FontId::JetBrainsMono)]
#[case("jetbrains-mono", FontId::JetBrainsMono)]
#[case("IBM_Plex_Mono", FontId::IbmPlexMono)]
#[case("cutivemono", FontId::CutiveMono)]
fn test_font_name_matching(#[case] name: &str, #[case] expected: FontId) {
    assert_eq!(FontId::resolve(name), expected);
}

#[rstest]
#[case("", "text")]
#[case("   ", "text")]
#[case("SIXTEEN_CHARS_XX", "text")]
#[case("TAB\tTAB", "text")]
fn test_invalid_text(#[case] text: &str, #[case] field: &str) {
    let err = input(text, "1080p", "Space Mono", 30).validate().unwrap_err();
    assert_eq!(invalid_field(err), field);
}

#[rstest]
#[case(9)]
#[case(91)]
#[case(-30)]
#[case(i64::MAX)]
fn test_invalid_opacity(#[case] opacity: i64) {
    let err = input("PROOF", "1080p", "Space Mono", opacity).validate().unwrap_err();
    assert_eq!(invalid_field(err), "opacity");
}

// Test: Opacity bounds are inclusive
#[rstest]
#[case(10)]
#[case(90)]
fn test_opacity_bounds_inclusive(#[case] opacity: i64) {
    let spec = input("PROOF", "1080p", "Space Mono", opacity).validate().unwrap();
    assert_eq!(spec.opacity_percent() as i64, opacity);
}

// Test: Unknown tiers are rejected with the tier field
#[test]
fn test_unknown_tier_rejected() {
    let err = input("PROOF", "8K", "Space Mono", 30).validate().unwrap_err();
    assert_eq!(invalid_field(err), "tier");
}

// Test: Fifteen multi-byte characters are accepted
#[test]
fn test_length_counts_characters() {
    let text = "ééééééééééééééé";
    assert_eq!(text.chars().count(), 15);
    let spec = input(text, "2K", "Space Mono", 30).validate().unwrap();
    assert_eq!(spec.text_len(), 15);
    assert_eq!(spec.tier(), QualityTier::K2);
}

// Test: Input deserializes with defaults for missing fields
#[test]
fn test_input_from_json_with_defaults() {
    let parsed: WatermarkInput = serde_json::from_str(r#"{"text": "CLIENT"}"#).unwrap();
    assert_eq!(parsed.text, "CLIENT");
    assert_eq!(parsed.tier, "1080p");
    assert_eq!(parsed.opacity_percent, 30);

    let spec = WatermarkSpec::try_from(parsed).unwrap();
    assert!((spec.opacity() - 0.3).abs() < f32::EPSILON);
}
