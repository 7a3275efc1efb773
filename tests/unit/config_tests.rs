// Configuration loading tests

use proofmark::config::Config;
use proofmark::image_optimizer::ResizeMode;
use std::io::Write;
use tempfile::NamedTempFile;

// Test: Example configuration from the README parses and validates
#[test]
fn test_documented_config_is_valid() {
    let yaml = r#"
pipeline:
  resize_mode: fill
  horizontal_spacing_factor: 4
  grid_margin: 4
  quality: 80
  effort: 6
fonts:
  load_system_fonts: true
defaults:
  text: fotowinnow
  tier: 1080p
  font: Space Mono
  opacity_percent: 30
limits:
  max_source_bytes: 52428800
  max_source_pixels: 100000000
  max_source_dimension: 20000
service:
  timeout_secs: 30
  max_concurrent_jobs: 4
  key_prefix_optimized: optimized_
  key_prefix_watermarked: watermarked_
logging:
  level: info
  format: json
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config, Config::default());
    assert!(config.validate().is_ok());
}

// Test: Legacy fit-inside behaviour can be selected
#[test]
fn test_fit_no_enlarge_mode_from_yaml() {
    let config = Config::from_yaml_with_env("pipeline:\n  resize_mode: fit-no-enlarge\n").unwrap();
    assert_eq!(config.pipeline.resize_mode, ResizeMode::FitNoEnlarge);
}

// Test: Narrower grid margin of older deployments is still accepted
#[test]
fn test_grid_margin_two_is_valid() {
    let config = Config::from_yaml_with_env("pipeline:\n  grid_margin: 2\n").unwrap();
    assert!(config.validate().is_ok());
}

// Test: Env variables are substituted before parsing
#[test]
fn test_env_var_in_album_settings() {
    std::env::set_var("PROOFMARK_UNIT_ALBUM_TEXT", "CLIENT");
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "albums:\n  a1:\n    text: ${{PROOFMARK_UNIT_ALBUM_TEXT}}").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.albums["a1"].text.as_deref(), Some("CLIENT"));
    assert!(config.validate().is_ok());
}

// Test: Malformed YAML is reported, not panicked on
#[test]
fn test_malformed_yaml_is_error() {
    assert!(Config::from_yaml_with_env("pipeline: [unclosed").is_err());
}

// Test: Invalid logging filter fails validation
#[test]
fn test_invalid_logging_level_fails_validation() {
    let config = Config::from_yaml_with_env("logging:\n  level: \"proofmark=loud\"\n").unwrap();
    assert!(config.validate().unwrap_err().contains("logging.level"));
}
