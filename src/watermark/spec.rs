//! Watermark rendering parameters
//!
//! `WatermarkInput` is what callers hand over (album settings, CLI flags,
//! JSON). `WatermarkSpec` is the validated form the pipeline works with; it
//! can only be built through validation, so a spec in hand is always valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::constants::{
    DEFAULT_FONT, DEFAULT_OPACITY_PERCENT, DEFAULT_TIER, DEFAULT_WATERMARK_TEXT,
    MAX_OPACITY_PERCENT, MAX_WATERMARK_LENGTH, MIN_OPACITY_PERCENT,
};
use crate::error::ProcessingError;
use crate::image_optimizer::QualityTier;

/// Supported monospace font families
///
/// The glyph advance approximation in the tile layout only holds for
/// monospace faces, so the table is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontId {
    #[default]
    SpaceMono,
    RobotoMono,
    SourceCodePro,
    JetBrainsMono,
    IbmPlexMono,
    CutiveMono,
}

impl FontId {
    /// All families; the first one is the fallback.
    pub const ALL: [FontId; 6] = [
        FontId::SpaceMono,
        FontId::RobotoMono,
        FontId::SourceCodePro,
        FontId::JetBrainsMono,
        FontId::IbmPlexMono,
        FontId::CutiveMono,
    ];

    pub fn family_name(&self) -> &'static str {
        match self {
            FontId::SpaceMono => "Space Mono",
            FontId::RobotoMono => "Roboto Mono",
            FontId::SourceCodePro => "Source Code Pro",
            FontId::JetBrainsMono => "JetBrains Mono",
            FontId::IbmPlexMono => "IBM Plex Mono",
            FontId::CutiveMono => "Cutive Mono",
        }
    }

    /// Font file expected in the configured font directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            FontId::SpaceMono => "SpaceMono-Regular.ttf",
            FontId::RobotoMono => "RobotoMono-Regular.ttf",
            FontId::SourceCodePro => "SourceCodePro-Regular.ttf",
            FontId::JetBrainsMono => "JetBrainsMono-Regular.ttf",
            FontId::IbmPlexMono => "IBMPlexMono-Regular.ttf",
            FontId::CutiveMono => "CutiveMono-Regular.ttf",
        }
    }

    /// CSS `font-family` value for the overlay markup.
    ///
    /// The generic `monospace` entry picks up the embedded face when the
    /// family itself is not installed.
    pub fn css_family(&self) -> String {
        format!("'{}', monospace", self.family_name())
    }

    /// Resolve a font name, falling back to the first family.
    ///
    /// Matching ignores case, spaces, hyphens and underscores, so
    /// "Space Mono", "space-mono" and "SpaceMono" all resolve.
    pub fn resolve(name: &str) -> FontId {
        let wanted = normalize_font_name(name);
        match FontId::ALL
            .iter()
            .find(|font| normalize_font_name(font.family_name()) == wanted)
        {
            Some(font) => *font,
            None => {
                debug!(requested = %name, fallback = %FontId::default(), "Unknown font, using fallback");
                FontId::default()
            }
        }
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family_name())
    }
}

fn normalize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Unvalidated watermark settings as supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkInput {
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_opacity_percent")]
    pub opacity_percent: i64,
}

fn default_text() -> String {
    DEFAULT_WATERMARK_TEXT.to_string()
}

fn default_tier() -> String {
    DEFAULT_TIER.to_string()
}

fn default_font() -> String {
    DEFAULT_FONT.to_string()
}

fn default_opacity_percent() -> i64 {
    DEFAULT_OPACITY_PERCENT as i64
}

impl Default for WatermarkInput {
    fn default() -> Self {
        Self {
            text: default_text(),
            tier: default_tier(),
            font: default_font(),
            opacity_percent: default_opacity_percent(),
        }
    }
}

impl WatermarkInput {
    pub fn validate(&self) -> Result<WatermarkSpec, ProcessingError> {
        WatermarkSpec::try_from(self)
    }
}

/// Validated watermark parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatermarkSpec {
    text: String,
    font: FontId,
    opacity_percent: u8,
    tier: QualityTier,
}

impl WatermarkSpec {
    /// Validate text and opacity for an already parsed tier.
    pub fn new(
        text: impl Into<String>,
        font: FontId,
        opacity_percent: i64,
        tier: QualityTier,
    ) -> Result<Self, ProcessingError> {
        let text = text.into();
        validate_text(&text)?;
        let opacity_percent = validate_opacity(opacity_percent)?;

        Ok(Self {
            text,
            font,
            opacity_percent,
            tier,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text length in characters.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn font(&self) -> FontId {
        self.font
    }

    pub fn opacity_percent(&self) -> u8 {
        self.opacity_percent
    }

    /// Opacity as a 0.0-1.0 fill alpha.
    pub fn opacity(&self) -> f32 {
        self.opacity_percent as f32 / 100.0
    }

    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    /// Same spec with another tier.
    pub fn with_tier(mut self, tier: QualityTier) -> Self {
        self.tier = tier;
        self
    }
}

impl TryFrom<&WatermarkInput> for WatermarkSpec {
    type Error = ProcessingError;

    fn try_from(input: &WatermarkInput) -> Result<Self, Self::Error> {
        validate_text(&input.text)?;
        let opacity_percent = validate_opacity(input.opacity_percent)?;
        let tier = input.tier.parse::<QualityTier>()?;

        Ok(Self {
            text: input.text.clone(),
            font: FontId::resolve(&input.font),
            opacity_percent,
            tier,
        })
    }
}

impl TryFrom<WatermarkInput> for WatermarkSpec {
    type Error = ProcessingError;

    fn try_from(input: WatermarkInput) -> Result<Self, Self::Error> {
        WatermarkSpec::try_from(&input)
    }
}

fn validate_text(text: &str) -> Result<(), ProcessingError> {
    if text.trim().is_empty() {
        return Err(ProcessingError::invalid_spec("text", "must not be empty"));
    }

    let len = text.chars().count();
    if len > MAX_WATERMARK_LENGTH {
        return Err(ProcessingError::invalid_spec(
            "text",
            format!(
                "{} characters exceeds maximum of {}",
                len, MAX_WATERMARK_LENGTH
            ),
        ));
    }

    // Glyphs are laid out on a single line
    if text.chars().any(char::is_control) {
        return Err(ProcessingError::invalid_spec(
            "text",
            "must not contain control characters",
        ));
    }

    Ok(())
}

fn validate_opacity(opacity_percent: i64) -> Result<u8, ProcessingError> {
    let range = MIN_OPACITY_PERCENT as i64..=MAX_OPACITY_PERCENT as i64;
    if !range.contains(&opacity_percent) {
        return Err(ProcessingError::invalid_spec(
            "opacity",
            format!(
                "{}% is outside {}..={}%",
                opacity_percent, MIN_OPACITY_PERCENT, MAX_OPACITY_PERCENT
            ),
        ));
    }
    Ok(opacity_percent as u8)
}
