//! Background and foreground color derivation.

use palette::Srgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::digest::Digest;

/// Offset of the foreground color within the digest.
pub const FOREGROUND_OFFSET: usize = 56;

/// Length of a full hex color code (without `#`).
const HEX6_LEN: usize = 6;

/// `127 * 3`: a channel sum above this has a mean above 127.
const LIGHT_SUM_FLOOR: u16 = 381;

// ============================================================================
// Color
// ============================================================================

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `rgb` or `rrggbb`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let code = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(code.len(), 3 | HEX6_LEN) || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }

        let rgb: Srgb<u8> = code
            .parse()
            .map_err(|_| ColorError::InvalidHex(hex.to_string()))?;
        Ok(rgb.into())
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Sum of absolute per-channel differences (0..=765).
    pub fn channel_distance(&self, other: &Color) -> u16 {
        u16::from(self.r.abs_diff(other.r))
            + u16::from(self.g.abs_diff(other.g))
            + u16::from(self.b.abs_diff(other.b))
    }

    /// Sum of the three channels (0..=765).
    pub fn channel_sum(&self) -> u16 {
        u16::from(self.r) + u16::from(self.g) + u16::from(self.b)
    }

    /// Whether the exact channel mean is above 127.
    ///
    /// Compared on the sum so that means like 127.33 count as light.
    pub fn is_light(&self) -> bool {
        self.channel_sum() > LIGHT_SUM_FLOOR
    }

    fn darken(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_sub(amount),
            self.g.saturating_sub(amount),
            self.b.saturating_sub(amount),
        )
    }

    fn lighten(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_add(amount),
            self.g.saturating_add(amount),
            self.b.saturating_add(amount),
        )
    }
}

impl From<Srgb<u8>> for Color {
    fn from(rgb: Srgb<u8>) -> Self {
        Self::new(rgb.red, rgb.green, rgb.blue)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        image::Rgb([color.r, color.g, color.b])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
}

// ============================================================================
// Derivation
// ============================================================================

/// Parses the user supplied background color.
pub fn background_color(hex: &str) -> Result<Color, ColorError> {
    Color::from_hex(hex)
}

/// Reads the raw foreground color out of the digest, before any contrast fix.
pub fn raw_foreground(digest: &Digest) -> Result<Color, ColorError> {
    let code = digest
        .slice(FOREGROUND_OFFSET, HEX6_LEN)
        .ok_or_else(|| ColorError::InvalidHex(digest.to_string()))?;
    Color::from_hex(code)
}

/// Derives the foreground color from the digest and makes sure it stands out
/// from `background`.
///
/// When the two colors are closer than `config.contrast_threshold`, every
/// channel is shifted by `config.contrast_shift`: darker on light backgrounds,
/// lighter on dark ones. The shift is applied once and not re-checked.
pub fn foreground_color(
    digest: &Digest,
    background: Color,
    config: &GeneratorConfig,
) -> Result<Color, ColorError> {
    let raw = raw_foreground(digest)?;
    Ok(ensure_contrast(raw, background, config))
}

/// Applies the single-pass contrast adjustment.
pub fn ensure_contrast(foreground: Color, background: Color, config: &GeneratorConfig) -> Color {
    if foreground.channel_distance(&background) >= config.contrast_threshold {
        return foreground;
    }

    if background.is_light() {
        foreground.darken(config.contrast_shift)
    } else {
        foreground.lighten(config.contrast_shift)
    }
}
