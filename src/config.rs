//! Immutable generator configuration.

use serde::Deserialize;

use crate::format::ImageFormat;

const DEFAULT_SIZE: u32 = 250;
const MIN_SIZE: u32 = 50;
const MAX_SIZE: u32 = 500;
const DEFAULT_BACKGROUND: &str = "ffffff";
const CONTRAST_THRESHOLD: u16 = 50;
const CONTRAST_SHIFT: u8 = 100;
const CACHE_TTL_SECS: u64 = 3600;
const CACHE_KEY_PREFIX: &str = "identicon:";

/// Tunables for [`IdenticonGenerator`](crate::IdenticonGenerator).
///
/// Built once and shared read-only; the generator never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Edge length used when a request does not ask for one.
    pub default_size: u32,
    /// Smallest accepted edge length; smaller requests clamp up to it.
    pub min_size: u32,
    /// Largest accepted edge length; larger requests clamp down to it.
    pub max_size: u32,
    pub default_format: ImageFormat,
    /// 6-digit hex, without `#`.
    pub default_background: String,
    /// Channel-sum distance below which the foreground is adjusted.
    pub contrast_threshold: u16,
    /// Per-channel shift applied by the contrast adjustment.
    pub contrast_shift: u8,
    /// TTL for cached renders, also used for `max-age` and `Expires`.
    pub cache_ttl_secs: u64,
    pub cache_key_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_SIZE,
            min_size: MIN_SIZE,
            max_size: MAX_SIZE,
            default_format: ImageFormat::Png,
            default_background: DEFAULT_BACKGROUND.to_string(),
            contrast_threshold: CONTRAST_THRESHOLD,
            contrast_shift: CONTRAST_SHIFT,
            cache_ttl_secs: CACHE_TTL_SECS,
            cache_key_prefix: CACHE_KEY_PREFIX.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Clamps an integer edge length into `[min_size, max_size]`.
    pub fn clamp_size(&self, size: i64) -> u32 {
        size.clamp(i64::from(self.min_size), i64::from(self.max_size)) as u32
    }

    /// Truncates a fractional edge length toward zero, then clamps it.
    pub fn clamp_size_f64(&self, size: f64) -> u32 {
        if size.is_nan() {
            return self.default_size;
        }
        // `as` saturates for out-of-range floats.
        self.clamp_size(size.trunc() as i64)
    }
}
