//! Render options and input validation.
//!
//! Two layers live here. [`RenderOptions`] is the core, forgiving view: sizes
//! clamp into range and backgrounds may use the 3-digit shorthand.
//! [`AvatarRequest::parse`] is the strict boundary check applied to raw
//! request input before any generation work starts.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::color::{Color, ColorError};
use crate::config::GeneratorConfig;
use crate::format::ImageFormat;

/// Longest accepted seed, in characters, after trimming.
pub const MAX_SEED_CHARS: usize = 255;

pub const FIELD_SEED: &str = "seed";
pub const FIELD_SIZE: &str = "size";
pub const FIELD_FORMAT: &str = "format";
pub const FIELD_BACKGROUND: &str = "background";

// ============================================================================
// ValidationError
// ============================================================================

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn messages_for(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first message recorded, in field-name order.
    pub fn first_message(&self) -> Option<&str> {
        self.fields
            .values()
            .flat_map(|msgs| msgs.iter())
            .map(String::as_str)
            .next()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        let mut sep = ": ";
        for (field, messages) in &self.fields {
            for message in messages {
                write!(f, "{sep}{field}: {message}")?;
                sep = "; ";
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// Seed
// ============================================================================

/// Checks that `seed` is non-empty and at most [`MAX_SEED_CHARS`] characters
/// once surrounding whitespace is ignored.
///
/// The seed itself is returned untouched.
pub fn validate_seed(seed: &str) -> Result<&str, ValidationError> {
    let trimmed = seed.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single(
            FIELD_SEED,
            "The seed field is required.",
        ));
    }
    if trimmed.chars().count() > MAX_SEED_CHARS {
        return Err(ValidationError::single(
            FIELD_SEED,
            format!("The seed may not be greater than {MAX_SEED_CHARS} characters."),
        ));
    }
    Ok(seed)
}

// ============================================================================
// RenderOptions
// ============================================================================

/// Everything besides the seed that shapes a render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderOptions {
    size: u32,
    format: ImageFormat,
    /// Normalized lowercase `rrggbb`.
    background: String,
}

impl RenderOptions {
    /// Options with every field at its configured default.
    pub fn defaults(config: &GeneratorConfig) -> Self {
        let background = normalize_background(&config.default_background)
            .unwrap_or_else(|_| "ffffff".to_string());
        Self {
            size: config.default_size,
            format: config.default_format,
            background,
        }
    }

    /// Sets the edge length, clamped into the configured range.
    pub fn with_size(mut self, size: i64, config: &GeneratorConfig) -> Self {
        self.size = config.clamp_size(size);
        self
    }

    /// Sets a fractional edge length; truncated, then clamped.
    pub fn with_size_f64(mut self, size: f64, config: &GeneratorConfig) -> Self {
        self.size = config.clamp_size_f64(size);
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the background from `rgb`/`rrggbb`, `#` optional.
    pub fn with_background(mut self, hex: &str) -> Result<Self, ColorError> {
        self.background = normalize_background(hex)?;
        Ok(self)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Background as normalized lowercase `rrggbb`.
    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn background_color(&self) -> Result<Color, ColorError> {
        Color::from_hex(&self.background)
    }
}

/// Strips `#`, expands shorthand and lowercases a background color.
pub fn normalize_background(hex: &str) -> Result<String, ColorError> {
    let color = Color::from_hex(hex)?;
    Ok(color.to_hex()[1..].to_string())
}

// ============================================================================
// AvatarRequest
// ============================================================================

/// A fully validated avatar request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarRequest {
    pub seed: String,
    pub options: RenderOptions,
}

impl AvatarRequest {
    /// Validates raw request input.
    ///
    /// All fields are checked and every failure is reported together. Absent
    /// optional fields fall back to the configured defaults. The boundary is
    /// stricter than [`RenderOptions`]: out-of-range sizes are rejected
    /// rather than clamped, and only the 6-digit background form is accepted.
    pub fn parse(
        seed: &str,
        size: Option<&str>,
        format: Option<&str>,
        background: Option<&str>,
        config: &GeneratorConfig,
    ) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();
        let mut options = RenderOptions::defaults(config);

        if let Err(err) = validate_seed(seed) {
            for message in err.messages_for(FIELD_SEED) {
                errors.add(FIELD_SEED, message.clone());
            }
        }

        if let Some(raw) = size {
            match raw.trim().parse::<i64>() {
                Ok(value)
                    if (i64::from(config.min_size)..=i64::from(config.max_size))
                        .contains(&value) =>
                {
                    options = options.with_size(value, config);
                }
                Ok(_) => errors.add(
                    FIELD_SIZE,
                    format!(
                        "The size must be between {} and {}.",
                        config.min_size, config.max_size
                    ),
                ),
                Err(_) => errors.add(FIELD_SIZE, "The size must be an integer."),
            }
        }

        if let Some(raw) = format {
            match raw.parse::<ImageFormat>() {
                Ok(value) => options = options.with_format(value),
                Err(_) => errors.add(FIELD_FORMAT, "The selected format is invalid."),
            }
        }

        if let Some(raw) = background {
            if is_strict_hex6(raw) {
                match options.clone().with_background(raw) {
                    Ok(updated) => options = updated,
                    Err(_) => errors.add(FIELD_BACKGROUND, "The background format is invalid."),
                }
            } else {
                errors.add(FIELD_BACKGROUND, "The background format is invalid.");
            }
        }

        errors.into_result(Self {
            seed: seed.to_string(),
            options,
        })
    }
}

/// `^#?[0-9a-fA-F]{6}$`
fn is_strict_hex6(value: &str) -> bool {
    let code = value.strip_prefix('#').unwrap_or(value);
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_hexdigit())
}
