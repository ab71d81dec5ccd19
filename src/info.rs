//! Serializable avatar metadata.
//!
//! An [`AvatarInfo`] describes what an avatar for a seed looks like without
//! rendering it: the digest, the derived foreground color and the cache key a
//! default render would be stored under.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "seed": "test@example.com",
//!   "hash": "973dfe46…4e813b",
//!   "color": { "hex": "#ba4e81", "rgb": { "r": 186, "g": 78, "b": 129 } },
//!   "cache_key": "identicon:768f5262f9af3510bf195034defd0b10"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Foreground color in both notations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ColorInfo {
    /// `#rrggbb`
    pub hex: String,
    pub rgb: Color,
}

impl From<Color> for ColorInfo {
    fn from(color: Color) -> Self {
        Self {
            hex: color.to_hex(),
            rgb: color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct AvatarInfo {
    pub seed: String,
    /// Full 64-character digest of the seed.
    pub hash: String,
    /// Foreground color against the default background.
    pub color: ColorInfo,
    /// Cache key of the default-options render.
    pub cache_key: String,
}

impl AvatarInfo {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AvatarInfo {
        AvatarInfo {
            seed: "test@example.com".into(),
            hash: "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b".into(),
            color: Color::new(186, 78, 129).into(),
            cache_key: "identicon:768f5262f9af3510bf195034defd0b10".into(),
        }
    }

    #[test]
    fn json_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["seed"], "test@example.com");
        assert_eq!(value["color"]["hex"], "#ba4e81");
        assert_eq!(value["color"]["rgb"]["r"], 186);
        assert_eq!(value["color"]["rgb"]["g"], 78);
        assert_eq!(value["color"]["rgb"]["b"], 129);
        assert_eq!(value["cache_key"], "identicon:768f5262f9af3510bf195034defd0b10");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn compact_json_has_no_newlines() {
        let json = sample().to_json().unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with("{\"seed\":\"test@example.com\""));
    }

    #[test]
    fn parses_what_it_writes() {
        let json = sample().to_json_pretty().unwrap();
        assert_eq!(AvatarInfo::from_json(&json).unwrap(), sample());
    }
}
