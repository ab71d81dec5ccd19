//! Output formats and byte encoding.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use bytes::Bytes;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Fallback content type for formats outside the table.
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Container format a client may ask for.
///
/// Only the content type and the cache identity depend on this value: the
/// pixels are always encoded as PNG (see [`encode`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 4] = [Self::Png, Self::Jpg, Self::Jpeg, Self::Gif];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported image format `{0}`")]
pub struct UnknownFormat(pub String);

impl FromStr for ImageFormat {
    type Err = UnknownFormat;

    /// Exact, case-sensitive match on the lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Content type for a raw format name; unknown names get [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(format: &str) -> &'static str {
    format
        .parse::<ImageFormat>()
        .map(|f| f.content_type())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Encodes the canvas. The requested format is ignored; output is always PNG.
pub fn encode(canvas: &RgbImage, _format: ImageFormat) -> Result<Bytes, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    canvas.write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(Bytes::from(buf.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn parses_known_names() {
        assert_eq!("png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("jpg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpg);
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("gif".parse::<ImageFormat>().unwrap(), ImageFormat::Gif);
        assert!("webp".parse::<ImageFormat>().is_err());
        assert!("PNG".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn content_type_table() {
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("gif"), "image/gif");
        assert_eq!(content_type_for("bmp"), "image/png");
        assert_eq!(content_type_for(""), "image/png");
    }

    #[test]
    fn every_format_encodes_png() {
        let canvas = RgbImage::from_pixel(10, 10, image::Rgb([1, 2, 3]));
        for format in ImageFormat::ALL {
            let bytes = encode(&canvas, format).unwrap();
            assert!(bytes.starts_with(PNG_MAGIC), "{format} is not PNG");
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&ImageFormat::Jpeg).unwrap(), "\"jpeg\"");
        let gif: ImageFormat = serde_json::from_str("\"gif\"").unwrap();
        assert_eq!(gif, ImageFormat::Gif);
    }
}
