//! identicon-renderer: deterministic avatar images derived from a seed string
//!
//! A seed is hashed with SHA-256; the first 15 hex digits pick a mirrored 5×5
//! pattern and a slice near the end picks the foreground color. The pattern is
//! rasterized onto a square canvas, encoded, and cached under a key that
//! covers every input affecting the bytes.
//!
//! # Example
//!
//! ```
//! use identicon_renderer::{GeneratorConfig, IdenticonGenerator, ImageFormat, RenderOptions};
//!
//! let config = GeneratorConfig::default();
//! let generator = IdenticonGenerator::in_memory(config.clone(), 256);
//!
//! let options = RenderOptions::defaults(&config)
//!     .with_size(64, &config)
//!     .with_format(ImageFormat::Png)
//!     .with_background("#1e1e1e")
//!     .unwrap();
//!
//! let image = generator.generate("alice@example.com", &options).unwrap();
//! assert!(!image.bytes.is_empty());
//!
//! // The same inputs always produce the same bytes.
//! let again = generator.generate("alice@example.com", &options).unwrap();
//! assert_eq!(image.bytes, again.bytes);
//! assert!(again.from_cache);
//! ```
//!
//! # HTTP
//!
//! With the `server` feature (on by default), [`server::router`] exposes
//! `GET /avatar/{seed}` and `GET /avatar/{seed}/info`.

mod cache;
mod color;
mod config;
mod digest;
mod error;
mod format;
mod generator;
mod info;
mod options;
mod pattern;
mod raster;
mod response;

#[cfg(feature = "server")]
pub mod server;

pub use cache::{CacheError, CacheKey, CacheStore, MemoryCacheStore, NoopCacheStore};
pub use color::{Color, ColorError, background_color, ensure_contrast, foreground_color};
pub use config::GeneratorConfig;
pub use digest::{DIGEST_HEX_LEN, Digest};
pub use error::{GenerateError, RenderError};
pub use format::{ImageFormat, UnknownFormat, content_type_for, encode};
pub use generator::{Identicon, IdenticonGenerator, RenderedImage};
pub use info::{AvatarInfo, ColorInfo};
pub use options::{AvatarRequest, MAX_SEED_CHARS, RenderOptions, ValidationError, validate_seed};
pub use pattern::{GRID_SIZE, PatternGrid};
pub use raster::{Canvas, RectPx, cell_rect, render};
pub use response::{ResponseHeaders, etag, http_date};
