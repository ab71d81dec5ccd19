//! Identicon generation service.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::cache::{CacheKey, CacheStore, MemoryCacheStore, NoopCacheStore};
use crate::color::{self, Color};
use crate::config::GeneratorConfig;
use crate::digest::Digest;
use crate::error::{GenerateError, RenderError};
use crate::format::{self, ImageFormat};
use crate::info::AvatarInfo;
use crate::options::{AvatarRequest, RenderOptions, validate_seed};
use crate::pattern::PatternGrid;
use crate::raster::{self, Canvas};
use crate::response::ResponseHeaders;

// ============================================================================
// Identicon
// ============================================================================

/// Everything derived from a seed and a background, before rasterizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identicon {
    pub digest: Digest,
    pub grid: PatternGrid,
    pub background: Color,
    pub foreground: Color,
}

impl Identicon {
    pub fn derive(
        seed: &str,
        background: Color,
        config: &GeneratorConfig,
    ) -> Result<Self, RenderError> {
        let digest = Digest::of(seed);
        let foreground = color::foreground_color(&digest, background, config)?;
        let grid = PatternGrid::from_digest(&digest);
        Ok(Self {
            digest,
            grid,
            background,
            foreground,
        })
    }

    pub fn rasterize(&self, size: u32) -> Result<Canvas, RenderError> {
        raster::render(&self.grid, size, self.background, self.foreground)
    }
}

// ============================================================================
// RenderedImage
// ============================================================================

/// Encoded avatar bytes plus what is needed to serve them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Bytes,
    /// The format the client asked for. The bytes are PNG regardless.
    pub format: ImageFormat,
    pub cache_key: CacheKey,
    /// Whether the bytes were served from the cache store.
    pub from_cache: bool,
}

impl RenderedImage {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

// ============================================================================
// IdenticonGenerator
// ============================================================================

/// Renders identicons and caches the encoded bytes.
///
/// Holds no per-request state; share it behind an [`Arc`] and call it from
/// as many threads as needed.
///
/// # Example
///
/// ```
/// use identicon_renderer::{GeneratorConfig, IdenticonGenerator, RenderOptions};
///
/// let generator = IdenticonGenerator::in_memory(GeneratorConfig::default(), 128);
/// let options = RenderOptions::defaults(generator.config());
/// let image = generator.generate("test@example.com", &options).unwrap();
/// assert_eq!(image.content_type(), "image/png");
/// ```
pub struct IdenticonGenerator {
    config: GeneratorConfig,
    cache: Arc<dyn CacheStore>,
}

impl IdenticonGenerator {
    pub fn new(config: GeneratorConfig, cache: Arc<dyn CacheStore>) -> Self {
        Self { config, cache }
    }

    /// A generator backed by a fresh [`MemoryCacheStore`].
    pub fn in_memory(config: GeneratorConfig, capacity: usize) -> Self {
        Self::new(config, Arc::new(MemoryCacheStore::new(capacity)))
    }

    /// A generator that renders every request from scratch.
    pub fn uncached(config: GeneratorConfig) -> Self {
        Self::new(config, Arc::new(NoopCacheStore))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache_ttl_secs)
    }

    pub fn cache_key(&self, seed: &str, options: &RenderOptions) -> CacheKey {
        CacheKey::for_render(&self.config.cache_key_prefix, seed, options)
    }

    /// Renders and encodes without touching the cache.
    pub fn render(&self, seed: &str, options: &RenderOptions) -> Result<Bytes, RenderError> {
        let background = options.background_color()?;
        let identicon = Identicon::derive(seed, background, &self.config)?;
        let canvas = identicon.rasterize(options.size())?;
        format::encode(&canvas, options.format())
    }

    /// Returns the avatar for `seed`, from the cache when possible.
    ///
    /// Cache failures are logged and otherwise ignored: a broken store costs
    /// latency, never a response.
    pub fn generate(
        &self,
        seed: &str,
        options: &RenderOptions,
    ) -> Result<RenderedImage, GenerateError> {
        validate_seed(seed)?;
        let key = self.cache_key(seed, options);

        match self.cache.get(&key) {
            Ok(Some(bytes)) => {
                debug!(cache_key = %key, "identicon cache hit");
                return Ok(RenderedImage {
                    bytes,
                    format: options.format(),
                    cache_key: key,
                    from_cache: true,
                });
            }
            Ok(None) => debug!(cache_key = %key, "identicon cache miss"),
            Err(err) => warn!(cache_key = %key, error = %err, "cache read failed; rendering"),
        }

        let bytes = self.render(seed, options).inspect_err(|err| {
            error!(
                seed,
                size = options.size(),
                format = %options.format(),
                error = %err,
                "identicon render failed"
            );
        })?;

        if let Err(err) = self.cache.put(&key, bytes.clone(), self.cache_ttl()) {
            warn!(cache_key = %key, error = %err, "cache write failed");
        }

        Ok(RenderedImage {
            bytes,
            format: options.format(),
            cache_key: key,
            from_cache: false,
        })
    }

    pub fn generate_request(
        &self,
        request: &AvatarRequest,
    ) -> Result<RenderedImage, GenerateError> {
        self.generate(&request.seed, &request.options)
    }

    /// Describes the avatar for `seed` under the default options.
    pub fn info(&self, seed: &str) -> Result<AvatarInfo, GenerateError> {
        validate_seed(seed)?;
        let defaults = RenderOptions::defaults(&self.config);
        let background = defaults.background_color().map_err(RenderError::from)?;
        let identicon = Identicon::derive(seed, background, &self.config)?;

        Ok(AvatarInfo {
            seed: seed.to_string(),
            hash: identicon.digest.to_string(),
            color: identicon.foreground.into(),
            cache_key: self.cache_key(seed, &defaults).into_string(),
        })
    }

    /// Headers for serving `image` at time `now`.
    pub fn response_headers(&self, image: &RenderedImage, now: DateTime<Utc>) -> ResponseHeaders {
        ResponseHeaders::assemble(&image.bytes, image.format, self.cache_ttl(), now)
    }
}
