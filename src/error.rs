//! Error types shared across the render pipeline.

use thiserror::Error;

use crate::color::ColorError;
use crate::options::ValidationError;

/// A failure while turning a pattern into encoded image bytes.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to allocate a {width}x{height} canvas")]
    CanvasAllocation { width: u32, height: u32 },
    #[error("color derivation failed: {0}")]
    Color(#[from] ColorError),
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Anything [`IdenticonGenerator`](crate::IdenticonGenerator) can fail with.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl GenerateError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
