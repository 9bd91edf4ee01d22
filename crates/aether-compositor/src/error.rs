//! Compositor error types.

use thiserror::Error;

/// Failures surfaced by the compositor and its host-side helpers.
///
/// None of these abort a frame: the pass queue logs them and the scene is
/// left as it was.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// Two targets that must match in size do not.
    #[error("target size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Pixel storage does not cover the declared dimensions.
    #[error("color buffer storage does not match {width}x{height}")]
    InvalidBuffer { width: u32, height: u32 },

    /// Failed to encode or write an image file.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
