//! Imaging backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between plan resolution (pure
//! math) and pixel work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) over the `image`
//! crate; tests use a recording mock that tracks dimensions through the
//! pipeline without touching pixels.
//!
//! Directional convention: [`ImageBackend::rotate_ccw`] counts
//! **counterclockwise** quarter turns. The plan resolver has already
//! inverted the protocol's clockwise degrees, so executors apply the turn
//! count as-is.

use crate::plan::CropRect;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {path}: {detail}")]
    Decode { path: String, detail: String },
    #[error("failed to encode as {format:?}: {detail}")]
    Encode {
        format: EncodeFormat,
        detail: String,
    },
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Output encodings the backend can produce. The format *token* from the
/// request is mapped onto this closed set at the encode boundary
/// ([`operations::encode_format`](super::operations::encode_format)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Jpeg,
    Png,
    Tiff,
    Gif,
}

/// Pixel operations the transform pipeline needs.
///
/// Geometry operations take the image by value and return the transformed
/// image; the pipeline threads one image through a short chain of ops.
pub trait ImageBackend: Sync {
    type Image;

    /// Decode the source image.
    fn open(&self, path: &Path) -> Result<Self::Image, BackendError>;

    /// Read dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Dimensions of an already-open image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Crop to a rect in the image's own pixel space.
    fn crop(&self, image: Self::Image, rect: CropRect) -> Self::Image;

    /// Resize to exactly `width`x`height` (may distort).
    fn resize(&self, image: Self::Image, width: u32, height: u32) -> Self::Image;

    /// Mirror around the vertical axis.
    fn flip_horizontal(&self, image: Self::Image) -> Self::Image;

    /// Rotate by `quarter_turns` counterclockwise quarter turns (0..=3).
    fn rotate_ccw(&self, image: Self::Image, quarter_turns: u8) -> Self::Image;

    /// Encode to the requested format.
    fn encode(&self, image: &Self::Image, format: EncodeFormat) -> Result<Vec<u8>, BackendError>;
}
