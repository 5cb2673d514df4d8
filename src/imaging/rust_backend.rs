//! Pure Rust imaging backend over the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, GIF) | `image::ImageReader` |
//! | Identify | `image::image_dimensions` (header-only) |
//! | Crop | `DynamicImage::crop_imm` |
//! | Resize | `image::imageops::resize` via `resize_exact`, Lanczos3 |
//! | Mirror | `DynamicImage::fliph` |
//! | Rotate | `DynamicImage::rotate90/180/270` |
//! | Encode | `DynamicImage::write_to` |
//!
//! The `image` crate's `rotate90`/`rotate270` are clockwise; one
//! counterclockwise quarter turn is therefore `rotate270`.

use super::backend::{BackendError, Dimensions, EncodeFormat, ImageBackend};
use crate::plan::CropRect;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Backend implementation with statically linked codecs.
#[derive(Debug, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn image_format(format: EncodeFormat) -> ImageFormat {
    match format {
        EncodeFormat::Jpeg => ImageFormat::Jpeg,
        EncodeFormat::Png => ImageFormat::Png,
        EncodeFormat::Tiff => ImageFormat::Tiff,
        EncodeFormat::Gif => ImageFormat::Gif,
    }
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                detail: e.to_string(),
            })
    }

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn crop(&self, image: DynamicImage, rect: CropRect) -> DynamicImage {
        image.crop_imm(rect.x0, rect.y0, rect.width(), rect.height())
    }

    fn resize(&self, image: DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, FilterType::Lanczos3)
    }

    fn flip_horizontal(&self, image: DynamicImage) -> DynamicImage {
        image.fliph()
    }

    fn rotate_ccw(&self, image: DynamicImage, quarter_turns: u8) -> DynamicImage {
        match quarter_turns % 4 {
            1 => image.rotate270(),
            2 => image.rotate180(),
            3 => image.rotate90(),
            _ => image,
        }
    }

    fn encode(&self, image: &DynamicImage, format: EncodeFormat) -> Result<Vec<u8>, BackendError> {
        let mut buf = Cursor::new(Vec::new());
        let result = if format == EncodeFormat::Jpeg && image.color().has_alpha() {
            // The JPEG encoder rejects alpha channels.
            DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buf, image_format(format))
        } else {
            image.write_to(&mut buf, image_format(format))
        };
        result.map_err(|e| BackendError::Encode {
            format,
            detail: e.to_string(),
        })?;
        Ok(buf.into_inner())
    }
}
