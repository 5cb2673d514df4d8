//! High-level rendering: plan a request and execute it on a backend.
//!
//! [`render`] is the whole pipeline for one derivative request: open the
//! source, resolve the plan against its dimensions, apply
//! crop → resize → mirror → rotate, and encode. Pass-through requests
//! never get here — callers check
//! [`RequestDescriptor::is_unmodified`](crate::request::RequestDescriptor::is_unmodified)
//! first and serve the original bytes.

use super::backend::{BackendError, Dimensions, EncodeFormat, ImageBackend};
use crate::plan::{resolve_plan, ResolveError};
use crate::request::{Format, RequestDescriptor};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("imaging error: {0}")]
    Backend(#[from] BackendError),
    #[error("cannot resolve request: {0}")]
    Resolve(#[from] ResolveError),
}

/// Map a format token to an encoder.
///
/// Total by design: unrecognized tokens fall back to the JPEG encoder
/// rather than failing. Inherited behavior, kept deliberate and visible
/// here rather than implicit.
pub fn encode_format(format: &Format) -> EncodeFormat {
    match format.as_str() {
        "jpg" => EncodeFormat::Jpeg,
        "png" => EncodeFormat::Png,
        "tif" => EncodeFormat::Tiff,
        "gif" => EncodeFormat::Gif,
        _ => EncodeFormat::Jpeg,
    }
}

/// Read the source dimensions for an info request (header-only, no full
/// decode).
pub fn source_dimensions<B: ImageBackend>(
    backend: &B,
    source: &Path,
) -> Result<Dimensions, RenderError> {
    if !source.exists() {
        return Err(RenderError::SourceNotFound(source.to_path_buf()));
    }
    Ok(backend.identify(source)?)
}

/// Execute a non-info request end to end, returning the encoded bytes.
pub fn render<B: ImageBackend>(
    backend: &B,
    source: &Path,
    descriptor: &RequestDescriptor,
) -> Result<Vec<u8>, RenderError> {
    if !source.exists() {
        return Err(RenderError::SourceNotFound(source.to_path_buf()));
    }

    let mut image = backend.open(source)?;
    let dims = backend.dimensions(&image);
    let plan = resolve_plan(descriptor, dims.width, dims.height)?;

    if let Some(rect) = plan.crop {
        image = backend.crop(image, rect);
    }
    if let Some((width, height)) = plan.resize {
        image = backend.resize(image, width, height);
    }
    if plan.mirror {
        image = backend.flip_horizontal(image);
    }
    if plan.quarter_turns_ccw != 0 {
        image = backend.rotate_ccw(image, plan.quarter_turns_ccw);
    }

    Ok(backend.encode(&image, encode_format(&descriptor.format))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::plan::CropRect;
    use crate::request::parse;

    // The mock "renders" by reporting the final dimensions as bytes, and
    // source existence checks need a real path, so tests use a tempfile.
    fn touch_source(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("src.jpg");
        std::fs::write(&path, b"stub").unwrap();
        path
    }

    #[test]
    fn applies_ops_in_plan_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch_source(&dir);
        let backend = MockBackend::with_dimensions(1000, 500);
        let d = parse("/img.jpg/10,10,400,200/200,/90/default.jpg").unwrap();

        let bytes = render(&backend, &source, &d).unwrap();
        // 400x200 crop → 200x100 resize → rotated → 100x200
        assert_eq!(bytes, b"100x200");

        let ops = backend.recorded();
        assert_eq!(
            ops[1..],
            [
                RecordedOp::Crop(CropRect {
                    x0: 10,
                    y0: 10,
                    x1: 410,
                    y1: 210
                }),
                RecordedOp::Resize {
                    width: 200,
                    height: 100
                },
                RecordedOp::RotateCcw(3),
                RecordedOp::Encode(EncodeFormat::Jpeg),
            ]
        );
    }

    #[test]
    fn mirror_runs_before_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch_source(&dir);
        let backend = MockBackend::with_dimensions(100, 100);
        let d = parse("/img.jpg/full/full/!90/default.jpg").unwrap();

        render(&backend, &source, &d).unwrap();
        let ops = backend.recorded();
        assert_eq!(
            ops[1..],
            [
                RecordedOp::FlipHorizontal,
                RecordedOp::RotateCcw(3),
                RecordedOp::Encode(EncodeFormat::Jpeg),
            ]
        );
    }

    #[test]
    fn full_request_only_encodes() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch_source(&dir);
        let backend = MockBackend::with_dimensions(640, 480);
        let d = parse("/img.png/full/full/0/default.png").unwrap();

        let bytes = render(&backend, &source, &d).unwrap();
        assert_eq!(bytes, b"640x480");
        assert_eq!(
            backend.recorded()[1..],
            [RecordedOp::Encode(EncodeFormat::Png)]
        );
    }

    #[test]
    fn resolve_failure_aborts_before_any_pixel_op() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch_source(&dir);
        let backend = MockBackend::with_dimensions(100, 100);
        let d = parse("/img.jpg/full/full/45/default.jpg").unwrap();

        let err = render(&backend, &source, &d).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Resolve(ResolveError::UnsupportedRotation(_))
        ));
        // Only the open was recorded; no crop/resize/encode happened.
        assert_eq!(backend.recorded().len(), 1);
    }

    #[test]
    fn missing_source_is_source_not_found() {
        let backend = MockBackend::with_dimensions(100, 100);
        let d = parse("/img.jpg/full/full/0/default.jpg").unwrap();
        let err = render(&backend, Path::new("/nonexistent/img.jpg"), &d).unwrap_err();
        assert!(matches!(err, RenderError::SourceNotFound(_)));
        assert!(backend.recorded().is_empty());
    }

    #[test]
    fn known_formats_map_to_their_encoders() {
        for (token, expected) in [
            ("jpg", EncodeFormat::Jpeg),
            ("png", EncodeFormat::Png),
            ("tif", EncodeFormat::Tiff),
            ("gif", EncodeFormat::Gif),
        ] {
            assert_eq!(encode_format(&Format::new(token)), expected);
        }
    }

    #[test]
    fn unknown_format_falls_back_to_jpeg() {
        assert_eq!(encode_format(&Format::new("pdf")), EncodeFormat::Jpeg);
        assert_eq!(encode_format(&Format::new("jpeg")), EncodeFormat::Jpeg);
        assert_eq!(encode_format(&Format::new("")), EncodeFormat::Jpeg);
    }
}
