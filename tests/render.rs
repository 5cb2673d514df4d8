//! End-to-end tests through the real `image`-crate backend: synthesize a
//! PNG source, execute request paths against it, and decode the output.

use iiif_image::config::ServiceConfig;
use iiif_image::imaging::{render, source_dimensions, RustBackend};
use iiif_image::{info, request};
use std::path::{Path, PathBuf};

/// 8x4 gradient PNG: red channel encodes x, green encodes y.
fn write_source(dir: &Path, name: &str) -> PathBuf {
    let img = image::RgbImage::from_fn(8, 4, |x, y| image::Rgb([x as u8, y as u8, 0]));
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}

fn run(source: &Path, path: &str) -> Vec<u8> {
    let descriptor = request::parse(path).unwrap();
    render(&RustBackend::new(), source, &descriptor).unwrap()
}

fn decoded_dims(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

#[test]
fn crop_produces_the_selected_region() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let bytes = run(&source, "/sample.png/2,1,4,2/full/0/default.png");
    assert_eq!(decoded_dims(&bytes), (4, 2));
    // Top-left of the crop is source pixel (2,1).
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(img.get_pixel(0, 0), &image::Rgb([2, 1, 0]));
}

#[test]
fn best_fit_downscales_within_box() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let bytes = run(&source, "/sample.png/full/!4,4/0/default.png");
    assert_eq!(decoded_dims(&bytes), (4, 2));
}

#[test]
fn clockwise_rotation_swaps_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let bytes = run(&source, "/sample.png/full/full/90/default.png");
    assert_eq!(decoded_dims(&bytes), (4, 8));
}

#[test]
fn mirror_flips_pixel_content() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let bytes = run(&source, "/sample.png/full/full/!0/default.png");
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    // Leftmost column now holds the original rightmost (x=7) values.
    assert_eq!(img.get_pixel(0, 0), &image::Rgb([7, 0, 0]));
}

#[test]
fn exact_size_distorts() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let bytes = run(&source, "/sample.png/full/6,6/0/default.png");
    assert_eq!(decoded_dims(&bytes), (6, 6));
}

#[test]
fn unknown_format_encodes_as_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let bytes = run(&source, "/sample.png/full/full/0/default.webm");
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
}

#[test]
fn pass_through_serves_original_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let descriptor = request::parse("/sample.png/full/full/0/default.png").unwrap();
    assert!(descriptor.is_unmodified());
    // The boundary serves the file directly; no rendering involved.
    let original = std::fs::read(&source).unwrap();
    assert!(!original.is_empty());
}

#[test]
fn gray_quality_fails_at_render_time() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let descriptor = request::parse("/sample.png/full/full/0/gray.png").unwrap();
    let err = render(&RustBackend::new(), &source, &descriptor).unwrap_err();
    assert!(err.to_string().contains("no rendering path"));
}

#[test]
fn info_flow_reports_source_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "sample.png");
    let cfg = ServiceConfig {
        prefix: "/iiif".to_string(),
        base_url: "http://localhost:8080".to_string(),
    };

    let remainder = cfg.strip_prefix("/iiif/sample.png/info.json").unwrap();
    let descriptor = request::parse(remainder).unwrap();
    assert!(descriptor.info);

    let dims = source_dimensions(&RustBackend::new(), &source).unwrap();
    let doc = info::build_info(dims.width, dims.height, &cfg.image_id(&descriptor.identifier));
    assert_eq!(doc.width, 8);
    assert_eq!(doc.height, 4);
    assert_eq!(doc.id, "http://localhost:8080/iiif/sample.png");
}
