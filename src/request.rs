//! IIIF Image API request path parsing.
//!
//! A request path names an image derivative in five ordered segments:
//!
//! ```text
//! /{identifier}/{region}/{size}/{rotation}/{quality}.{format}
//! /{identifier}/info.json
//! ```
//!
//! Each segment has its own micro-grammar:
//!
//! | Segment | Accepted tokens |
//! |---------|-----------------|
//! | region | `full`, `pct:x,y,w,h` (floats), `x,y,w,h` (non-negative ints) |
//! | size | `full`, `pct:n`, `w,`, `,h`, `w,h`, `!w,h` |
//! | rotation | `n` or `!n` (float degrees, `!` mirrors first) |
//! | quality | `default`, `color`, `gray`, `bitonal` |
//! | format | file-extension token, stored verbatim |
//!
//! Everything here is a pure function of the input string. Parsing is
//! deliberately lenient about *values* that only matter once the source
//! dimensions are known (out-of-range percentages, non-90° rotations) —
//! those are rejected by [`plan::resolve_plan`](crate::plan::resolve_plan),
//! not here. Parsing is strict about *shape*: wrong field counts,
//! unparseable numbers, and unknown quality tokens all fail immediately.
//!
//! The identifier is percent-decoded. URL prefix stripping is the caller's
//! job ([`ServiceConfig::strip_prefix`](crate::config::ServiceConfig::strip_prefix))
//! and happens before [`parse`] ever sees the path.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("malformed request path: {0}")]
    Malformed(String),
    #[error("invalid percent escape in identifier: {0}")]
    InvalidEscape(String),
    #[error("invalid region percentage {field}: {value}")]
    InvalidRegionPercent { field: &'static str, value: String },
    #[error("invalid region pixels {field}: {value}")]
    InvalidRegionPixels { field: &'static str, value: String },
    #[error("region needs exactly four comma-separated fields: {0}")]
    RegionFieldCount(String),
    #[error("invalid size {field}: {value}")]
    InvalidSize { field: &'static str, value: String },
    #[error("unknown size form: {0}")]
    UnknownSizeForm(String),
    #[error("invalid rotation: {0}")]
    InvalidRotation(String),
    #[error("unknown quality: {0}")]
    UnknownQuality(String),
}

/// The sub-rectangle of the source image to operate on.
///
/// Percent values are raw parsed floats, not range-checked here: the crop
/// step clamps them against the source bounds at plan time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegionSpec {
    Full,
    /// Decimal fractions of the source dimensions.
    Pct { x: f64, y: f64, w: f64, h: f64 },
    /// Absolute source pixels.
    Px { x: u32, y: u32, w: u32, h: u32 },
}

/// Target output dimensions, one variant per protocol size form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "form", rename_all = "lowercase")]
pub enum SizeSpec {
    Full,
    /// `w,` — scale to width, height follows the aspect ratio.
    Width { w: u32 },
    /// `,h` — scale to height, width follows the aspect ratio.
    Height { h: u32 },
    /// `pct:n` — scale factor applied to the source dimensions.
    Pct { scale: f64 },
    /// `w,h` — exact target, aspect ratio not preserved.
    Exact { w: u32, h: u32 },
    /// `!w,h` — largest aspect-preserving size within the box.
    BestFit { w: u32, h: u32 },
}

/// Rotation in protocol (clockwise) degrees, with an optional horizontal
/// mirror applied before the rotation.
///
/// Any float parses; only multiples of 90 survive plan resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RotationSpec {
    pub degrees: f64,
    pub mirror: bool,
}

/// Rendering-style token. `Default` and `Color` are both plain color
/// pass-through; `Gray` and `Bitonal` parse but have no rendering path and
/// are rejected at plan time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Default,
    Color,
    Gray,
    Bitonal,
}

impl Quality {
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Default => "default",
            Quality::Color => "color",
            Quality::Gray => "gray",
            Quality::Bitonal => "bitonal",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format token, stored verbatim.
///
/// The token maps to an encoder only at the encode boundary
/// ([`imaging::operations::encode_format`](crate::imaging::operations::encode_format)),
/// where unrecognized tokens fall back to JPEG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Format(String);

impl Format {
    pub fn new(token: impl Into<String>) -> Self {
        Format(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fully parsed request: which image, and what to do to it.
///
/// Immutable once parsed. For info requests only `identifier` is
/// meaningful; the remaining fields hold identity defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub info: bool,
    pub identifier: String,
    pub region: RegionSpec,
    pub size: SizeSpec,
    pub rotation: RotationSpec,
    pub quality: Quality,
    pub format: Format,
}

impl RequestDescriptor {
    /// True when every parameter is an identity value and the requested
    /// format matches the identifier's file extension, so the original
    /// asset bytes can be served without opening the image at all.
    ///
    /// `color` does not count as identity even though it renders the same
    /// as `default`: only the literal default spelling qualifies.
    pub fn is_unmodified(&self) -> bool {
        if self.info {
            return false;
        }
        if self.region != RegionSpec::Full {
            return false;
        }
        if self.size != SizeSpec::Full {
            return false;
        }
        if self.rotation.mirror || self.rotation.degrees != 0.0 {
            return false;
        }
        if self.quality != Quality::Default {
            return false;
        }
        let ext = Path::new(&self.identifier)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        self.format.as_str() == ext
    }
}

/// Parse the path remainder after prefix stripping.
///
/// The info shape is tried first; otherwise the path must split into
/// exactly five non-empty segments, the last of which carries
/// `{quality}.{format}`. The quality/format boundary anchors on the *last*
/// dot so identifiers containing dots never shift it.
pub fn parse(path: &str) -> Result<RequestDescriptor, ParseError> {
    if let Some(head) = path.strip_suffix("/info.json") {
        let identifier = head.rsplit('/').next().unwrap_or("");
        if identifier.is_empty() {
            return Err(ParseError::Malformed(path.to_string()));
        }
        return Ok(RequestDescriptor {
            info: true,
            identifier: percent_decode(identifier)?,
            region: RegionSpec::Full,
            size: SizeSpec::Full,
            rotation: RotationSpec::default(),
            quality: Quality::Default,
            format: Format::new(""),
        });
    }

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.len() != 5 || segments.iter().any(|s| s.is_empty()) {
        return Err(ParseError::Malformed(path.to_string()));
    }

    let (quality_token, format_token) = segments[4]
        .rsplit_once('.')
        .ok_or_else(|| ParseError::Malformed(path.to_string()))?;
    if quality_token.is_empty() || format_token.is_empty() {
        return Err(ParseError::Malformed(path.to_string()));
    }

    Ok(RequestDescriptor {
        info: false,
        identifier: percent_decode(segments[0])?,
        region: parse_region(segments[1])?,
        size: parse_size(segments[2])?,
        rotation: parse_rotation(segments[3])?,
        quality: parse_quality(quality_token)?,
        format: Format::new(format_token),
    })
}

/// Decode `%XX` escapes in an identifier segment.
///
/// No crate in our stack covers bare percent decoding, so this is local.
/// Truncated or non-hex escapes, and escapes that produce invalid UTF-8,
/// are parse errors rather than passed through.
fn percent_decode(raw: &str) -> Result<String, ParseError> {
    if !raw.contains('%') {
        return Ok(raw.to_string());
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let digits = raw
                .get(i + 1..i + 3)
                .ok_or_else(|| ParseError::InvalidEscape(raw.to_string()))?;
            let byte = u8::from_str_radix(digits, 16)
                .map_err(|_| ParseError::InvalidEscape(raw.to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| ParseError::InvalidEscape(raw.to_string()))
}

/// Parse the region segment.
pub fn parse_region(token: &str) -> Result<RegionSpec, ParseError> {
    if token == "full" {
        return Ok(RegionSpec::Full);
    }
    if let Some(rest) = token.strip_prefix("pct:") {
        let [x, y, w, h] = split_quad(rest, token)?;
        return Ok(RegionSpec::Pct {
            x: pct_field("x", x)?,
            y: pct_field("y", y)?,
            w: pct_field("w", w)?,
            h: pct_field("h", h)?,
        });
    }
    let [x, y, w, h] = split_quad(token, token)?;
    Ok(RegionSpec::Px {
        x: px_field("x", x)?,
        y: px_field("y", y)?,
        w: px_field("w", w)?,
        h: px_field("h", h)?,
    })
}

fn split_quad<'a>(s: &'a str, token: &str) -> Result<[&'a str; 4], ParseError> {
    let fields: Vec<&str> = s.split(',').collect();
    fields
        .try_into()
        .map_err(|_| ParseError::RegionFieldCount(token.to_string()))
}

fn pct_field(field: &'static str, value: &str) -> Result<f64, ParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ParseError::InvalidRegionPercent {
            field,
            value: value.to_string(),
        })
}

fn px_field(field: &'static str, value: &str) -> Result<u32, ParseError> {
    value
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidRegionPixels {
            field,
            value: value.to_string(),
        })
}

/// Parse the size segment. Dispatch order mirrors the protocol's own
/// precedence: `full`, `pct:`, leading comma, trailing comma, `!`, then
/// the plain `w,h` fallback.
pub fn parse_size(token: &str) -> Result<SizeSpec, ParseError> {
    if token == "full" {
        return Ok(SizeSpec::Full);
    }
    if let Some(rest) = token.strip_prefix("pct:") {
        let scale = rest
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n > 0.0)
            .ok_or_else(|| ParseError::InvalidSize {
                field: "scale",
                value: rest.to_string(),
            })?;
        return Ok(SizeSpec::Pct { scale });
    }
    if let Some(rest) = token.strip_prefix(',') {
        return Ok(SizeSpec::Height {
            h: size_field("height", rest)?,
        });
    }
    if let Some(rest) = token.strip_suffix(',') {
        return Ok(SizeSpec::Width {
            w: size_field("width", rest)?,
        });
    }
    if let Some(rest) = token.strip_prefix('!') {
        let (w, h) = split_pair(rest, token)?;
        return Ok(SizeSpec::BestFit {
            w: size_field("width", w)?,
            h: size_field("height", h)?,
        });
    }
    let (w, h) = split_pair(token, token)?;
    Ok(SizeSpec::Exact {
        w: size_field("width", w)?,
        h: size_field("height", h)?,
    })
}

fn split_pair<'a>(s: &'a str, token: &str) -> Result<(&'a str, &'a str), ParseError> {
    let fields: Vec<&str> = s.split(',').collect();
    match fields.as_slice() {
        [w, h] => Ok((w, h)),
        _ => Err(ParseError::UnknownSizeForm(token.to_string())),
    }
}

fn size_field(field: &'static str, value: &str) -> Result<u32, ParseError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::InvalidSize {
            field,
            value: value.to_string(),
        }),
    }
}

/// Parse the rotation segment. A leading `!` mirrors horizontally before
/// rotating; the remainder is a float degree value. No range checking —
/// non-90° values are rejected at plan time, not here.
pub fn parse_rotation(token: &str) -> Result<RotationSpec, ParseError> {
    let (mirror, rest) = match token.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let degrees = rest
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidRotation(token.to_string()))?;
    Ok(RotationSpec { degrees, mirror })
}

/// Parse the quality token, case-sensitively, against the closed set.
pub fn parse_quality(token: &str) -> Result<Quality, ParseError> {
    match token {
        "default" => Ok(Quality::Default),
        "color" => Ok(Quality::Color),
        "gray" => Ok(Quality::Gray),
        "bitonal" => Ok(Quality::Bitonal),
        other => Err(ParseError::UnknownQuality(other.to_string())),
    }
}
