//! The `info.json` metadata document.
//!
//! Pure value assembly: a fixed capability profile merged with the source
//! image's dimensions and the canonical image id. No I/O here — the
//! caller obtains the dimensions from the imaging backend and the id from
//! [`ServiceConfig::image_id`](crate::config::ServiceConfig::image_id).

use serde::Serialize;

pub const CONTEXT: &str = "http://iiif.io/api/image/2/context.json";
pub const PROTOCOL: &str = "http://iiif.io/api/image";
pub const LEVEL0_PROFILE: &str = "http://iiif.io/api/image/2/level0.json";

/// One entry of the `profile` array: either a compliance-level URI or an
/// object enumerating capabilities. Untagged so the two shapes serialize
/// exactly as the protocol mandates (bare string vs. object).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Profile {
    Compliance(&'static str),
    Capabilities {
        formats: Vec<&'static str>,
        qualities: Vec<&'static str>,
        supports: Vec<&'static str>,
    },
}

/// The information response for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoDocument {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    pub protocol: &'static str,
    pub width: u32,
    pub height: u32,
    pub profile: Vec<Profile>,
}

/// Build the info document for a source image.
///
/// The profile list is fixed for this implementation: level-0 compliance
/// plus the concrete capabilities of the transform pipeline. `gray` and
/// `bitonal` are deliberately absent from `qualities` — they parse but
/// have no rendering path.
pub fn build_info(width: u32, height: u32, image_id: &str) -> InfoDocument {
    InfoDocument {
        context: CONTEXT,
        id: image_id.to_string(),
        protocol: PROTOCOL,
        width,
        height,
        profile: vec![
            Profile::Compliance(LEVEL0_PROFILE),
            Profile::Capabilities {
                formats: vec!["jpg", "png", "tif", "gif"],
                qualities: vec!["default"],
                supports: vec![
                    "cors",
                    "mirroring",
                    "regionByPx",
                    "regionByPct",
                    "rotationBy90s",
                    "sizeAboveFull",
                    "sizeByWhListed",
                    "sizeByH",
                    "sizeByPct",
                    "sizeByW",
                    "sizeByWh",
                ],
            },
        ],
    }
}
