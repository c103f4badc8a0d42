//! Request path parameter parsing
//!
//! Resize parameters travel as path segments between the routing prefix and
//! the object key:
//!
//! ```text
//! /files/width=800/height=600/products/shoe.jpg
//! /files/width=800/products/shoe.jpg
//! /files/products/shoe.jpg
//! ```
//!
//! Parsing is lenient: a dimension whose value is not a number is treated as
//! absent (unconstrained on that axis) instead of failing the request.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::DEFAULT_ROUTE_PREFIX;

const WIDTH_KEY: &str = "width=";
const HEIGHT_KEY: &str = "height=";

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Map a decoded source format to an encodable output format.
    ///
    /// Returns `None` for formats we can read but not write back.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a dimension value could not be read as a number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDimensionError {
    #[error("dimension value is empty")]
    Empty,
    #[error("dimension value '{0}' is not a number")]
    NotNumeric(String),
    #[error("dimension value '{0}' is not finite")]
    NotFinite(String),
}

/// Parse a dimension value into a rounded integer.
///
/// Accepts any decimal number (`"100"`, `"99.5"`, `"-3"`, `"1e2"`), rounding
/// halves toward positive infinity. Zero and negative results are returned
/// as-is; range checks belong to the transform step.
pub fn parse_dimension(value: &str) -> Result<i64, ParseDimensionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParseDimensionError::Empty);
    }

    let number: f64 = trimmed
        .parse()
        .map_err(|_| ParseDimensionError::NotNumeric(value.to_string()))?;
    if !number.is_finite() {
        return Err(ParseDimensionError::NotFinite(value.to_string()));
    }

    // `as` saturates out-of-range floats at i64::MIN / i64::MAX
    Ok((number + 0.5).floor() as i64)
}

/// Parameters pulled out of a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedParams {
    /// Requested width, `None` when unconstrained
    pub width: Option<i64>,
    /// Requested height, `None` when unconstrained
    pub height: Option<i64>,
    /// Object key of the source image, without the routing prefix
    pub file_path: String,
}

impl ExtractedParams {
    /// True when at least one axis is constrained
    pub fn has_dimensions(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Rebuild the canonical request path for these parameters
    pub fn to_path(&self, prefix: &str) -> String {
        let mut path = String::from(prefix);
        if let Some(width) = self.width {
            path.push_str(&format!("{}{}/", WIDTH_KEY, width));
        }
        if let Some(height) = self.height {
            path.push_str(&format!("{}{}/", HEIGHT_KEY, height));
        }
        path.push_str(&self.file_path);
        path
    }
}

/// Extract parameters from a path routed under the default `/files/` prefix
pub fn extract(path: &str) -> ExtractedParams {
    extract_with_prefix(path, DEFAULT_ROUTE_PREFIX)
}

/// Extract `(width, height, file_path)` from a request path.
///
/// The prefix is removed by length without checking that it matches; the
/// router has already decided this path belongs here.
///
/// Grammar: `width=W/height=H/<key>` or `width=W/<key>`. A `height=` segment
/// ends parameter parsing on its own, with or without a preceding `width=`.
/// Plain segments seen before parsing ends are dropped.
pub fn extract_with_prefix(path: &str, prefix: &str) -> ExtractedParams {
    let rest = path.get(prefix.len()..).unwrap_or("");
    let segments: Vec<&str> = rest.split('/').collect();

    let mut width = None;
    let mut height = None;
    let mut saw_param = false;
    let mut key_start = None;

    for (index, segment) in segments.iter().enumerate() {
        if let Some(value) = segment.strip_prefix(WIDTH_KEY) {
            saw_param = true;
            width = parse_dimension(value).ok();

            let height_follows = segments
                .get(index + 1)
                .is_some_and(|next| next.starts_with(HEIGHT_KEY));
            if !height_follows {
                key_start = Some(index + 1);
                break;
            }
        } else if let Some(value) = segment.strip_prefix(HEIGHT_KEY) {
            saw_param = true;
            height = parse_dimension(value).ok();
            key_start = Some(index + 1);
            break;
        }
    }

    if !saw_param {
        return ExtractedParams {
            width: None,
            height: None,
            file_path: rest.to_string(),
        };
    }

    let file_path = key_start
        .map(|start| segments[start.min(segments.len())..].join("/"))
        .unwrap_or_default();

    ExtractedParams {
        width,
        height,
        file_path,
    }
}
