//! Output format negotiation based on the Accept header
//!
//! The pipeline has one preferred output format (WebP unless configured
//! otherwise). A client that advertises `image/webp` gets that format
//! forced; everyone else keeps the source format when we can write it.

use super::params::OutputFormat;

const WEBP_MEDIA_TYPE: &str = "image/webp";

/// Where the encoder should land
///
/// `format` and `force` are independent: `force` decides whether `format`
/// overrides the source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeTarget {
    /// Preferred output format
    pub format: OutputFormat,
    /// Always emit `format`, even when the source format is encodable
    pub force: bool,
}

impl EncodeTarget {
    pub fn new(format: OutputFormat, force: bool) -> Self {
        Self { format, force }
    }

    /// Resolve the format actually written for a given source format
    ///
    /// Unforced targets keep the source format when an encoder exists for it
    /// and fall back to the preferred format otherwise.
    pub fn resolve(&self, source: Option<OutputFormat>) -> OutputFormat {
        if self.force {
            return self.format;
        }
        source.unwrap_or(self.format)
    }
}

/// Whether the Accept header asks for WebP
///
/// Matches the `image/webp` token anywhere in the header value, ignoring
/// q-values.
pub fn accepts_webp(accept_header: Option<&str>) -> bool {
    accept_header.is_some_and(|accept| accept.contains(WEBP_MEDIA_TYPE))
}

/// Build the encode target for a request
pub fn encode_target(preferred: OutputFormat, accept_header: Option<&str>) -> EncodeTarget {
    EncodeTarget::new(preferred, accepts_webp(accept_header))
}

/// Get the Vary header value for negotiated responses
pub fn vary_header() -> &'static str {
    "Accept"
}
