//! Image pipeline error types
//!
//! Every variant is terminal for the request. The handler turns all of them
//! into a generic 500 and records the detail in the diagnostic log.

use std::fmt;

/// Errors that can occur while transforming an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    // === Decoding Errors ===
    /// Failed to decode image data (corrupt bytes or unknown format)
    DecodeFailed { message: String },

    // === Processing Errors ===
    /// Requested dimensions cannot be produced
    InvalidDimensions {
        width: Option<i64>,
        height: Option<i64>,
        reason: String,
    },
    /// Resize operation failed
    ResizeFailed { message: String },
    /// Encoding to output format failed
    EncodeFailed { format: String, message: String },
}

fn describe(dimension: &Option<i64>) -> String {
    dimension
        .map(|value| value.to_string())
        .unwrap_or_else(|| "auto".to_string())
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            ImageError::InvalidDimensions {
                width,
                height,
                reason,
            } => {
                write!(
                    f,
                    "Invalid dimensions {}x{}: {}",
                    describe(width),
                    describe(height),
                    reason
                )
            }
            ImageError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    /// True when the source bytes could not be decoded
    pub fn is_decode_error(&self) -> bool {
        matches!(self, ImageError::DecodeFailed { .. })
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn invalid_dimensions(
        width: Option<i64>,
        height: Option<i64>,
        reason: impl Into<String>,
    ) -> Self {
        ImageError::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }
}
