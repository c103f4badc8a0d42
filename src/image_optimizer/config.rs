use serde::{Deserialize, Serialize};

use super::params::OutputFormat;
use crate::constants::{DEFAULT_IMAGE_QUALITY, DEFAULT_MAX_DIMENSION};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageConfig {
    /// Format emitted when the client accepts it, or when the source format
    /// cannot be written back
    #[serde(default = "default_target_format")]
    pub target_format: OutputFormat,

    /// Quality for lossy encoders (JPEG)
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Largest width a request may ask for
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,

    /// Largest height a request may ask for
    #[serde(default = "default_max_dimension")]
    pub max_height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            target_format: default_target_format(),
            quality: default_quality(),
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
        }
    }
}

impl ImageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.quality) {
            return Err(format!(
                "image.quality must be between 1 and 100, got {}",
                self.quality
            ));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err("image.max_width and image.max_height must be positive".to_string());
        }
        Ok(())
    }
}

fn default_target_format() -> OutputFormat {
    OutputFormat::WebP
}

fn default_quality() -> u8 {
    DEFAULT_IMAGE_QUALITY
}

fn default_max_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}
