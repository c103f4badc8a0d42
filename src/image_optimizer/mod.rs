//! Image optimization module
//!
//! Turns a request path plus source bytes into a resized image:
//! - Path parameter extraction (`width=`, `height=`, object key)
//! - Cover-fit resize with centre crop
//! - Output format negotiation from the Accept header
//! - Encoders for JPEG, PNG, WebP and GIF
//!
//! # URL Format
//!
//! ```text
//! /files/width=800/height=600/products/shoe.jpg
//! /files/width=800/products/shoe.jpg
//! /files/products/shoe.jpg
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod format;
pub mod params;
pub mod processor;

pub use config::ImageConfig;
pub use encoder::{EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use error::ImageError;
pub use format::{accepts_webp, encode_target, vary_header, EncodeTarget};
pub use params::{
    extract, extract_with_prefix, parse_dimension, ExtractedParams, OutputFormat,
    ParseDimensionError,
};
pub use processor::{
    cover_geometry, transform, transform_bytes, CoverPlan, ProcessedImage, TransformLimits,
};
