//! Image processing implementation
//!
//! Handles the actual image transformation: decode → cover resize → encode

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::DynamicImage;
use std::io::Cursor;
use std::num::NonZeroU32;

use super::config::ImageConfig;
use super::encoder::{EncoderFactory, EncoderQuality};
use super::error::ImageError;
use super::format::EncodeTarget;
use super::params::OutputFormat;

/// Result of image processing
#[derive(Debug)]
pub struct ProcessedImage {
    /// The processed image data
    pub data: Vec<u8>,
    /// Format of `data`
    pub format: OutputFormat,
    /// Original dimensions (width, height)
    pub original_size: (u32, u32),
    /// Output dimensions (width, height)
    pub output_size: (u32, u32),
}

/// Settings shared by every transform
#[derive(Debug, Clone, Copy)]
pub struct TransformLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: EncoderQuality,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self::from(&ImageConfig::default())
    }
}

impl From<&ImageConfig> for TransformLimits {
    fn from(config: &ImageConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            quality: EncoderQuality::with_quality(config.quality),
        }
    }
}

/// Which part of a source is kept to cover a target rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverPlan {
    /// Source dimensions
    pub source: (u32, u32),
    /// Centred region of the source with the target's aspect ratio, as
    /// `(x, y, width, height)` in source pixels
    pub crop: (u32, u32, u32, u32),
    /// Final size, exactly the target rectangle
    pub target: (u32, u32),
}

impl CoverPlan {
    pub fn needs_crop(&self) -> bool {
        self.crop != (0, 0, self.source.0, self.source.1)
    }
}

/// Work out the cover-fit geometry for a source image.
///
/// Returns `None` when neither axis is constrained. A missing axis is derived
/// from the source aspect ratio, so the whole source is kept. The crop is
/// taken in source coordinates, so no intermediate is ever larger than the
/// source or the target.
pub fn cover_geometry(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
) -> Option<CoverPlan> {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return None;
    }
    let (src_wf, src_hf) = (src_w as f64, src_h as f64);

    let target = match (width, height) {
        (None, None) => return None,
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale_axis(w, src_hf / src_wf)),
        (None, Some(h)) => (scale_axis(h, src_wf / src_hf), h),
    };
    let (tgt_w, tgt_h) = (target.0.max(1) as u128, target.1.max(1) as u128);
    let (sw, sh) = (src_w as u128, src_h as u128);

    // A source wider than the target keeps its full height, else its full width
    let (crop_w, crop_h) = if sw * tgt_h > sh * tgt_w {
        (rounded_ratio(sh * tgt_w, tgt_h).clamp(1, sw), sh)
    } else {
        (sw, rounded_ratio(sw * tgt_h, tgt_w).clamp(1, sh))
    };
    let (crop_w, crop_h) = (crop_w as u32, crop_h as u32);

    Some(CoverPlan {
        source,
        crop: ((src_w - crop_w) / 2, (src_h - crop_h) / 2, crop_w, crop_h),
        target,
    })
}

fn rounded_ratio(numerator: u128, denominator: u128) -> u128 {
    (numerator * 2 + denominator) / (denominator * 2)
}

fn scale_axis(other: u32, ratio: f64) -> u32 {
    ((other as f64 * ratio).round() as u32).max(1)
}

/// Transform an image: decode, cover-fit to the requested size, re-encode.
///
/// With no dimensions the raster passes through unchanged and is only
/// re-encoded.
pub fn transform(
    data: &[u8],
    width: Option<i64>,
    height: Option<i64>,
    target: EncodeTarget,
    limits: &TransformLimits,
) -> Result<ProcessedImage, ImageError> {
    // 1. Decode the image
    let (img, source_format) = decode_image(data)?;
    let original_size = (img.width(), img.height());

    // 2. Cover-fit resize
    let requested_w = checked_dimension(width, height, width, limits.max_width)?;
    let requested_h = checked_dimension(width, height, height, limits.max_height)?;
    let processed = match cover_geometry(original_size, requested_w, requested_h) {
        Some(plan) => {
            // A derived axis obeys the same limits as a requested one
            checked_dimension(width, height, Some(plan.target.0 as i64), limits.max_width)?;
            checked_dimension(width, height, Some(plan.target.1 as i64), limits.max_height)?;
            resize_cover(&img, &plan)?
        }
        None => img,
    };
    let output_size = (processed.width(), processed.height());

    // 3. Encode
    let output_format = target.resolve(source_format);
    let encoder = EncoderFactory::create(output_format);
    let rgba_data = processed.to_rgba8().into_raw();
    let encoded = encoder.encode(&rgba_data, output_size.0, output_size.1, limits.quality)?;

    tracing::debug!(
        source_format = ?source_format,
        output_format = %encoded.format,
        original_width = original_size.0,
        original_height = original_size.1,
        output_width = output_size.0,
        output_height = output_size.1,
        bytes = encoded.data.len(),
        "Image transformed"
    );

    Ok(ProcessedImage {
        data: encoded.data,
        format: encoded.format,
        original_size,
        output_size,
    })
}

/// Transform with the default limits and WebP as the preferred format,
/// forcing WebP when `prefer_webp` is set.
pub fn transform_bytes(
    data: &[u8],
    width: Option<i64>,
    height: Option<i64>,
    prefer_webp: bool,
) -> Result<Vec<u8>, ImageError> {
    let target = EncodeTarget::new(OutputFormat::WebP, prefer_webp);
    transform(data, width, height, target, &TransformLimits::default()).map(|image| image.data)
}

fn checked_dimension(
    width: Option<i64>,
    height: Option<i64>,
    value: Option<i64>,
    max: u32,
) -> Result<Option<u32>, ImageError> {
    match value {
        None => Ok(None),
        Some(v) if v <= 0 => Err(ImageError::invalid_dimensions(
            width,
            height,
            "dimensions must be positive",
        )),
        Some(v) if v > max as i64 => Err(ImageError::invalid_dimensions(
            width,
            height,
            format!("dimensions must not exceed {}", max),
        )),
        Some(v) => Ok(Some(v as u32)),
    }
}

/// Decode image data, reporting the detected source format
fn decode_image(data: &[u8]) -> Result<(DynamicImage, Option<OutputFormat>), ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;
    let source_format = reader.format().and_then(OutputFormat::from_image_format);

    let img = reader
        .decode()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;
    Ok((img, source_format))
}

/// Crop the centred region from the source, then resize it to the target
fn resize_cover(img: &DynamicImage, plan: &CoverPlan) -> Result<DynamicImage, ImageError> {
    let (x, y, w, h) = plan.crop;
    let cropped = if plan.needs_crop() {
        img.crop_imm(x, y, w, h)
    } else {
        img.clone()
    };

    let (target_w, target_h) = plan.target;
    if (w, h) == (target_w, target_h) {
        return Ok(cropped);
    }
    resize_image(&cropped, target_w, target_h)
}

/// Resize image using fast-image-resize with Lanczos3 filter
fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, ImageError> {
    let src_width = NonZeroU32::new(img.width())
        .ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    let rgba_image = image::RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))?;

    Ok(DynamicImage::ImageRgba8(rgba_image))
}
