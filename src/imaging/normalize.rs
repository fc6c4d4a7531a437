//! Normalization: flatten transparency, scale to cover, center crop.
//!
//! [`normalize`] turns an arbitrary decoded image into an opaque truecolor
//! buffer of exactly the requested dimensions. The three steps run in a fixed
//! order: transparency is flattened against an opaque white background first
//! (scaling semi-transparent pixels with no background produces halo
//! artifacts), then the image is scaled with a single factor so the shorter
//! axis lands exactly on its target edge, then equal margins are cropped from
//! the overflowing axis.

use super::calculations::{cover_dimensions, crop_origin};
use super::params::Dimensions;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Invalid image: {width}x{height} with {bytes} pixel bytes")]
    InvalidImage { width: u32, height: u32, bytes: usize },
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },
    #[error("Unsupported color mode: {mode}")]
    UnsupportedMode { mode: String },
    #[error("Cover resize could not reach target: scaled {scaled_width}x{scaled_height}, target {target_width}x{target_height}")]
    RoundingEdgeCase {
        scaled_width: u32,
        scaled_height: u32,
        target_width: u32,
        target_height: u32,
    },
}

/// Normalize an image to exactly `target` dimensions, opaque truecolor.
///
/// Accepts the 8-bit modes decoders produce: opaque truecolor passes through,
/// truecolor-with-alpha and luminance-with-alpha are composited over white,
/// plain luminance is expanded to truecolor. Higher bit depths and float
/// buffers are rejected with [`NormalizeError::UnsupportedMode`].
pub fn normalize(image: &DynamicImage, target: Dimensions) -> Result<RgbImage, NormalizeError> {
    if target.width == 0 || target.height == 0 {
        return Err(NormalizeError::InvalidTarget {
            width: target.width,
            height: target.height,
        });
    }
    if image.width() == 0 || image.height() == 0 || image.as_bytes().is_empty() {
        return Err(NormalizeError::InvalidImage {
            width: image.width(),
            height: image.height(),
            bytes: image.as_bytes().len(),
        });
    }

    let flat = flatten(image)?;

    let source = (flat.width(), flat.height());
    let goal = (target.width, target.height);
    let (cover_w, cover_h) = cover_dimensions(source, goal);
    let mut scaled = imageops::resize(&flat, cover_w, cover_h, FilterType::Lanczos3);

    // Rounding in cover_dimensions can leave the supposedly-larger axis one
    // pixel short for extreme aspect ratios. Bump both axes up to cover and
    // crop from there instead of issuing an out-of-bounds crop.
    if scaled.width() < target.width || scaled.height() < target.height {
        let w = scaled.width().max(target.width);
        let h = scaled.height().max(target.height);
        scaled = imageops::resize(&scaled, w, h, FilterType::Lanczos3);
        if scaled.width() < target.width || scaled.height() < target.height {
            return Err(NormalizeError::RoundingEdgeCase {
                scaled_width: scaled.width(),
                scaled_height: scaled.height(),
                target_width: target.width,
                target_height: target.height,
            });
        }
    }

    let (left, top) = crop_origin((scaled.width(), scaled.height()), goal);
    Ok(imageops::crop_imm(&scaled, left, top, target.width, target.height).to_image())
}

/// Flatten any supported color mode to opaque truecolor.
///
/// Alpha modes are composited over an opaque white background using the alpha
/// channel as blend mask. Runs before scaling.
fn flatten(image: &DynamicImage) -> Result<RgbImage, NormalizeError> {
    match image {
        DynamicImage::ImageRgb8(rgb) => Ok(rgb.clone()),
        DynamicImage::ImageRgba8(rgba) => {
            Ok(RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                let [r, g, b, a] = rgba.get_pixel(x, y).0;
                image::Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
            }))
        }
        DynamicImage::ImageLumaA8(la) => Ok(RgbImage::from_fn(la.width(), la.height(), |x, y| {
            let [l, a] = la.get_pixel(x, y).0;
            let v = over_white(l, a);
            image::Rgb([v, v, v])
        })),
        DynamicImage::ImageLuma8(_) => Ok(image.to_rgb8()),
        other => Err(NormalizeError::UnsupportedMode {
            mode: format!("{:?}", other.color()),
        }),
    }
}

/// Composite one channel over an opaque white background.
#[inline]
fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = channel as u16;
    let a = alpha as u16;
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
