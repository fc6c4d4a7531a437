//! Codec abstraction: decode bytes into pixels, encode pixels at a quality.
//!
//! The [`ImageCodec`] trait is the seam between the pipeline and the actual
//! byte format. The budget search in [`encoder`](super::encoder) treats
//! `encode` as a black box re-invoked per probe, so anything implementing this
//! trait can sit behind it. The production implementation is [`JpegCodec`]
//! (the `image` crate's pure-Rust JPEG encoder/decoder); tests use a scripted
//! codec with a size-per-quality table.

use super::params::Quality;
use image::{DynamicImage, ImageEncoder, ImageReader, RgbImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Trait for lossy image codecs.
///
/// `encode` must be pure given its inputs: the same pixels at the same quality
/// produce the same bytes. The budget search relies on this when it re-encodes
/// at the resolved quality to produce the authoritative result.
pub trait ImageCodec: Sync {
    /// Decode an in-memory byte buffer into pixels.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Encode an opaque truecolor buffer at the given quality.
    fn encode(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>, CodecError>;

    /// File extension for encoded output (without the dot).
    fn extension(&self) -> &'static str;
}

/// JPEG codec backed by the `image` crate.
///
/// Decoding sniffs the actual container format from the bytes, so JPEG, PNG,
/// WebP, BMP, and GIF sources all decode through this one entry point; only
/// the encode side is JPEG-specific.
#[derive(Debug, Default)]
pub struct JpegCodec;

impl JpegCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(format!("unreadable image header: {e}")))?
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.value())
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(buf)
    }

    fn extension(&self) -> &'static str {
        "jpg"
    }
}
