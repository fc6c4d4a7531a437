//! Image processing core — pure Rust, no file I/O.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, WebP, BMP, GIF) | `image::ImageReader` with format sniffing |
//! | **Flatten + cover resize + crop** | Lanczos3 via `image::imageops` |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//! | **Budget search** | [`encoder::compress_to_budget`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Codec**: [`ImageCodec`] trait + [`JpegCodec`]
//! - **Normalize**: flatten, scale-to-cover, center crop
//! - **Encoder**: quality search against a byte budget
//!
//! Every function here is synchronous and pure given its inputs: no shared
//! state, no locks, safe to call from rayon workers as long as each call owns
//! its buffers. Each call allocates transiently in O(width × height).

pub mod calculations;
pub mod codec;
pub mod encoder;
pub mod normalize;
mod params;

pub use codec::{CodecError, ImageCodec, JpegCodec};
pub use encoder::{compress_to_budget, Encoded, EncodeError};
pub use normalize::{normalize, NormalizeError};
pub use params::{Dimensions, EncodeOptions, Quality, QualityRange};
