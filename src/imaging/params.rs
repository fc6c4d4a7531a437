//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`process`](crate::process) stage (which
//! decides which images to produce) and the [`normalize`](super::normalize) /
//! [`encoder`](super::encoder) functions (which do the actual pixel work).
//!
//! ## Types
//!
//! - [`Dimensions`] — Target pixel dimensions, always positive.
//! - [`Quality`] — Lossy encoding quality (1–100). Clamped on construction.
//! - [`QualityRange`] — Closed quality interval the budget search may use.
//! - [`EncodeOptions`] — Full specification for a byte-budget encode: budget,
//!   search range, starting probe, upward step.

/// Target dimensions for normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square dimensions with the given edge length.
    pub fn square(edge: u32) -> Self {
        Self {
            width: edge,
            height: edge,
        }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Closed quality interval `[min, max]` for the budget search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityRange {
    pub min: u8,
    pub max: u8,
}

impl QualityRange {
    /// Build a range, clamping both ends to 1-100 and normalizing order.
    pub fn new(min: u8, max: u8) -> Self {
        let min = min.clamp(1, 100);
        let max = max.clamp(1, 100);
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn clamp(&self, quality: u8) -> u8 {
        quality.clamp(self.min, self.max)
    }
}

impl Default for QualityRange {
    fn default() -> Self {
        Self { min: 1, max: 95 }
    }
}

/// Parameters for a byte-budget encode.
///
/// `max_bytes` is a best-effort target, not a hard contract: when even the
/// lowest quality in `range` produces a larger file, the encoder returns that
/// result rather than failing. Callers needing a hard guarantee compare the
/// returned byte length themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Soft maximum encoded size in bytes.
    pub max_bytes: u64,
    /// Quality interval the search is allowed to use.
    pub range: QualityRange,
    /// First quality to probe.
    pub start: Quality,
    /// Increment for the upward walk when the start probe already fits.
    pub step: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_bytes: 250 * 1024,
            range: QualityRange::default(),
            start: Quality::new(85),
            step: 5,
        }
    }
}
