//! Byte-budget encoding: find the highest quality that fits a size ceiling.
//!
//! [`compress_to_budget`] drives a codec's quality parameter toward the
//! largest value whose encoded output fits `max_bytes`. The codec is a black
//! box re-invoked per probe; encoded size is assumed to grow with quality but
//! real codecs occasionally violate that, so the search is a bounded-probe
//! heuristic over a noisy monotone-ish function, not a strict optimizer.
//!
//! Two paths:
//!
//! 1. The starting probe already fits → walk upward in fixed increments,
//!    keeping the last passing quality. No full search needed when moving up
//!    from a known-good point.
//! 2. The starting probe is over budget → integer binary search for the
//!    maximum passing quality, with a confirmatory step when the window
//!    collapses: if the last probe was over budget, the candidate steps down
//!    one level so a result known to violate the budget is never finalized.
//!
//! The budget is soft: when even the lowest allowed quality is over budget,
//! the lowest-quality result is returned anyway (delivery is never blocked by
//! an unattainable floor). Callers compare the returned length themselves.

use super::codec::{CodecError, ImageCodec};
use super::params::{EncodeOptions, Quality};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Codec failure: {0}")]
    Codec(#[from] CodecError),
}

/// Encoded output plus the quality that produced it.
///
/// The quality is always reported so callers can tell a budget-respecting
/// result from a soft-constraint fallback by comparing `bytes.len()`.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub quality: Quality,
}

impl Encoded {
    pub fn within_budget(&self, max_bytes: u64) -> bool {
        self.bytes.len() as u64 <= max_bytes
    }
}

/// Encode `image` at the highest quality in range whose size fits the budget.
///
/// Issues at most `1 + log2(range) + O(1)` codec probes. The returned bytes
/// always come from one final encode at the resolved quality; search probes
/// only track sizes.
pub fn compress_to_budget(
    codec: &impl ImageCodec,
    image: &RgbImage,
    opts: &EncodeOptions,
) -> Result<Encoded, EncodeError> {
    let range = opts.range;
    let start = Quality::new(range.clamp(opts.start.value()));

    let first_size = codec.encode(image, start)?.len() as u64;
    let resolved = if first_size <= opts.max_bytes {
        walk_up(codec, image, opts, start.value())?
    } else {
        search_down(codec, image, opts)?
    };

    let quality = Quality::new(resolved);
    let bytes = codec.encode(image, quality)?;
    Ok(Encoded { bytes, quality })
}

/// Upward walk from a quality known to fit the budget.
///
/// Steps in `opts.step` increments (capped at the range maximum), keeping the
/// last passing quality and stopping at the first over-budget probe.
fn walk_up(
    codec: &impl ImageCodec,
    image: &RgbImage,
    opts: &EncodeOptions,
    known_good: u8,
) -> Result<u8, EncodeError> {
    let step = opts.step.max(1);
    let mut best = known_good;
    while best < opts.range.max {
        let next = best.saturating_add(step).min(opts.range.max);
        let size = codec.encode(image, Quality::new(next))?.len() as u64;
        if size > opts.max_bytes {
            break;
        }
        best = next;
    }
    Ok(best)
}

/// Binary search for the maximum quality whose encoded size fits the budget.
///
/// Monotonic non-decreasing size with quality is assumed, not guaranteed; the
/// result is best-effort under non-monotone codecs. When passing probes and
/// the collapse candidate disagree, the higher quality wins (ties are not
/// size-distinguishing from the caller's point of view).
fn search_down(
    codec: &impl ImageCodec,
    image: &RgbImage,
    opts: &EncodeOptions,
) -> Result<u8, EncodeError> {
    let mut lo = opts.range.min;
    let mut hi = opts.range.max;
    let mut best: Option<u8> = None;
    let mut probe = opts.range.min;

    while lo <= hi {
        probe = lo + (hi - lo) / 2;
        let over = codec.encode(image, Quality::new(probe))?.len() as u64 > opts.max_bytes;

        if over {
            if probe == opts.range.min {
                break;
            }
            hi = probe - 1;
        } else {
            best = Some(probe);
            lo = probe + 1;
        }

        // Window collapsed to a gap of <= 1: confirm before finalizing.
        if hi.saturating_sub(lo) <= 1 {
            if over {
                probe = probe.saturating_sub(1);
            }
            break;
        }
    }

    Ok(match best {
        Some(passing) => passing.max(probe),
        None => opts.range.min,
    })
}
