//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions needed to cover a target area (resize before crop).
///
/// A single scale factor is applied to both axes, chosen from the orientation
/// of the source: portrait sources (width < height) are scaled so that width
/// matches the target width exactly; landscape and square sources are scaled
/// so that height matches the target height exactly. The other axis is rounded
/// and ends up at or above its target counterpart for any source whose aspect
/// ratio covers the target.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Cover dimensions (one axis matches target exactly)
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    if src_w < src_h {
        // Portrait: width becomes the exact target width
        let factor = tgt_w as f64 / src_w as f64;
        let h = (src_h as f64 * factor).round() as u32;
        (tgt_w, h)
    } else {
        // Landscape or square: height becomes the exact target height
        let factor = tgt_h as f64 / src_h as f64;
        let w = (src_w as f64 * factor).round() as u32;
        (w, tgt_h)
    }
}

/// Calculate the top-left origin of a centered crop window.
///
/// Margins are split evenly with integer (floor) division. Axes where the
/// scaled size does not exceed the target get offset 0 rather than wrapping.
///
/// # Arguments
/// * `scaled` - Dimensions after the cover resize (width, height)
/// * `target` - Final crop dimensions (width, height)
///
/// # Returns
/// * `(left, top)` - Crop window origin
pub fn crop_origin(scaled: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let left = scaled.0.saturating_sub(target.0) / 2;
    let top = scaled.1.saturating_sub(target.1) / 2;
    (left, top)
}
