//! Closeness lookup in the depth map at a mask-space pixel.

use crate::mask_sampler::MaskHit;
use crate::snapshot::DepthSnapshot;

/// Closeness reported when no usable depth map exists.
pub const NEUTRAL_DEPTH: f32 = 0.5;

/// Closeness in [0, 1] at the depth pixel matching `hit`; 1 is nearest.
///
/// Depth and mask may differ in resolution, so the pixel is carried across
/// by its fractional position rather than its index.
pub fn sample_depth(depth: Option<&DepthSnapshot>, hit: &MaskHit) -> f32 {
    let Some(depth) = depth.filter(|d| d.has_pixels()) else {
        return NEUTRAL_DEPTH;
    };
    if hit.mask_width == 0 || hit.mask_height == 0 {
        return NEUTRAL_DEPTH;
    }

    let fx = hit.pixel_x as f32 / hit.mask_width as f32;
    let fy = hit.pixel_y as f32 / hit.mask_height as f32;
    let dx = (fx * depth.width as f32) as u32;
    let dy = (fy * depth.height as f32) as u32;

    match depth.red_at(dx, dy) {
        Some(raw) => 1.0 - raw as f32 / 255.0,
        None => NEUTRAL_DEPTH,
    }
}
