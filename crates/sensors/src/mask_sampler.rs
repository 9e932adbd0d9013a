//! Bounded rejection sampling of spawn points on the person mask.

use rand::Rng;

use crate::snapshot::{MaskChannel, MaskSnapshot};

/// Draws attempted before giving up and letting the caller fall back.
pub const MAX_ATTEMPTS: usize = 200;

/// Channel values strictly above this mark a person pixel.
pub const PERSON_THRESHOLD: u8 = 127;

/// An accepted mask pixel together with the mask size it was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskHit {
    pub pixel_x: u32,
    pub pixel_y: u32,
    pub mask_width: u32,
    pub mask_height: u32,
}

/// Find a pixel on the person (or off it, when `invert` is set).
///
/// Each draw is an independent uniform pick over the whole mask; the first
/// accepted pixel wins. Returns `None` after [`MAX_ATTEMPTS`] misses or
/// when the mask carries no pixel data.
pub fn sample_mask<R: Rng + ?Sized>(
    mask: &MaskSnapshot,
    invert: bool,
    channel: MaskChannel,
    rng: &mut R,
) -> Option<MaskHit> {
    if !mask.has_pixels() {
        return None;
    }

    for _ in 0..MAX_ATTEMPTS {
        let rx: f32 = rng.gen();
        let ry: f32 = rng.gen();
        let px = ((rx * mask.width as f32) as u32).min(mask.width - 1);
        let py = ((ry * mask.height as f32) as u32).min(mask.height - 1);

        let is_person = mask
            .channel_at(px, py, channel)
            .is_some_and(|v| v > PERSON_THRESHOLD);
        if is_person != invert {
            return Some(MaskHit {
                pixel_x: px,
                pixel_y: py,
                mask_width: mask.width,
                mask_height: mask.height,
            });
        }
    }

    None
}
