//! Choosing where a dead particle comes back.

use engine_core::Viewport;
use rand::Rng;
use sensors::{sample_depth, sample_mask, DepthSnapshot, MaskChannel, MaskSnapshot};

use crate::config::SpawnMode;
use crate::particle::{Particle, BASE_OPACITY, DEPTH_SPREAD, OFFSCREEN_MARGIN};

/// Which branch placed a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOrigin {
    /// On a sampled mask pixel.
    Mask,
    /// Below the frame.
    Fallback,
}

/// Everything a respawn reads, captured once per tick.
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub viewport: &'a Viewport,
    /// Usable mask snapshot, if any.
    pub mask: Option<&'a MaskSnapshot>,
    pub depth: Option<&'a DepthSnapshot>,
    pub mode: SpawnMode,
    pub invert_mask: bool,
    pub mask_channel: MaskChannel,
    pub now: f32,
}

/// World y of the fallback spawn line, just under the visible frame.
pub fn fallback_y(viewport: &Viewport) -> f32 {
    -viewport.visible_height() / 2.0 - OFFSCREEN_MARGIN
}

/// Place `particle` for a new life.
///
/// In body mode a mask pixel is sampled and its depth recorded; whenever
/// that is not possible the particle starts below the frame and keeps its
/// previous depth. Birth time, lifespan multiplier, z and opacity are reset
/// on every path.
pub fn respawn<R: Rng + ?Sized>(particle: &mut Particle, ctx: &SpawnContext<'_>, rng: &mut R) -> SpawnOrigin {
    let hit = match (ctx.mode, ctx.mask) {
        (SpawnMode::OnBody, Some(mask)) => sample_mask(mask, ctx.invert_mask, ctx.mask_channel, rng),
        _ => None,
    };

    let origin = match hit {
        Some(hit) => {
            let world = ctx.viewport.sensor_to_world(
                hit.pixel_x as f32,
                hit.pixel_y as f32,
                hit.mask_width as f32,
                hit.mask_height as f32,
            );
            particle.position.x = world.x;
            particle.position.y = world.y;
            particle.depth_value = sample_depth(ctx.depth, &hit);
            SpawnOrigin::Mask
        }
        None => {
            if ctx.mode == SpawnMode::OnBody && ctx.mask.is_some() {
                log::trace!("Mask sampling exhausted, spawning below frame");
            }
            particle.position.x = (rng.gen::<f32>() - 0.5) * ctx.viewport.visible_width();
            particle.position.y = fallback_y(ctx.viewport);
            SpawnOrigin::Fallback
        }
    };

    particle.position.z = (rng.gen::<f32>() - 0.5) * 2.0 * DEPTH_SPREAD;
    particle.birth_time = ctx.now;
    particle.lifespan_multiplier = rng.gen_range(0.5..1.5);
    particle.opacity = BASE_OPACITY;
    origin
}
