//! Per-particle state and the pure pieces of its per-tick update.

use glam::Vec3;
use rand::Rng;
use sensors::NEUTRAL_DEPTH;

/// Opacity of a particle that is not fading.
pub const BASE_OPACITY: f32 = 0.5;
/// Age fraction at which the fade-out starts.
pub const FADE_START: f32 = 0.8;
/// Lateral wobble step per tick.
pub const WOBBLE_AMPLITUDE: f32 = 0.01;
/// Distance beyond the frame edge used for off-screen spawns and exits.
pub const OFFSCREEN_MARGIN: f32 = 5.0;
/// Half of the z range particles are spread over.
pub const DEPTH_SPREAD: f32 = 7.5;

/// One bubble.
///
/// Motion and wobble parameters are fixed when the particle is created;
/// position, birth time, lifespan multiplier and depth change on respawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Share of the global speed this particle rises at, in [0, 0.1).
    pub velocity_multiplier: f32,
    /// Rest scale, in [0.1, 0.1 + base size).
    pub initial_scale: f32,
    /// Current rendered scale.
    pub scale: f32,
    pub wobble_speed: f32,
    pub wobble_offset: f32,
    pub random_offset: f32,
    /// Seconds on the render clock when this particle last (re)spawned.
    pub birth_time: f32,
    /// Spread on the global lifespan, in [0.5, 1.5).
    pub lifespan_multiplier: f32,
    /// Closeness at the spawn pixel: 0 = far, 1 = near.
    pub depth_value: f32,
    pub opacity: f32,
}

impl Particle {
    /// Create a particle with fresh random motion parameters. It still needs
    /// a respawn to get a position.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, base_size: f32, now: f32) -> Self {
        let initial_scale = 0.1 + rng.gen::<f32>() * base_size;
        Self {
            position: Vec3::ZERO,
            velocity_multiplier: rng.gen::<f32>() * 0.1,
            initial_scale,
            scale: initial_scale,
            wobble_speed: 0.5 + rng.gen::<f32>() * 1.5,
            wobble_offset: rng.gen::<f32>() * std::f32::consts::TAU,
            random_offset: rng.gen::<f32>() * std::f32::consts::TAU,
            birth_time: now,
            lifespan_multiplier: rng.gen_range(0.5..1.5),
            depth_value: NEUTRAL_DEPTH,
            opacity: BASE_OPACITY,
        }
    }

    pub fn age(&self, now: f32) -> f32 {
        now - self.birth_time
    }

    pub fn effective_lifespan(&self, lifespan: f32) -> f32 {
        lifespan * self.lifespan_multiplier
    }

    /// Rise by the current global speed and wobble sideways.
    ///
    /// Speed is read every tick, so changing it moves every particle at once.
    pub fn drift(&mut self, speed: f32, t: f32) {
        self.position.y += speed * self.velocity_multiplier;
        self.position.x += (t * self.wobble_speed + self.wobble_offset).sin() * WOBBLE_AMPLITUDE;
        self.position.z += (t * self.wobble_speed + self.random_offset).cos() * WOBBLE_AMPLITUDE;
    }

    /// Scale for the current depth: 0.5x when far, 2x when near.
    pub fn depth_scale(&self) -> f32 {
        self.initial_scale * (0.5 + self.depth_value * 1.5)
    }

    pub fn apply_depth_scale(&mut self) {
        self.scale = self.depth_scale();
    }

    /// Close `rate` of the gap between the current scale and rest scale.
    pub fn relax_scale(&mut self, rate: f32) {
        self.scale += (self.initial_scale - self.scale) * rate;
    }
}

/// Opacity for a given share of the lifespan used up.
///
/// Flat at [`BASE_OPACITY`] up to [`FADE_START`], then linear down to 0 at 1.
pub fn fade_opacity(age_fraction: f32) -> f32 {
    if age_fraction <= FADE_START {
        return BASE_OPACITY;
    }
    let fade = ((age_fraction - FADE_START) / (1.0 - FADE_START)).min(1.0);
    BASE_OPACITY * (1.0 - fade)
}
