//! Particle engine settings.

use sensors::MaskChannel;
use serde::{Deserialize, Serialize};

/// Where new particles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    /// Born on the person silhouette, falling back below the frame.
    OnBody,
    /// Born below the frame and pushed around by skeleton keypoints.
    InteractWithSkeleton,
}

/// User-facing controls for the bubble field.
///
/// Changing `particle_count` or `particle_base_size` rebuilds the pool;
/// everything else is picked up on the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleConfig {
    /// Number of particles in the pool.
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    /// Global vertical speed, multiplied by each particle's own factor.
    #[serde(default = "default_particle_speed")]
    pub particle_speed: f32,
    /// Upper spread of the random initial scale (scale is 0.1 + [0, size)).
    #[serde(default = "default_particle_base_size")]
    pub particle_base_size: f32,
    /// Keypoint influence radius in world units.
    #[serde(default = "default_interaction_radius")]
    pub interaction_radius: f32,
    /// Spawn on the person mask instead of interacting with the skeleton.
    #[serde(default = "default_true")]
    pub spawn_on_body: bool,
    /// Spawn on the background instead of the person.
    #[serde(default)]
    pub invert_mask: bool,
    /// Base lifetime in seconds. 0 = particles live forever.
    #[serde(default = "default_lifespan")]
    pub lifespan: f32,
    /// Mask channel holding the person indicator.
    #[serde(default)]
    pub mask_channel: MaskChannel,
}

fn default_particle_count() -> usize {
    1000
}
fn default_particle_speed() -> f32 {
    1.0
}
fn default_particle_base_size() -> f32 {
    0.5
}
fn default_interaction_radius() -> f32 {
    3.0
}
fn default_true() -> bool {
    true
}
fn default_lifespan() -> f32 {
    6.0
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            particle_count: default_particle_count(),
            particle_speed: default_particle_speed(),
            particle_base_size: default_particle_base_size(),
            interaction_radius: default_interaction_radius(),
            spawn_on_body: default_true(),
            invert_mask: false,
            lifespan: default_lifespan(),
            mask_channel: MaskChannel::default(),
        }
    }
}

impl BubbleConfig {
    pub fn spawn_mode(&self) -> SpawnMode {
        if self.spawn_on_body {
            SpawnMode::OnBody
        } else {
            SpawnMode::InteractWithSkeleton
        }
    }

    /// Whether switching from `self` to `other` needs a fresh pool.
    pub fn requires_rebuild(&self, other: &BubbleConfig) -> bool {
        self.particle_count != other.particle_count || self.particle_base_size != other.particle_base_size
    }

    /// Replace negative or non-finite values with something usable.
    pub fn sanitized(mut self) -> Self {
        sanitize(&mut self.particle_speed, "particle_speed", default_particle_speed());
        sanitize(&mut self.particle_base_size, "particle_base_size", default_particle_base_size());
        sanitize(&mut self.interaction_radius, "interaction_radius", default_interaction_radius());
        sanitize(&mut self.lifespan, "lifespan", default_lifespan());
        self
    }
}

fn sanitize(value: &mut f32, name: &str, fallback: f32) {
    if !value.is_finite() {
        log::warn!("{} is not finite, using {}", name, fallback);
        *value = fallback;
    } else if *value < 0.0 {
        log::warn!("{} = {} is negative, clamping to 0", name, value);
        *value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_mode_follows_flag() {
        let mut config = BubbleConfig::default();
        assert_eq!(config.spawn_mode(), SpawnMode::OnBody);
        config.spawn_on_body = false;
        assert_eq!(config.spawn_mode(), SpawnMode::InteractWithSkeleton);
    }

    #[test]
    fn only_count_and_size_require_rebuild() {
        let base = BubbleConfig::default();
        let mut other = base.clone();
        other.particle_speed = 3.0;
        other.lifespan = 0.0;
        other.spawn_on_body = false;
        assert!(!base.requires_rebuild(&other));
        other.particle_count = 10;
        assert!(base.requires_rebuild(&other));
        let mut sized = base.clone();
        sized.particle_base_size = 2.0;
        assert!(base.requires_rebuild(&sized));
    }

    #[test]
    fn sanitized_clamps_bad_values() {
        let config = BubbleConfig {
            particle_speed: -1.0,
            lifespan: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.particle_speed, 0.0);
        assert_eq!(config.lifespan, default_lifespan());
    }
}
