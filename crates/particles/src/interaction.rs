//! Keypoint push and scale response for skeleton mode.

use engine_core::Viewport;
use glam::Vec2;
use sensors::{Keypoint, PoseSnapshot};

use crate::particle::Particle;

/// Keypoints below this confidence are ignored.
pub const MIN_CONFIDENCE: f32 = 0.2;
/// Every torso corner must be above this for the torso point to exist.
pub const TORSO_MIN_CONFIDENCE: f32 = 0.1;
/// Push per tick at zero distance.
pub const PUSH_STRENGTH: f32 = 0.8;
/// Extra scale at zero distance, as a share of the rest scale.
pub const MAX_SCALE_BOOST: f32 = 0.5;
/// Share of the gap to rest scale closed per tick outside the radius.
pub const RELAX_RATE: f32 = 0.1;

/// What a single keypoint did to a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Keypoint confidence too low.
    Ignored,
    /// Inside the radius: pushed away and scaled up.
    Pushed,
    /// Outside the radius: scale eased back toward rest.
    Relaxed,
}

/// React to a keypoint already mapped to world space at `target`.
///
/// Distance is measured in the view plane. The push falls off linearly from
/// full strength at the keypoint to nothing at `radius`.
pub fn apply_keypoint(particle: &mut Particle, target: Vec2, confidence: f32, radius: f32) -> Interaction {
    if confidence < MIN_CONFIDENCE {
        return Interaction::Ignored;
    }

    let offset = particle.position.truncate() - target;
    let distance = offset.length();

    if distance < radius {
        let falloff = (radius - distance) / radius;
        let angle = offset.y.atan2(offset.x);
        let force = falloff * PUSH_STRENGTH;
        particle.position.x += angle.cos() * force;
        particle.position.y += angle.sin() * force;
        particle.scale = particle.initial_scale * (1.0 + falloff * MAX_SCALE_BOOST);
        Interaction::Pushed
    } else {
        particle.relax_scale(RELAX_RATE);
        Interaction::Relaxed
    }
}

/// World position of a pose keypoint, mirrored for the selfie view.
pub fn keypoint_target(viewport: &Viewport, pose: &PoseSnapshot, keypoint: &Keypoint) -> Vec2 {
    viewport.sensor_to_world(keypoint.x, keypoint.y, pose.frame_width, pose.frame_height)
}

/// Run every limb keypoint and the torso centre of every person against `particle`.
pub fn interact_with_pose(particle: &mut Particle, pose: &PoseSnapshot, viewport: &Viewport, radius: f32) {
    for person in &pose.persons {
        for keypoint in person.limbs() {
            let target = keypoint_target(viewport, pose, keypoint);
            apply_keypoint(particle, target, keypoint.confidence, radius);
        }
        if let Some(torso) = person.torso_center(TORSO_MIN_CONFIDENCE) {
            let target = keypoint_target(viewport, pose, &torso);
            apply_keypoint(particle, target, torso.confidence, radius);
        }
    }
}
