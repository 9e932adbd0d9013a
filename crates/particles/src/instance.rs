//! Per-particle instance data handed to the renderer.

use bytemuck::{Pod, Zeroable};

use crate::particle::Particle;

/// Instance data for one bubble sprite.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub opacity: f32,
    /// Padding to a 16-byte multiple for the instance buffer.
    pub _pad: [f32; 3],
}

impl From<&Particle> for ParticleInstance {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            scale: p.scale,
            opacity: p.opacity,
            _pad: [0.0; 3],
        }
    }
}
