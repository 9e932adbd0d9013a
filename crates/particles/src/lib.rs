//! Bubble particle engine.
//!
//! A fixed pool of particles drifts upward through the viewport. Particles
//! are born on the person silhouette (or below the frame when no silhouette
//! is available), fade out near the end of their life and respawn. In
//! skeleton mode they are pushed around by the tracked keypoints instead.

pub mod config;
pub mod instance;
pub mod interaction;
pub mod particle;
pub mod pool;
pub mod respawn;

pub use config::{BubbleConfig, SpawnMode};
pub use instance::ParticleInstance;
pub use particle::Particle;
pub use pool::{ConfigChange, ParticlePool, TickStats};
pub use respawn::{respawn, SpawnContext, SpawnOrigin};
