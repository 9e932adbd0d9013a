//! Fixed-size particle pool and its per-tick update.

use std::ops::AddAssign;

use engine_core::Viewport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sensors::SensorFrame;

use crate::config::{BubbleConfig, SpawnMode};
use crate::instance::ParticleInstance;
use crate::interaction::{interact_with_pose, RELAX_RATE};
use crate::particle::{fade_opacity, Particle, BASE_OPACITY, FADE_START, OFFSCREEN_MARGIN};
use crate::respawn::{respawn, SpawnContext, SpawnOrigin};

/// Counters for one tick (or, summed, for a reporting window).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Particles that outlived their lifespan.
    pub lifespan_respawns: u32,
    /// Particles that drifted off the top of the frame.
    pub bounds_respawns: u32,
    pub mask_spawns: u32,
    pub fallback_spawns: u32,
}

impl TickStats {
    fn record(&mut self, origin: SpawnOrigin) {
        match origin {
            SpawnOrigin::Mask => self.mask_spawns += 1,
            SpawnOrigin::Fallback => self.fallback_spawns += 1,
        }
    }

    pub fn respawns(&self) -> u32 {
        self.lifespan_respawns + self.bounds_respawns
    }
}

impl AddAssign for TickStats {
    fn add_assign(&mut self, rhs: Self) {
        self.lifespan_respawns += rhs.lifespan_respawns;
        self.bounds_respawns += rhs.bounds_respawns;
        self.mask_spawns += rhs.mask_spawns;
        self.fallback_spawns += rhs.fallback_spawns;
    }
}

/// Result of [`ParticlePool::apply_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Unchanged,
    /// Picked up on the next tick.
    Updated,
    /// Spawn mode flipped; every particle was respawned.
    ModeSwitched,
    /// Count or size changed; the pool was recreated.
    Rebuilt,
}

/// The bubble pool. Its size only changes by recreating it.
pub struct ParticlePool {
    particles: Vec<Particle>,
    config: BubbleConfig,
    rng: StdRng,
}

impl ParticlePool {
    /// Create and populate a pool. A `seed` makes the whole run reproducible.
    pub fn new(
        config: BubbleConfig,
        viewport: &Viewport,
        frame: &SensorFrame,
        now: f32,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut pool = Self {
            particles: Vec::new(),
            config: config.sanitized(),
            rng,
        };
        pool.populate(viewport, frame, now);
        pool
    }

    /// Fill the pool from scratch. Birth times are staggered so the first
    /// generation does not expire all at once.
    fn populate(&mut self, viewport: &Viewport, frame: &SensorFrame, now: f32) -> TickStats {
        let mut stats = TickStats::default();
        let ctx = self.spawn_context(viewport, frame, now);
        let lifespan = self.config.lifespan;

        self.particles.clear();
        self.particles.reserve_exact(self.config.particle_count);
        for _ in 0..self.config.particle_count {
            let mut particle = Particle::new(&mut self.rng, self.config.particle_base_size, now);
            stats.record(respawn(&mut particle, &ctx, &mut self.rng));
            if lifespan > 0.0 {
                let stagger = self.rng.gen::<f32>() * FADE_START;
                particle.birth_time -= stagger * particle.effective_lifespan(lifespan);
            }
            if self.config.spawn_mode() == SpawnMode::OnBody {
                particle.apply_depth_scale();
            }
            self.particles.push(particle);
        }

        log::debug!(
            "Populated {} particles ({} on mask, {} below frame)",
            self.particles.len(),
            stats.mask_spawns,
            stats.fallback_spawns
        );
        stats
    }

    fn spawn_context<'a>(&self, viewport: &'a Viewport, frame: &'a SensorFrame, now: f32) -> SpawnContext<'a> {
        SpawnContext {
            viewport,
            mask: frame.usable_mask(),
            depth: frame.usable_depth(),
            mode: self.config.spawn_mode(),
            invert_mask: self.config.invert_mask,
            mask_channel: self.config.mask_channel,
            now,
        }
    }

    /// Advance every particle to render time `t` using the latest snapshots.
    pub fn update(&mut self, t: f32, viewport: &Viewport, frame: &SensorFrame) -> TickStats {
        let mut stats = TickStats::default();
        let ctx = self.spawn_context(viewport, frame, t);
        let speed = self.config.particle_speed;
        let lifespan = self.config.lifespan;
        let radius = self.config.interaction_radius;
        let top = viewport.visible_height() / 2.0 + OFFSCREEN_MARGIN;
        let skeleton = ctx.mode == SpawnMode::InteractWithSkeleton;
        let pose = frame.pose();

        for particle in &mut self.particles {
            particle.drift(speed, t);
            // In skeleton mode the keypoints own the scale and it must carry
            // over between ticks to ease back to rest.
            if !skeleton {
                particle.apply_depth_scale();
            }

            if lifespan > 0.0 {
                let effective = particle.effective_lifespan(lifespan);
                let age = particle.age(t);
                if age > effective {
                    stats.record(respawn(particle, &ctx, &mut self.rng));
                    stats.lifespan_respawns += 1;
                    continue;
                }
                particle.opacity = fade_opacity(age / effective);
            } else {
                particle.opacity = BASE_OPACITY;
            }

            if particle.position.y > top {
                stats.record(respawn(particle, &ctx, &mut self.rng));
                stats.bounds_respawns += 1;
            }

            if skeleton {
                match pose {
                    Some(pose) => interact_with_pose(particle, pose, viewport, radius),
                    None => particle.relax_scale(RELAX_RATE),
                }
            }
        }

        stats
    }

    /// Switch to a new configuration.
    ///
    /// Count or size changes recreate the pool, a spawn-mode flip respawns
    /// every particle, anything else applies on the next tick.
    pub fn apply_config(
        &mut self,
        config: BubbleConfig,
        viewport: &Viewport,
        frame: &SensorFrame,
        now: f32,
    ) -> ConfigChange {
        let config = config.sanitized();
        if config == self.config {
            return ConfigChange::Unchanged;
        }

        let rebuild = self.config.requires_rebuild(&config);
        let mode_switched = self.config.spawn_mode() != config.spawn_mode();
        self.config = config;

        if rebuild {
            log::debug!(
                "Recreating pool: {} particles, base size {}",
                self.config.particle_count,
                self.config.particle_base_size
            );
            self.populate(viewport, frame, now);
            ConfigChange::Rebuilt
        } else if mode_switched {
            log::debug!("Spawn mode switched to {:?}", self.config.spawn_mode());
            self.respawn_all(viewport, frame, now);
            ConfigChange::ModeSwitched
        } else {
            ConfigChange::Updated
        }
    }

    /// Respawn every particle right now.
    pub fn respawn_all(&mut self, viewport: &Viewport, frame: &SensorFrame, now: f32) -> TickStats {
        let mut stats = TickStats::default();
        let ctx = self.spawn_context(viewport, frame, now);
        for particle in &mut self.particles {
            stats.record(respawn(particle, &ctx, &mut self.rng));
        }
        stats
    }

    pub fn config(&self) -> &BubbleConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Render data for every particle, in pool order.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles.iter().map(ParticleInstance::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::respawn::fallback_y;
    use sensors::{DepthSnapshot, Keypoint, KeypointIndex, MaskSnapshot, Person, PoseSnapshot, SensorHub};

    fn config(count: usize) -> BubbleConfig {
        BubbleConfig {
            particle_count: count,
            ..Default::default()
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(100, 100, 90.0, 10.0)
    }

    fn mask_frame() -> SensorFrame {
        let hub = SensorHub::new();
        hub.mask.publish(MaskSnapshot::filled(8, 8, 255));
        hub.frame()
    }

    #[test]
    fn pool_has_fixed_size() {
        let pool = ParticlePool::new(config(64), &viewport(), &SensorFrame::default(), 0.0, Some(1));
        assert_eq!(pool.len(), 64);
        assert_eq!(pool.instances().len(), 64);
    }

    #[test]
    fn initial_birth_times_are_staggered() {
        let pool = ParticlePool::new(config(50), &viewport(), &SensorFrame::default(), 100.0, Some(2));
        let lifespan = pool.config().lifespan;
        let mut distinct = pool.particles().iter().map(|p| p.birth_time.to_bits()).collect::<Vec<_>>();
        distinct.sort_unstable();
        distinct.dedup();
        assert!(distinct.len() > 1);
        for p in pool.particles() {
            let fraction = p.age(100.0) / p.effective_lifespan(lifespan);
            assert!((0.0..FADE_START).contains(&fraction));
            assert_eq!(p.opacity, BASE_OPACITY);
        }
    }

    #[test]
    fn full_mask_spawns_on_body() {
        let vp = viewport();
        let frame = mask_frame();
        let mut pool = ParticlePool::new(config(1), &vp, &frame, 0.0, Some(3));
        let y = pool.particles()[0].position.y;
        assert!(y.abs() <= vp.visible_height() / 2.0 + 0.001);

        // Force lifespan expiry a few times; every respawn must use the mask.
        for i in 1..=5 {
            let stats = pool.update(1000.0 * i as f32, &vp, &frame);
            assert_eq!(stats.lifespan_respawns, 1);
            assert_eq!(stats.mask_spawns, 1);
            assert_eq!(stats.fallback_spawns, 0);
            assert_ne!(pool.particles()[0].position.y, fallback_y(&vp));
        }
    }

    #[test]
    fn missing_mask_always_falls_back() {
        let vp = viewport();
        let frame = SensorFrame::default();
        let mut pool = ParticlePool::new(config(1), &vp, &frame, 0.0, Some(4));
        assert_eq!(pool.particles()[0].position.y, fallback_y(&vp));
        for i in 1..=5 {
            let stats = pool.update(1000.0 * i as f32, &vp, &frame);
            assert_eq!(stats.fallback_spawns, 1);
            assert_eq!(pool.particles()[0].position.y, -vp.visible_height() / 2.0 - 5.0);
        }
    }

    #[test]
    fn infinite_lifespan_never_expires() {
        let vp = viewport();
        let cfg = BubbleConfig {
            lifespan: 0.0,
            ..config(20)
        };
        let mut pool = ParticlePool::new(cfg, &vp, &SensorFrame::default(), 0.0, Some(5));
        let stats = pool.update(1.0e6, &vp, &SensorFrame::default());
        assert_eq!(stats.lifespan_respawns, 0);
        assert!(pool.particles().iter().all(|p| p.opacity == BASE_OPACITY));
    }

    #[test]
    fn leaving_the_top_respawns() {
        let vp = viewport();
        let frame = SensorFrame::default();
        let cfg = BubbleConfig {
            lifespan: 0.0,
            ..config(1)
        };
        let mut pool = ParticlePool::new(cfg, &vp, &frame, 0.0, Some(6));
        pool.particles[0].position.y = vp.visible_height() / 2.0 + OFFSCREEN_MARGIN + 1.0;
        let stats = pool.update(0.1, &vp, &frame);
        assert_eq!(stats.bounds_respawns, 1);
        assert_eq!(pool.particles()[0].position.y, fallback_y(&vp));
    }

    #[test]
    fn lifespan_respawn_skips_bounds_check() {
        let vp = viewport();
        let frame = SensorFrame::default();
        let mut pool = ParticlePool::new(config(1), &vp, &frame, 0.0, Some(7));
        pool.particles[0].position.y = 1000.0;
        let stats = pool.update(1.0e4, &vp, &frame);
        assert_eq!(stats.lifespan_respawns, 1);
        assert_eq!(stats.bounds_respawns, 0);
        assert_eq!(stats.respawns(), 1);
    }

    #[test]
    fn particles_fade_near_end_of_life() {
        let vp = viewport();
        let frame = SensorFrame::default();
        let cfg = BubbleConfig {
            lifespan: 10.0,
            ..config(1)
        };
        let mut pool = ParticlePool::new(cfg, &vp, &frame, 0.0, Some(8));
        pool.particles[0].birth_time = 0.0;
        pool.particles[0].lifespan_multiplier = 1.0;
        pool.update(9.0, &vp, &frame);
        assert!((pool.particles()[0].opacity - BASE_OPACITY * 0.5).abs() < 1e-4);
        pool.update(5.0, &vp, &frame);
        assert_eq!(pool.particles()[0].opacity, BASE_OPACITY);
    }

    #[test]
    fn depth_drives_scale_on_update() {
        let vp = viewport();
        let hub = SensorHub::new();
        hub.mask.publish(MaskSnapshot::filled(8, 8, 255));
        hub.depth.publish(DepthSnapshot::filled(4, 4, 0));
        let frame = hub.frame();
        let mut pool = ParticlePool::new(config(10), &vp, &frame, 0.0, Some(9));
        pool.update(0.016, &vp, &frame);
        for p in pool.particles() {
            assert_eq!(p.depth_value, 1.0);
            assert!((p.scale - p.initial_scale * 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn same_seed_same_pool() {
        let vp = viewport();
        let frame = mask_frame();
        let mut a = ParticlePool::new(config(30), &vp, &frame, 0.0, Some(10));
        let mut b = ParticlePool::new(config(30), &vp, &frame, 0.0, Some(10));
        for i in 0..50 {
            let t = i as f32 * 0.5;
            assert_eq!(a.update(t, &vp, &frame), b.update(t, &vp, &frame));
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn config_changes_classified() {
        let vp = viewport();
        let frame = SensorFrame::default();
        let mut pool = ParticlePool::new(config(10), &vp, &frame, 0.0, Some(11));

        assert_eq!(pool.apply_config(config(10), &vp, &frame, 1.0), ConfigChange::Unchanged);

        let faster = BubbleConfig {
            particle_speed: 4.0,
            ..config(10)
        };
        assert_eq!(pool.apply_config(faster.clone(), &vp, &frame, 1.0), ConfigChange::Updated);
        assert_eq!(pool.config().particle_speed, 4.0);

        let skeleton = BubbleConfig {
            spawn_on_body: false,
            ..faster.clone()
        };
        assert_eq!(pool.apply_config(skeleton.clone(), &vp, &frame, 2.0), ConfigChange::ModeSwitched);
        assert!(pool.particles().iter().all(|p| p.birth_time == 2.0));

        let bigger = BubbleConfig {
            particle_count: 25,
            ..skeleton
        };
        assert_eq!(pool.apply_config(bigger, &vp, &frame, 3.0), ConfigChange::Rebuilt);
        assert_eq!(pool.len(), 25);
    }

    #[test]
    fn skeleton_mode_pushes_particles() {
        let vp = viewport();
        let hub = SensorHub::new();
        let mut person = Person::default();
        // Right wrist dead centre of a 640x480 frame.
        person.keypoints[KeypointIndex::RightWrist as usize] = Keypoint::new(320.0, 240.0, 0.9);
        hub.pose.publish(PoseSnapshot::new(640.0, 480.0, vec![person]));
        let frame = hub.frame();

        let cfg = BubbleConfig {
            spawn_on_body: false,
            lifespan: 0.0,
            particle_speed: 0.0,
            ..config(1)
        };
        let mut pool = ParticlePool::new(cfg.clone(), &vp, &frame, 0.0, Some(12));
        pool.particles[0].position = glam::Vec3::new(0.5, 0.0, 0.0);
        pool.update(0.0, &vp, &frame);
        let pushed = pool.particles()[0];
        assert!(pushed.position.x > 0.5);
        assert!(pushed.scale > pushed.initial_scale);

        // Body mode never consults the pose.
        let body = BubbleConfig {
            spawn_on_body: true,
            ..cfg
        };
        let mut pool = ParticlePool::new(body, &vp, &frame, 0.0, Some(12));
        pool.particles[0].position = glam::Vec3::new(0.5, 0.0, 0.0);
        pool.particles[0].depth_value = 0.5;
        pool.update(0.0, &vp, &frame);
        let untouched = pool.particles()[0];
        assert!(untouched.position.x < 0.52);
        assert_eq!(untouched.scale, untouched.depth_scale());
    }

    fn skeleton_pool_with_wrist_at_centre() -> (Viewport, SensorFrame, ParticlePool) {
        let vp = viewport();
        let hub = SensorHub::new();
        let mut person = Person::default();
        person.keypoints[KeypointIndex::RightWrist as usize] = Keypoint::new(320.0, 240.0, 0.9);
        hub.pose.publish(PoseSnapshot::new(640.0, 480.0, vec![person]));
        let frame = hub.frame();
        let cfg = BubbleConfig {
            spawn_on_body: false,
            lifespan: 0.0,
            particle_speed: 0.0,
            ..config(1)
        };
        let pool = ParticlePool::new(cfg, &vp, &frame, 0.0, Some(13));
        (vp, frame, pool)
    }

    #[test]
    fn scale_eases_back_after_push_ends() {
        let (vp, frame, mut pool) = skeleton_pool_with_wrist_at_centre();
        pool.particles[0].position = glam::Vec3::new(0.5, 0.0, 0.0);
        pool.update(0.0, &vp, &frame);
        let initial = pool.particles()[0].initial_scale;
        let pushed = pool.particles()[0].scale;
        assert!(pushed > initial * 1.4);

        // Well outside the radius; wobble alone cannot bring it back in.
        pool.particles[0].position = glam::Vec3::new(8.0, 0.0, 0.0);
        let mut previous_gap = pushed - initial;
        for _ in 0..50 {
            pool.update(0.0, &vp, &frame);
            let gap = pool.particles()[0].scale - initial;
            assert!(gap > 0.0);
            assert!((gap - previous_gap * (1.0 - RELAX_RATE)).abs() < 1e-5);
            previous_gap = gap;
        }
        assert!(previous_gap < (pushed - initial) * 0.01);
    }

    #[test]
    fn skeleton_mode_without_pose_relaxes_scale() {
        let vp = viewport();
        let frame = SensorFrame::default();
        let cfg = BubbleConfig {
            spawn_on_body: false,
            lifespan: 0.0,
            particle_speed: 0.0,
            ..config(1)
        };
        let mut pool = ParticlePool::new(cfg, &vp, &frame, 0.0, Some(14));
        let initial = pool.particles()[0].initial_scale;
        assert_eq!(pool.particles()[0].scale, initial);
        pool.particles[0].scale = initial * 1.5;
        pool.update(0.0, &vp, &frame);
        assert!((pool.particles()[0].scale - initial * 1.45).abs() < 1e-5);
    }
}
