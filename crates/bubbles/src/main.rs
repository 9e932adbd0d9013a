//! Bubble field driven by body tracking.
//!
//! Starts the detector threads, then runs the render tick: each tick reads
//! the latest snapshots, advances the particle pool and produces instance
//! data for the renderer.

mod config;
mod synthetic;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_core::{Time, Viewport};
use particles::{ConfigChange, ParticlePool, TickStats};
use sensors::{spawn_producer, ProducerHandle, SensorHub};

use config::{config_path, AppConfig, ConfigWatcher};
use synthetic::{SyntheticDepth, SyntheticMask, SyntheticPose};

/// Camera frame size the pose detector reports in.
const CAMERA_SIZE: (u32, u32) = (640, 480);
/// Segmentation runs on a downscaled frame.
const MASK_SIZE: (u32, u32) = (256, 192);
const DEPTH_SIZE: (u32, u32) = (128, 96);

fn start_detectors(app: &AppConfig, hub: &SensorHub, running: &Arc<AtomicBool>) -> Result<Vec<ProducerHandle>> {
    let clock = Instant::now();
    let pose = spawn_producer(
        SyntheticPose::new(clock, CAMERA_SIZE.0, CAMERA_SIZE.1, app.seed),
        hub.pose.clone(),
        Duration::from_millis(app.pose_interval_ms),
        running.clone(),
    )
    .context("Failed to start pose detector")?;
    let mask = spawn_producer(
        SyntheticMask::new(clock, MASK_SIZE.0, MASK_SIZE.1),
        hub.mask.clone(),
        Duration::from_millis(app.mask_interval_ms),
        running.clone(),
    )
    .context("Failed to start mask detector")?;
    let depth = spawn_producer(
        SyntheticDepth::new(clock, DEPTH_SIZE.0, DEPTH_SIZE.1),
        hub.depth.clone(),
        Duration::from_millis(app.depth_interval_ms),
        running.clone(),
    )
    .context("Failed to start depth detector")?;
    Ok(vec![pose, mask, depth])
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = config_path();
    let mut app = AppConfig::load(&path);
    if !path.exists() {
        app.save(&path);
    }
    let mut watcher = ConfigWatcher::new(path);
    log::info!("Starting bubbles ({} particles)", app.bubbles.particle_count);

    let mut viewport = Viewport::new(app.viewport_width, app.viewport_height, app.fov_degrees, app.camera_distance);
    let hub = SensorHub::new();
    let running = Arc::new(AtomicBool::new(true));
    let producers = start_detectors(&app, &hub, &running)?;

    let mut time = Time::new();
    time.set_tick_rate(app.tick_rate_hz);
    let mut pool = ParticlePool::new(app.bubbles.clone(), &viewport, &hub.frame(), 0.0, app.seed);

    let mut window = TickStats::default();
    let mut window_start = 0.0f32;
    let mut window_frames = 0u64;
    let mut last_generation = hub.generation();

    loop {
        time.update();
        let t = time.elapsed_seconds();
        let frame = hub.frame();
        window += pool.update(t, &viewport, &frame);
        window_frames += 1;

        // Handed to the renderer's instance buffer.
        let instances = pool.instances();

        if t - window_start >= 1.0 {
            let half_height = viewport.visible_height() / 2.0;
            let visible = instances
                .iter()
                .filter(|i| i.opacity > 0.0 && i.position[1].abs() <= half_height)
                .count();
            let generation = hub.generation();
            log::info!(
                "{:.0} fps | {} visible | respawns {} (lifespan {}, top {}) | mask {} fallback {} | {} new snapshots",
                window_frames as f32 / (t - window_start),
                visible,
                window.respawns(),
                window.lifespan_respawns,
                window.bounds_respawns,
                window.mask_spawns,
                window.fallback_spawns,
                generation - last_generation,
            );
            last_generation = generation;
            window = TickStats::default();
            window_start = t;
            window_frames = 0;

            if let Some(updated) = watcher.poll() {
                if updated.viewport_changed(&app) {
                    viewport.resize(updated.viewport_width, updated.viewport_height);
                    viewport.set_fov_degrees(updated.fov_degrees);
                    viewport.set_distance(updated.camera_distance);
                }
                time.set_tick_rate(updated.tick_rate_hz);
                match pool.apply_config(updated.bubbles.clone(), &viewport, &frame, t) {
                    ConfigChange::Unchanged => {}
                    change => log::info!("Applied config from {:?}: {:?}", watcher.path(), change),
                }
                app = updated;
            }
        }

        if app.run_seconds > 0.0 && t >= app.run_seconds {
            break;
        }
        thread::sleep(time.time_until_next_tick());
    }

    running.store(false, Ordering::Release);
    for producer in producers {
        let name = producer.name().to_string();
        if let Some(published) = producer.join() {
            log::info!("Detector '{}' published {} snapshots", name, published);
        }
    }
    log::info!("Stopped after {} ticks", time.frame_count());
    Ok(())
}
