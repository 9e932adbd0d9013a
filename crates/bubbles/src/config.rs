//! App configuration (viewport, tick rate, detectors, bubbles). Loaded from config.ron at startup
//! and re-read whenever the file changes.

use particles::BubbleConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Persistent settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Viewport width in logical pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Viewport height in logical pixels.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    /// Camera distance from the particle plane.
    #[serde(default = "default_camera_distance")]
    pub camera_distance: f32,
    /// Render ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,
    /// Stop after this many seconds. 0 = run until killed.
    #[serde(default)]
    pub run_seconds: f32,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Detector cadences in milliseconds.
    #[serde(default = "default_pose_interval")]
    pub pose_interval_ms: u64,
    #[serde(default = "default_mask_interval")]
    pub mask_interval_ms: u64,
    #[serde(default = "default_depth_interval")]
    pub depth_interval_ms: u64,
    #[serde(default)]
    pub bubbles: BubbleConfig,
}

fn default_viewport_width() -> u32 {
    1280
}
fn default_viewport_height() -> u32 {
    720
}
fn default_fov() -> f32 {
    75.0
}
fn default_camera_distance() -> f32 {
    15.0
}
fn default_tick_rate() -> f64 {
    60.0
}
fn default_pose_interval() -> u64 {
    33
}
fn default_mask_interval() -> u64 {
    66
}
fn default_depth_interval() -> u64 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            fov_degrees: default_fov(),
            camera_distance: default_camera_distance(),
            tick_rate_hz: default_tick_rate(),
            run_seconds: 0.0,
            seed: None,
            pose_interval_ms: default_pose_interval(),
            mask_interval_ms: default_mask_interval(),
            depth_interval_ms: default_depth_interval(),
            bubbles: BubbleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Some(c) => c,
            None => Self::default(),
        }
    }

    fn try_load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match ron::from_str(&data) {
            Ok(c) => Some(Self::sanitized(c)),
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                None
            }
        }
    }

    /// Replace camera values that would give a degenerate viewport with defaults.
    ///
    /// The field of view must lie strictly inside (0, 180) degrees and the
    /// camera must sit in front of the particle plane.
    pub fn sanitized(mut self) -> Self {
        if !(self.fov_degrees.is_finite() && self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            log::warn!("fov_degrees {} out of range, using {}", self.fov_degrees, default_fov());
            self.fov_degrees = default_fov();
        }
        if !(self.camera_distance.is_finite() && self.camera_distance > 0.0) {
            log::warn!(
                "camera_distance {} out of range, using {}",
                self.camera_distance,
                default_camera_distance()
            );
            self.camera_distance = default_camera_distance();
        }
        self
    }

    /// Save current config to `path`. Logs on error.
    pub fn save(&self, path: &Path) {
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Viewport-affecting fields differ from `other`.
    pub fn viewport_changed(&self, other: &AppConfig) -> bool {
        self.viewport_width != other.viewport_width
            || self.viewport_height != other.viewport_height
            || self.fov_degrees != other.fov_degrees
            || self.camera_distance != other.camera_distance
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

/// Notices edits to the config file between polls.
pub struct ConfigWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Self {
        let last_modified = modified(&path);
        Self { path, last_modified }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the re-read config if the file changed since the last poll.
    pub fn poll(&mut self) -> Option<AppConfig> {
        let current = modified(&self.path);
        if current == self.last_modified {
            return None;
        }
        self.last_modified = current;
        let config = AppConfig::try_load(&self.path)?;
        log::info!("Reloaded {:?}", self.path);
        Some(config)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
