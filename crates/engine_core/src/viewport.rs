//! Viewport mapping from normalized sensor space to world space.

use glam::Vec2;

/// Camera frustum slice at the particle plane.
///
/// The camera looks down -Z from a fixed distance, so the visible region at
/// z = 0 is a rectangle whose extents depend only on the vertical field of
/// view, the aspect ratio and that distance. Extents are cached and
/// recomputed whenever one of them changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Vertical field of view in degrees.
    fov_degrees: f32,
    /// Aspect ratio (width / height).
    aspect: f32,
    /// Camera distance along its view axis.
    distance: f32,
    visible_width: f32,
    visible_height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 75.0, 15.0)
    }
}

impl Viewport {
    /// Create a viewport for a surface of `width` x `height` pixels.
    pub fn new(width: u32, height: u32, fov_degrees: f32, distance: f32) -> Self {
        let mut viewport = Self {
            fov_degrees,
            aspect: aspect_of(width, height),
            distance,
            visible_width: 0.0,
            visible_height: 0.0,
        };
        viewport.recompute();
        viewport
    }

    /// Update aspect ratio (call on window resize).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_of(width, height);
        self.recompute();
    }

    /// Change the vertical field of view.
    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov_degrees = fov_degrees;
        self.recompute();
    }

    /// Move the camera along its view axis.
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
        self.recompute();
    }

    fn recompute(&mut self) {
        let fov_rad = self.fov_degrees.to_radians();
        self.visible_height = 2.0 * (fov_rad / 2.0).tan() * self.distance;
        self.visible_width = self.visible_height * self.aspect;
    }

    /// Width of the visible region at the particle plane.
    pub fn visible_width(&self) -> f32 {
        self.visible_width
    }

    /// Height of the visible region at the particle plane.
    pub fn visible_height(&self) -> f32 {
        self.visible_height
    }

    /// Map normalized coordinates in [0, 1] to world space, centred on the origin.
    pub fn to_world(&self, norm_x: f32, norm_y: f32) -> Vec2 {
        Vec2::new(
            (norm_x - 0.5) * self.visible_width,
            (norm_y - 0.5) * self.visible_height,
        )
    }

    /// Map a raw sensor-space coordinate to world space.
    ///
    /// Sensor images are mirrored horizontally (selfie view) and have y
    /// growing downward, so both axes are flipped before mapping.
    pub fn sensor_to_world(&self, raw_x: f32, raw_y: f32, width: f32, height: f32) -> Vec2 {
        self.to_world(mirror(raw_x, width), mirror(raw_y, height))
    }
}

/// `1 - raw / dimension`, the mirrored fraction of a sensor coordinate.
pub fn mirror(raw: f32, dimension: f32) -> f32 {
    1.0 - raw / dimension
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}
