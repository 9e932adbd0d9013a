//! Stand-in detectors for running without a camera.
//!
//! All three derive their output from the same figure swaying across the
//! frame, so pose, mask and depth agree with each other even though they
//! publish at different rates and resolutions. Every 20 seconds the figure
//! steps out of frame for 5 seconds.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sensors::{DepthSnapshot, Detector, Keypoint, KeypointIndex, MaskSnapshot, Person, PoseSnapshot};

const CYCLE_SECONDS: f32 = 20.0;
const ABSENT_SECONDS: f32 = 5.0;

/// Silhouette in normalized image coordinates (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Figure {
    cx: f32,
    cy: f32,
}

impl Figure {
    const HEAD_RADIUS: f32 = 0.08;
    const TORSO_RX: f32 = 0.13;
    const TORSO_RY: f32 = 0.3;

    fn at(t: f32) -> Option<Self> {
        if t.rem_euclid(CYCLE_SECONDS) > CYCLE_SECONDS - ABSENT_SECONDS {
            return None;
        }
        Some(Self {
            cx: 0.5 + 0.25 * (t * 0.4).sin(),
            cy: 0.55 + 0.03 * (t * 1.3).sin(),
        })
    }

    fn head(&self) -> (f32, f32) {
        (self.cx, self.cy - 0.36)
    }

    fn contains(&self, u: f32, v: f32) -> bool {
        let (hx, hy) = self.head();
        let in_head = (u - hx).powi(2) + (v - hy).powi(2) < Self::HEAD_RADIUS.powi(2);
        in_head || self.torso_distance(u, v) < 1.0
    }

    /// Normalized elliptical distance from the torso centre; < 1 inside.
    fn torso_distance(&self, u: f32, v: f32) -> f32 {
        (((u - self.cx) / Self::TORSO_RX).powi(2) + ((v - self.cy) / Self::TORSO_RY).powi(2)).sqrt()
    }
}

fn seconds_since(clock: Instant) -> f32 {
    clock.elapsed().as_secs_f32()
}

/// Person segmentation stand-in: RGBA, alpha = 255 on the figure.
pub struct SyntheticMask {
    clock: Instant,
    width: u32,
    height: u32,
}

impl SyntheticMask {
    pub fn new(clock: Instant, width: u32, height: u32) -> Self {
        Self { clock, width, height }
    }

    fn render(&self, figure: Option<Figure>) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * MaskSnapshot::STRIDE);
        for y in 0..self.height {
            for x in 0..self.width {
                let u = (x as f32 + 0.5) / self.width as f32;
                let v = (y as f32 + 0.5) / self.height as f32;
                let alpha = match figure {
                    Some(f) if f.contains(u, v) => 255,
                    _ => 0,
                };
                data.extend_from_slice(&[0, 0, 0, alpha]);
            }
        }
        data
    }
}

impl Detector for SyntheticMask {
    type Output = MaskSnapshot;

    fn name(&self) -> &str {
        "mask"
    }

    fn detect(&mut self) -> Option<MaskSnapshot> {
        let data = self.render(Figure::at(seconds_since(self.clock)));
        match MaskSnapshot::new(self.width, self.height, data) {
            Ok(mask) => Some(mask),
            Err(e) => {
                log::warn!("Dropping mask frame: {}", e);
                None
            }
        }
    }
}

/// Depth stand-in: RGBA with red = 0 near, 255 far. The figure is near,
/// nearest at its centre line.
pub struct SyntheticDepth {
    clock: Instant,
    width: u32,
    height: u32,
}

impl SyntheticDepth {
    pub fn new(clock: Instant, width: u32, height: u32) -> Self {
        Self { clock, width, height }
    }

    fn raw_at(figure: Option<Figure>, u: f32, v: f32) -> u8 {
        match figure {
            Some(f) if f.contains(u, v) => {
                let d = f.torso_distance(u, v).min(1.0);
                (30.0 + d * 90.0) as u8
            }
            // Background recedes toward the top of the frame.
            _ => (200.0 + (1.0 - v) * 55.0) as u8,
        }
    }
}

impl Detector for SyntheticDepth {
    type Output = DepthSnapshot;

    fn name(&self) -> &str {
        "depth"
    }

    fn detect(&mut self) -> Option<DepthSnapshot> {
        let figure = Figure::at(seconds_since(self.clock));
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let u = (x as f32 + 0.5) / self.width as f32;
                let v = (y as f32 + 0.5) / self.height as f32;
                let raw = Self::raw_at(figure, u, v);
                data.extend_from_slice(&[raw, raw, raw, 255]);
            }
        }
        match DepthSnapshot::new(self.width, self.height, 4, data) {
            Ok(depth) => Some(depth),
            Err(e) => {
                log::warn!("Dropping depth frame: {}", e);
                None
            }
        }
    }
}

/// Pose stand-in: one skeleton matching the figure, with jittered confidence.
pub struct SyntheticPose {
    clock: Instant,
    frame_width: f32,
    frame_height: f32,
    rng: StdRng,
}

impl SyntheticPose {
    pub fn new(clock: Instant, frame_width: u32, frame_height: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            clock,
            frame_width: frame_width as f32,
            frame_height: frame_height as f32,
            rng,
        }
    }

    fn skeleton(&mut self, figure: Figure, t: f32) -> Person {
        let swing = 0.06 * (t * 2.0).sin();
        let (hx, hy) = figure.head();
        let Figure { cx, cy } = figure;
        let layout: [(KeypointIndex, f32, f32); KeypointIndex::COUNT] = [
            (KeypointIndex::Nose, hx, hy + 0.02),
            (KeypointIndex::LeftEye, hx - 0.02, hy),
            (KeypointIndex::RightEye, hx + 0.02, hy),
            (KeypointIndex::LeftEar, hx - 0.04, hy + 0.01),
            (KeypointIndex::RightEar, hx + 0.04, hy + 0.01),
            (KeypointIndex::LeftShoulder, cx - 0.1, cy - 0.2),
            (KeypointIndex::RightShoulder, cx + 0.1, cy - 0.2),
            (KeypointIndex::LeftElbow, cx - 0.17, cy - 0.05 + swing),
            (KeypointIndex::RightElbow, cx + 0.17, cy - 0.05 - swing),
            (KeypointIndex::LeftWrist, cx - 0.21, cy + 0.1 + 2.0 * swing),
            (KeypointIndex::RightWrist, cx + 0.21, cy + 0.1 - 2.0 * swing),
            (KeypointIndex::LeftHip, cx - 0.07, cy + 0.12),
            (KeypointIndex::RightHip, cx + 0.07, cy + 0.12),
            (KeypointIndex::LeftKnee, cx - 0.07, cy + 0.28),
            (KeypointIndex::RightKnee, cx + 0.07, cy + 0.28),
            (KeypointIndex::LeftAnkle, cx - 0.07, cy + 0.42),
            (KeypointIndex::RightAnkle, cx + 0.07, cy + 0.42),
        ];

        let mut person = Person::default();
        for (index, u, v) in layout {
            person.keypoints[index as usize] = Keypoint::new(
                u * self.frame_width,
                v * self.frame_height,
                self.rng.gen_range(0.15..0.95),
            );
        }
        person
    }
}

impl Detector for SyntheticPose {
    type Output = PoseSnapshot;

    fn name(&self) -> &str {
        "pose"
    }

    fn detect(&mut self) -> Option<PoseSnapshot> {
        let t = seconds_since(self.clock);
        let persons = match Figure::at(t) {
            Some(figure) => vec![self.skeleton(figure, t)],
            None => Vec::new(),
        };
        Some(PoseSnapshot::new(self.frame_width, self.frame_height, persons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_leaves_frame_each_cycle() {
        assert!(Figure::at(1.0).is_some());
        assert!(Figure::at(CYCLE_SECONDS - 1.0).is_none());
        assert!(Figure::at(CYCLE_SECONDS + 1.0).is_some());
    }

    #[test]
    fn figure_contains_its_centre_not_corners() {
        let figure = Figure::at(0.0).unwrap();
        assert!(figure.contains(figure.cx, figure.cy));
        assert!(!figure.contains(0.0, 0.0));
        assert!(!figure.contains(1.0, 1.0));
    }

    #[test]
    fn mask_marks_figure_pixels() {
        let mut mask = SyntheticMask::new(Instant::now(), 64, 48);
        let snapshot = mask.detect().unwrap();
        assert!(snapshot.has_pixels());
        let person_pixels = snapshot.data.chunks_exact(4).filter(|px| px[3] > 127).count();
        assert!(person_pixels > 0);
        assert!(person_pixels < 64 * 48);
    }

    #[test]
    fn depth_is_nearer_on_figure() {
        let figure = Figure::at(0.0);
        let on = SyntheticDepth::raw_at(figure, 0.5, 0.55);
        let off = SyntheticDepth::raw_at(figure, 0.02, 0.02);
        assert!(on < off);
        let mut depth = SyntheticDepth::new(Instant::now(), 32, 24);
        let snapshot = depth.detect().unwrap();
        assert_eq!(snapshot.stride, 4);
        assert!(snapshot.has_pixels());
    }

    #[test]
    fn pose_keypoints_in_frame_pixels() {
        let mut pose = SyntheticPose::new(Instant::now(), 640, 480, Some(1));
        let snapshot = pose.detect().unwrap();
        assert_eq!(snapshot.persons.len(), 1);
        for kp in &snapshot.persons[0].keypoints {
            assert!((0.0..=640.0).contains(&kp.x));
            assert!((0.0..=480.0).contains(&kp.y));
            assert!((0.15..0.95).contains(&kp.confidence));
        }
    }
}
