//! Pose detector output: people with a fixed 17-keypoint skeleton.

use std::ops::RangeInclusive;

/// Keypoint layout shared by MoveNet/COCO style pose models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = 17;

    /// Shoulders down to ankles. Face points are left out.
    pub const LIMBS: RangeInclusive<usize> = 5..=16;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEye),
            2 => Some(Self::RightEye),
            3 => Some(Self::LeftEar),
            4 => Some(Self::RightEar),
            5 => Some(Self::LeftShoulder),
            6 => Some(Self::RightShoulder),
            7 => Some(Self::LeftElbow),
            8 => Some(Self::RightElbow),
            9 => Some(Self::LeftWrist),
            10 => Some(Self::RightWrist),
            11 => Some(Self::LeftHip),
            12 => Some(Self::RightHip),
            13 => Some(Self::LeftKnee),
            14 => Some(Self::RightKnee),
            15 => Some(Self::LeftAnkle),
            16 => Some(Self::RightAnkle),
            _ => None,
        }
    }
}

/// Single keypoint in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Confidence score (0.0 to 1.0).
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }
}

/// One detected person.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl Default for Person {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); KeypointIndex::COUNT],
        }
    }
}

impl Person {
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// Limb keypoints (shoulders through ankles), in index order.
    pub fn limbs(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints[KeypointIndex::LIMBS].iter()
    }

    /// Centre of the torso: mean of both shoulders and both hips.
    ///
    /// Only produced when all four points are above `min_confidence`; the
    /// synthesized point then carries full confidence.
    pub fn torso_center(&self, min_confidence: f32) -> Option<Keypoint> {
        let corners = [
            self.get(KeypointIndex::LeftShoulder),
            self.get(KeypointIndex::RightShoulder),
            self.get(KeypointIndex::LeftHip),
            self.get(KeypointIndex::RightHip),
        ];
        if corners.iter().any(|k| k.confidence <= min_confidence) {
            return None;
        }
        let x = corners.iter().map(|k| k.x).sum::<f32>() / 4.0;
        let y = corners.iter().map(|k| k.y).sum::<f32>() / 4.0;
        Some(Keypoint::new(x, y, 1.0))
    }
}

/// Everything the pose detector found in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSnapshot {
    /// Source frame size the keypoint pixels refer to.
    pub frame_width: f32,
    pub frame_height: f32,
    pub persons: Vec<Person>,
}

impl PoseSnapshot {
    pub fn new(frame_width: f32, frame_height: f32, persons: Vec<Person>) -> Self {
        Self {
            frame_width,
            frame_height,
            persons,
        }
    }
}
