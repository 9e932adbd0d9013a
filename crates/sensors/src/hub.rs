//! Latest-value slots for the three detectors and the per-tick view of them.

use std::sync::Arc;

use engine_core::Latest;

use crate::pose::PoseSnapshot;
use crate::snapshot::{DepthSnapshot, MaskSnapshot};

/// One slot per detector. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct SensorHub {
    pub pose: Latest<PoseSnapshot>,
    pub mask: Latest<MaskSnapshot>,
    pub depth: Latest<DepthSnapshot>,
}

impl SensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take whatever each detector published last. Never blocks on a detector.
    pub fn frame(&self) -> SensorFrame {
        SensorFrame {
            pose: self.pose.get(),
            mask: self.mask.get(),
            depth: self.depth.get(),
        }
    }

    /// Sum of publish counts across all slots, for change detection.
    pub fn generation(&self) -> u64 {
        self.pose.generation() + self.mask.generation() + self.depth.generation()
    }
}

/// Snapshots as seen by one render tick.
#[derive(Debug, Clone, Default)]
pub struct SensorFrame {
    pub pose: Option<Arc<PoseSnapshot>>,
    pub mask: Option<Arc<MaskSnapshot>>,
    pub depth: Option<Arc<DepthSnapshot>>,
}

impl SensorFrame {
    /// Mask snapshot, if one exists and actually carries pixels.
    pub fn usable_mask(&self) -> Option<&MaskSnapshot> {
        self.mask.as_deref().filter(|m| m.has_pixels())
    }

    /// Depth snapshot, if one exists and actually carries pixels.
    pub fn usable_depth(&self) -> Option<&DepthSnapshot> {
        self.depth.as_deref().filter(|d| d.has_pixels())
    }

    pub fn pose(&self) -> Option<&PoseSnapshot> {
        self.pose.as_deref()
    }
}
