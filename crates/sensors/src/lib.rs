//! Sensor snapshots and the samplers that read them.
//!
//! Detectors (pose, person segmentation, depth) run on their own threads and
//! publish whole snapshots into a [`SensorHub`]. The render tick takes a
//! [`SensorFrame`] once per tick and hands it to the particle engine, which
//! only ever reads.

pub mod depth_sampler;
pub mod hub;
pub mod mask_sampler;
pub mod pose;
pub mod producer;
pub mod snapshot;

pub use depth_sampler::{sample_depth, NEUTRAL_DEPTH};
pub use hub::{SensorFrame, SensorHub};
pub use mask_sampler::{sample_mask, MaskHit, MAX_ATTEMPTS, PERSON_THRESHOLD};
pub use pose::{Keypoint, KeypointIndex, Person, PoseSnapshot};
pub use producer::{spawn_producer, Detector, ProducerHandle};
pub use snapshot::{DepthSnapshot, MaskChannel, MaskSnapshot, SnapshotError};
