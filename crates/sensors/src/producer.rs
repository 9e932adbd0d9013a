//! Detector threads publishing into latest-value slots.
//!
//! Each detector runs on its own thread at its own cadence. Nothing chains
//! between detectors; the render tick only ever reads the slots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use engine_core::Latest;

/// A source of snapshots (pose model, segmentation model, depth model, ...).
pub trait Detector: Send + 'static {
    type Output: Send + Sync + 'static;

    /// Short name used for the thread and in logs.
    fn name(&self) -> &str;

    /// Run one inference cycle. `None` leaves the previous snapshot in place.
    fn detect(&mut self) -> Option<Self::Output>;
}

/// Running producer thread. Join after clearing the shared running flag.
pub struct ProducerHandle {
    name: String,
    handle: thread::JoinHandle<u64>,
}

impl ProducerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the thread to stop. Returns the number of snapshots it
    /// published, or `None` if the detector panicked.
    pub fn join(self) -> Option<u64> {
        match self.handle.join() {
            Ok(published) => Some(published),
            Err(_) => {
                log::warn!("Detector '{}' panicked", self.name);
                None
            }
        }
    }
}

/// Start `detector` on its own thread, publishing into `slot` at most once per
/// `cadence` until `running` is cleared.
pub fn spawn_producer<D: Detector>(
    mut detector: D,
    slot: Latest<D::Output>,
    cadence: Duration,
    running: Arc<AtomicBool>,
) -> std::io::Result<ProducerHandle> {
    let name = detector.name().to_string();
    let handle = thread::Builder::new()
        .name(format!("detector-{name}"))
        .spawn(move || {
            let mut published = 0u64;
            while running.load(Ordering::Acquire) {
                let started = Instant::now();
                if let Some(output) = detector.detect() {
                    slot.publish(output);
                    published += 1;
                }
                thread::sleep(cadence.saturating_sub(started.elapsed()));
            }
            log::debug!("Detector '{}' stopped after {} snapshots", detector.name(), published);
            published
        })?;

    log::debug!("Started detector '{}' every {:?}", name, cadence);
    Ok(ProducerHandle { name, handle })
}
