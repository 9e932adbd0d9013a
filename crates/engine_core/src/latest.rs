//! Single-writer, multi-reader latest-value cell.
//!
//! A producer thread publishes whole values; readers take a cheap `Arc`
//! handle to whatever was published last. The lock is held only for the
//! pointer swap, never while a value is built or read.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared slot holding the most recently published value.
#[derive(Debug)]
pub struct Latest<T> {
    slot: Arc<Mutex<Option<Arc<T>>>>,
    generation: Arc<AtomicU64>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Latest<T> {
    /// Create an empty slot. Readers see `None` until the first publish.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the current value wholesale.
    pub fn publish(&self, value: T) {
        self.publish_arc(Arc::new(value));
    }

    /// Replace the current value with an already shared one.
    pub fn publish_arc(&self, value: Arc<T>) {
        *self.lock() = Some(value);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Latest published value. Stays the same until the next publish.
    pub fn get(&self) -> Option<Arc<T>> {
        self.lock().clone()
    }

    /// Number of publishes so far; increments on every new value.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Drop the current value so readers see `None` again.
    pub fn clear(&self) {
        *self.lock() = None;
        self.generation.fetch_add(1, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<T>>> {
        // A panicking writer can only have left a complete pointer behind.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
