//! Core engine types and utilities for the bubble field.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Frame timing for the render tick
//! - Viewport mapping from sensor space to world space
//! - Latest-value cells for asynchronously published data

pub mod latest;
pub mod time;
pub mod viewport;

pub use latest::*;
pub use time::*;
pub use viewport::*;

// Re-export commonly used types
pub use glam::{Vec2, Vec3};
