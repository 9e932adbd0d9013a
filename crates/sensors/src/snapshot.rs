//! Pixel snapshots produced by the segmentation and depth detectors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a snapshot from a detector buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot has zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
    #[error("snapshot stride must be at least 1")]
    ZeroStride,
    #[error("pixel buffer too small: expected {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
}

/// Which RGBA channel marks a pixel as "person" in the segmentation mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskChannel {
    /// Alpha channel. What the segmentation model is known to fill in.
    #[default]
    Alpha,
    Red,
}

impl MaskChannel {
    /// Byte offset of the channel inside an RGBA pixel.
    pub fn offset(self) -> usize {
        match self {
            MaskChannel::Alpha => 3,
            MaskChannel::Red => 0,
        }
    }
}

/// Person segmentation mask, RGBA with a stride of 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSnapshot {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl MaskSnapshot {
    /// Bytes per pixel.
    pub const STRIDE: usize = 4;

    /// Build a mask, checking that `data` covers every pixel.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, SnapshotError> {
        check_buffer(width, height, Self::STRIDE, data.len())?;
        Ok(Self { width, height, data })
    }

    /// Mask where every pixel has the same `alpha`, handy for tests and demos.
    pub fn filled(width: u32, height: u32, alpha: u8) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * Self::STRIDE);
        for _ in 0..pixels {
            data.extend_from_slice(&[255, 255, 255, alpha]);
        }
        Self { width, height, data }
    }

    /// Whether the buffer actually holds pixel data for the declared size.
    pub fn has_pixels(&self) -> bool {
        check_buffer(self.width, self.height, Self::STRIDE, self.data.len()).is_ok()
    }

    /// Raw channel value at a pixel, `None` outside the buffer.
    pub fn channel_at(&self, x: u32, y: u32, channel: MaskChannel) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * Self::STRIDE + channel.offset();
        self.data.get(idx).copied()
    }

    /// Set the RGBA value of one pixel. Out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * Self::STRIDE;
        if let Some(px) = self.data.get_mut(idx..idx + Self::STRIDE) {
            px.copy_from_slice(&rgba);
        }
    }
}

/// Depth map. The first byte of every pixel (red) is inverse-normalized
/// distance: 0 = near, 255 = far.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthSnapshot {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel, at least 1.
    pub stride: usize,
    pub data: Vec<u8>,
}

impl DepthSnapshot {
    pub fn new(width: u32, height: u32, stride: usize, data: Vec<u8>) -> Result<Self, SnapshotError> {
        check_buffer(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Single-channel depth map where every pixel reads `raw`.
    pub fn filled(width: u32, height: u32, raw: u8) -> Self {
        Self {
            width,
            height,
            stride: 1,
            data: vec![raw; width as usize * height as usize],
        }
    }

    pub fn has_pixels(&self) -> bool {
        check_buffer(self.width, self.height, self.stride, self.data.len()).is_ok()
    }

    /// Red channel at a pixel, `None` outside the buffer.
    pub fn red_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * self.stride;
        self.data.get(idx).copied()
    }
}

fn check_buffer(width: u32, height: u32, stride: usize, len: usize) -> Result<(), SnapshotError> {
    if width == 0 || height == 0 {
        return Err(SnapshotError::ZeroDimension { width, height });
    }
    if stride == 0 {
        return Err(SnapshotError::ZeroStride);
    }
    let expected = width as usize * height as usize * stride;
    if len < expected {
        return Err(SnapshotError::BufferTooSmall {
            expected,
            actual: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_new_rejects_short_buffer() {
        let err = MaskSnapshot::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::BufferTooSmall {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn mask_new_rejects_zero_dimension() {
        assert!(matches!(
            MaskSnapshot::new(0, 4, Vec::new()),
            Err(SnapshotError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn mask_without_data_has_no_pixels() {
        let mask = MaskSnapshot {
            width: 8,
            height: 8,
            data: Vec::new(),
        };
        assert!(!mask.has_pixels());
        assert!(MaskSnapshot::filled(8, 8, 255).has_pixels());
    }

    #[test]
    fn channel_at_reads_selected_channel() {
        let mut mask = MaskSnapshot::filled(3, 2, 0);
        mask.set_pixel(2, 1, [200, 0, 0, 50]);
        assert_eq!(mask.channel_at(2, 1, MaskChannel::Alpha), Some(50));
        assert_eq!(mask.channel_at(2, 1, MaskChannel::Red), Some(200));
        assert_eq!(mask.channel_at(3, 1, MaskChannel::Alpha), None);
    }

    #[test]
    fn depth_stride_selects_red_byte() {
        let data = vec![10, 99, 99, 99, 20, 99, 99, 99];
        let depth = DepthSnapshot::new(2, 1, 4, data).unwrap();
        assert_eq!(depth.red_at(0, 0), Some(10));
        assert_eq!(depth.red_at(1, 0), Some(20));
        assert_eq!(depth.red_at(0, 1), None);
    }

    #[test]
    fn depth_zero_stride_is_rejected() {
        assert_eq!(
            DepthSnapshot::new(1, 1, 0, vec![0]).unwrap_err(),
            SnapshotError::ZeroStride
        );
        let malformed = DepthSnapshot {
            width: 1,
            height: 1,
            stride: 0,
            data: vec![0],
        };
        assert!(!malformed.has_pixels());
    }
}
