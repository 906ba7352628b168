//! Common data types for camera streams and raw frames.

use serde::{Deserialize, Serialize};

/// Requested capture parameters. These are ideal hints, not hard
/// requirements; the negotiated values live in [`StreamParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frame_rate: 15,
        }
    }
}

/// Effective parameters negotiated with the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

/// A single raw frame in packed RGB24, row-major.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// `data` must hold exactly `width * height * 3` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            width,
            height,
            data,
        }
    }
}
