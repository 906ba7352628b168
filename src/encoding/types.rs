use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters handed to the encoder when a session begins.
///
/// `quality` uses the converter's 1-10 scale where a *lower* value means
/// higher visual fidelity. `frame_rate` must be the effective negotiated
/// stream rate; feeding the requested rate here instead silently produces
/// sped-up or slowed-down playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub quality: u8,
}

impl EncoderSettings {
    /// Wall-clock spacing between captured frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}

/// The final encoded clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Artifact {
    pub fn gif(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/gif".to_string(),
        }
    }
}
