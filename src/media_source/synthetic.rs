//! Deterministic test-pattern source.
//!
//! Stands in for a hardware webcam: it negotiates constraints against a fixed
//! capability ceiling the way a real device degrades oversized hints, and it
//! renders a moving gradient so consecutive frames differ. Used by the
//! `record` subcommand and by the controller tests.

use async_trait::async_trait;
use log::debug;

use crate::error_handling::types::CaptureError;
use crate::media_source::source_trait::{MediaSource, VideoStream};
use crate::media_source::types::{StreamConstraints, StreamParams, VideoFrame};

/// Capability ceiling of the simulated device.
const MAX_WIDTH: u32 = 1280;
const MAX_HEIGHT: u32 = 720;
const MAX_FRAME_RATE: u32 = 30;

/// A camera that always exists and renders a synthetic pattern.
///
/// `denying()` and `unavailable()` build sources that fail acquisition the
/// way `getUserMedia` does, for exercising the error paths.
pub struct SyntheticSource {
    deny_access: bool,
    device_present: bool,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            deny_access: false,
            device_present: true,
        }
    }

    /// A source whose permission prompt is always declined.
    pub fn denying() -> Self {
        Self {
            deny_access: true,
            device_present: true,
        }
    }

    /// A source with no matching capture device.
    pub fn unavailable() -> Self {
        Self {
            deny_access: false,
            device_present: false,
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSource for SyntheticSource {
    type Stream = SyntheticStream;

    async fn request_access(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<SyntheticStream, CaptureError> {
        if !self.device_present {
            return Err(CaptureError::DeviceUnavailable(
                "no capture device matches the requested constraints".into(),
            ));
        }
        if self.deny_access {
            return Err(CaptureError::PermissionDenied(
                "user declined the camera permission prompt".into(),
            ));
        }

        // Ideal hints degrade to the device ceiling.
        let params = StreamParams {
            width: constraints.width.clamp(2, MAX_WIDTH),
            height: constraints.height.clamp(2, MAX_HEIGHT),
            frame_rate: constraints.frame_rate.clamp(1, MAX_FRAME_RATE),
        };
        debug!(
            "synthetic stream negotiated {}x{}@{} (requested {}x{}@{})",
            params.width,
            params.height,
            params.frame_rate,
            constraints.width,
            constraints.height,
            constraints.frame_rate
        );
        Ok(SyntheticStream {
            params,
            frame_index: 0,
            live: true,
        })
    }
}

/// Live stream of generated frames.
#[derive(Debug)]
pub struct SyntheticStream {
    params: StreamParams,
    frame_index: u64,
    live: bool,
}

impl VideoStream for SyntheticStream {
    fn params(&self) -> StreamParams {
        self.params
    }

    fn next_frame(&mut self) -> Result<VideoFrame, CaptureError> {
        if !self.live {
            return Err(CaptureError::DeviceUnavailable(
                "stream has been released".into(),
            ));
        }
        let (w, h) = (self.params.width, self.params.height);
        let phase = (self.frame_index % 256) as u8;
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                data.push((x * 255 / w.max(1)) as u8);
                data.push((y * 255 / h.max(1)) as u8);
                data.push(phase);
            }
        }
        self.frame_index += 1;
        Ok(VideoFrame::new(w, h, data))
    }

    fn release(&mut self) {
        if self.live {
            debug!("synthetic stream released after {} frames", self.frame_index);
            self.live = false;
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn negotiation_degrades_oversized_hints() {
        let source = SyntheticSource::new();
        let stream = source
            .request_access(&StreamConstraints {
                width: 4096,
                height: 2160,
                frame_rate: 120,
            })
            .await
            .unwrap();
        let params = stream.params();
        assert_eq!(params.width, MAX_WIDTH);
        assert_eq!(params.height, MAX_HEIGHT);
        assert_eq!(params.frame_rate, MAX_FRAME_RATE);
    }

    #[tokio::test]
    async fn reasonable_hints_are_honored() {
        let source = SyntheticSource::new();
        let stream = source
            .request_access(&StreamConstraints::default())
            .await
            .unwrap();
        assert_eq!(
            stream.params(),
            StreamParams {
                width: 1280,
                height: 720,
                frame_rate: 15
            }
        );
    }

    #[tokio::test]
    async fn denied_permission_is_reported() {
        let source = SyntheticSource::denying();
        let err = source
            .request_access(&StreamConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn missing_device_is_reported() {
        let source = SyntheticSource::unavailable();
        let err = source
            .request_access(&StreamConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    }

    #[tokio::test]
    async fn released_stream_stops_yielding_frames() {
        let source = SyntheticSource::new();
        let mut stream = source
            .request_access(&StreamConstraints {
                width: 8,
                height: 8,
                frame_rate: 10,
            })
            .await
            .unwrap();
        let frame = stream.next_frame().unwrap();
        assert_eq!(frame.data.len(), 8 * 8 * 3);
        stream.release();
        assert!(!stream.is_live());
        assert!(stream.next_frame().is_err());
    }

    #[tokio::test]
    async fn consecutive_frames_differ() {
        let source = SyntheticSource::new();
        let mut stream = source
            .request_access(&StreamConstraints {
                width: 4,
                height: 4,
                frame_rate: 10,
            })
            .await
            .unwrap();
        let a = stream.next_frame().unwrap();
        let b = stream.next_frame().unwrap();
        assert_ne!(a.data, b.data);
    }
}
