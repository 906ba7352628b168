//! Traits implemented by camera backends.
//!
//! Implementors of [`MediaSource`] are responsible for:
//! - Negotiating the requested constraints against device capabilities
//! - Reporting the effective parameters through [`VideoStream::params`]
//! - Stopping all underlying tracks when the stream is released
//!
//! All methods return a `Result` so acquisition failures can be surfaced as
//! session errors instead of panics.

use async_trait::async_trait;

use crate::error_handling::types::CaptureError;
use crate::media_source::types::{StreamConstraints, StreamParams, VideoFrame};

/// A camera (or camera-like) device that can open live video streams.
#[async_trait]
pub trait MediaSource: Send + Sync {
    type Stream: VideoStream;

    /// Requests access to the device and opens a live stream.
    ///
    /// Fails with [`CaptureError::PermissionDenied`] when the user or OS
    /// denies access, [`CaptureError::DeviceUnavailable`] when no matching
    /// device exists.
    async fn request_access(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Self::Stream, CaptureError>;
}

/// A live video stream handle.
///
/// Releasing stops all underlying tracks. Implementations must also release
/// on `Drop` so every exit path (manual reset, teardown, error) tears the
/// device down.
pub trait VideoStream: Send + 'static {
    /// Effective negotiated parameters. May differ from the requested hints.
    fn params(&self) -> StreamParams;

    /// Pulls the next frame from the device.
    fn next_frame(&mut self) -> Result<VideoFrame, CaptureError>;

    /// Stops all underlying tracks. Idempotent.
    fn release(&mut self);

    fn is_live(&self) -> bool;
}
