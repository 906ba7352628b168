//! The encoder contract consumed by the recording controller.

use crate::encoding::types::{Artifact, EncoderSettings};
use crate::error_handling::types::CaptureError;
use crate::media_source::types::VideoFrame;

/// Factory for encoding sessions.
pub trait FrameEncoder: Send + Sync {
    type Session: EncoderSession;

    fn begin(&self, settings: EncoderSettings) -> Result<Self::Session, CaptureError>;
}

/// One in-progress encode.
///
/// `finish` consumes the session and is the only way to obtain the artifact.
/// Any failure is terminal for the session; callers must discard it and
/// release their own partial resources.
pub trait EncoderSession: Send + 'static {
    /// Buffers one captured frame.
    fn push_frame(&mut self, frame: &VideoFrame) -> Result<(), CaptureError>;

    fn frame_count(&self) -> usize;

    /// A cheap single-frame GIF of the earliest buffered frame, used as the
    /// "preview available" notification once enough frames are in.
    fn preview_gif(&self) -> Result<Vec<u8>, CaptureError>;

    /// Encodes all buffered frames into the final artifact.
    fn finish(self) -> Result<Artifact, CaptureError>;

    /// Drops all buffered state without producing anything.
    fn abort(self);
}
