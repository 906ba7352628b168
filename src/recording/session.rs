use tokio::time::Instant;

use crate::encoding::types::Artifact;
use crate::error_handling::types::CaptureError;
use crate::media_source::types::StreamParams;
use crate::recording::preview::PreviewRef;
use crate::recording::RecordingState;

/// Observable state of one capture attempt.
///
/// Mutated only by the controller's transition functions; view layers read
/// cloned snapshots. `elapsed_ms` advances only while `Recording`; the
/// artifact is present only in `Ready`.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    pub permission_granted: bool,
    pub state: RecordingState,
    /// Effective parameters of the live stream, when one is held.
    pub stream_params: Option<StreamParams>,
    pub started_at: Option<Instant>,
    pub elapsed_ms: u64,
    pub artifact: Option<Artifact>,
    pub preview: Option<PreviewRef>,
    pub last_error: Option<CaptureError>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            permission_granted: false,
            state: RecordingState::Idle,
            stream_params: None,
            started_at: None,
            elapsed_ms: 0,
            artifact: None,
            preview: None,
            last_error: None,
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
