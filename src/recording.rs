//! Recording lifecycle: the capture state machine and its session data.
//!
//! This module provides the core types and submodules for driving one
//! capture attempt from camera acquisition through encoding to the final
//! artifact.

use serde::{Deserialize, Serialize};

/// Submodule for the capture state machine.
pub mod controller;
/// Submodule for revocable preview handles.
pub mod preview;
/// Submodule for session data structures.
pub mod session;

pub use controller::{RecordingController, RecordingOptions};
pub use preview::{PreviewRef, PreviewRegistry};
pub use session::RecordingSession;

/// Current state of a recording session.
///
/// Variants:
/// - `Idle`: nothing acquired or a finished session was reset.
/// - `PermissionRequested`: waiting on the camera permission prompt.
/// - `Live`: camera acquired, not yet recording.
/// - `Recording`: frames are being captured and encoded.
/// - `Ready`: the encoded artifact is available.
/// - `Error`: a capture failure occurred; see `last_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingState {
    Idle,
    PermissionRequested,
    Live,
    Recording,
    Ready,
    Error,
}
