//! Camera acquisition and live video streams.
//!
//! A [`MediaSource`](source_trait::MediaSource) hands out at most one live
//! [`VideoStream`](source_trait::VideoStream) at a time. Constraints are
//! *ideal* hints: the device may silently degrade, so callers must read the
//! effective parameters back from the stream instead of assuming the hints
//! were honored.

pub mod source_trait;
pub mod synthetic;
pub mod types;

pub use source_trait::{MediaSource, VideoStream};
pub use synthetic::{SyntheticSource, SyntheticStream};
pub use types::{StreamConstraints, StreamParams, VideoFrame};
