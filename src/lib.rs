//! gifbooth — capture short webcam clips and turn them into shareable GIFs.
//!
//! The crate is split into the capture pipeline (media source, frame encoder,
//! recording controller) and the asset lifecycle (upload gateway, asset store,
//! web interface). Presentation layers consume [`recording`] snapshots and the
//! HTTP API; everything device- or provider-specific sits behind a trait.

pub mod configuration;
pub mod encoding;
pub mod error_handling;
pub mod media_source;
pub mod recording;
pub mod storage;
pub mod upload;
pub mod web_interface;
