//! Runtime configuration parsed from the command line and environment.

pub mod config;
pub mod types;

pub use config::Config;
pub use types::CaptureSettings;
