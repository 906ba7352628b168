use crate::recording::controller::RecordingOptions;

/// Capture parameters shared by the `serve` defaults and the `record`
/// subcommand. All of them are *ideal* hints; the camera may negotiate
/// them down.
#[derive(clap::Args, Debug, Clone)]
pub struct CaptureSettings {
    /// Desired capture width in pixels
    #[arg(long, default_value_t = 1280, env = "GIFBOOTH_WIDTH")]
    pub width: u32,

    /// Desired capture height in pixels
    #[arg(long, default_value_t = 720, env = "GIFBOOTH_HEIGHT")]
    pub height: u32,

    /// Desired capture frame rate
    #[arg(long, default_value_t = 15, env = "GIFBOOTH_FRAME_RATE")]
    pub frame_rate: u32,

    /// GIF quality on the converter's 1-10 scale, lower is better
    #[arg(long, default_value_t = 3, env = "GIFBOOTH_QUALITY")]
    pub quality: u8,
}

impl CaptureSettings {
    pub fn recording_options(&self) -> RecordingOptions {
        RecordingOptions {
            width: self.width,
            height: self.height,
            frame_rate: self.frame_rate,
            quality: self.quality,
        }
    }
}
