//! GIF encoder backed by the `gif` crate.
//!
//! Playback timing is the one correctness property that matters here: the
//! produced GIF must play back for as long as the capture ran. GIF frame
//! delays are whole centiseconds, so a constant per-frame delay drifts (15
//! fps would round 66.7 ms down to 60 ms, losing a tenth of the duration).
//! Delays are instead taken as deltas of the rounded cumulative timeline,
//! which keeps the total within 10 ms of `frames / frame_rate` for any
//! frame count.

use gif::{Encoder, Frame, Repeat};
use image::imageops::FilterType;
use image::RgbImage;
use log::debug;

use crate::encoding::encoder_trait::{EncoderSession, FrameEncoder};
use crate::encoding::types::{Artifact, EncoderSettings};
use crate::error_handling::types::CaptureError;
use crate::media_source::types::VideoFrame;

/// Builds [`GifEncoderSession`]s.
pub struct GifFrameEncoder;

impl GifFrameEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GifFrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder for GifFrameEncoder {
    type Session = GifEncoderSession;

    fn begin(&self, settings: EncoderSettings) -> Result<GifEncoderSession, CaptureError> {
        if settings.width < 2 || settings.height < 2 {
            return Err(CaptureError::EncodingFailed(format!(
                "target dimensions {}x{} too small",
                settings.width, settings.height
            )));
        }
        if !(1..=10).contains(&settings.quality) {
            return Err(CaptureError::EncodingFailed(format!(
                "quality {} outside the 1-10 scale",
                settings.quality
            )));
        }
        Ok(GifEncoderSession {
            settings,
            frames: Vec::new(),
        })
    }
}

/// Buffers frames at the target size and quantizes them on `finish`.
pub struct GifEncoderSession {
    settings: EncoderSettings,
    frames: Vec<Vec<u8>>,
}

impl GifEncoderSession {
    /// Rounded cumulative timeline position of frame boundary `index`, in
    /// centiseconds.
    fn timeline_cs(index: usize, frame_rate: u32) -> u64 {
        ((index as f64) * 100.0 / f64::from(frame_rate.max(1))).round() as u64
    }

    /// Quality 1-10 (lower is better) to `gif` quantizer speed 1-30 (lower
    /// is better).
    fn quantizer_speed(&self) -> i32 {
        (i32::from(self.settings.quality) * 3).clamp(1, 30)
    }

    /// Scales a raw frame to the target dimensions when they differ.
    fn scaled_rgb(&self, frame: &VideoFrame) -> Result<Vec<u8>, CaptureError> {
        if frame.width == self.settings.width && frame.height == self.settings.height {
            return Ok(frame.data.clone());
        }
        let img = RgbImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or_else(
            || {
                CaptureError::EncodingFailed(format!(
                    "frame data does not match {}x{}",
                    frame.width, frame.height
                ))
            },
        )?;
        let resized = image::imageops::resize(
            &img,
            self.settings.width,
            self.settings.height,
            FilterType::Triangle,
        );
        Ok(resized.into_raw())
    }

    fn write_gif(&self, frames: &[Vec<u8>]) -> Result<Vec<u8>, CaptureError> {
        let width = self.settings.width as u16;
        let height = self.settings.height as u16;
        let speed = self.quantizer_speed();
        let mut output = Vec::new();
        {
            let mut encoder = Encoder::new(&mut output, width, height, &[])
                .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;
            for (i, rgb) in frames.iter().enumerate() {
                let delay = Self::timeline_cs(i + 1, self.settings.frame_rate)
                    - Self::timeline_cs(i, self.settings.frame_rate);
                let mut frame = Frame::from_rgb_speed(width, height, rgb, speed);
                frame.delay = delay as u16;
                encoder
                    .write_frame(&frame)
                    .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;
            }
        }
        Ok(output)
    }
}

impl EncoderSession for GifEncoderSession {
    fn push_frame(&mut self, frame: &VideoFrame) -> Result<(), CaptureError> {
        let rgb = self.scaled_rgb(frame)?;
        self.frames.push(rgb);
        Ok(())
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn preview_gif(&self) -> Result<Vec<u8>, CaptureError> {
        let first = self.frames.first().ok_or_else(|| {
            CaptureError::EncodingFailed("no frames buffered for preview".into())
        })?;
        self.write_gif(std::slice::from_ref(first))
    }

    fn finish(self) -> Result<Artifact, CaptureError> {
        if self.frames.is_empty() {
            return Err(CaptureError::EncodingFailed("no frames captured".into()));
        }
        debug!(
            "encoding {} frames at {}x{}@{} q{}",
            self.frames.len(),
            self.settings.width,
            self.settings.height,
            self.settings.frame_rate,
            self.settings.quality
        );
        let bytes = self.write_gif(&self.frames)?;
        Ok(Artifact::gif(bytes))
    }

    fn abort(self) {
        debug!("encoder session aborted, {} frames discarded", self.frames.len());
    }
}
