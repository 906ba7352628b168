//! The capture state machine.
//!
//! `RecordingController` drives one session from camera acquisition through
//! live capture to the encoded artifact:
//!
//! ```text
//! Idle -> PermissionRequested -> Live -> Recording -> Ready -> (reset) Idle
//! ```
//!
//! `Error` is reachable from every state and `reset` returns to `Idle` from
//! anywhere, including mid-recording. Re-entrant transitions (double-start,
//! double-stop) are guarded no-ops.
//!
//! Behavior
//! - The frame pump ticks at the *negotiated* stream rate, so the encoder's
//!   capture cadence and the per-frame delays agree and GIF playback time
//!   tracks wall-clock capture time.
//! - A second 100 ms ticker updates `elapsed_ms` for display only; it plays
//!   no part in encoding timing.
//! - `stop` resolves `Ready` only after the encoder finalize completes; the
//!   finalize result is the single source of truth for the artifact.
//! - Resetting keeps the camera stream, so the next recording starts without
//!   re-acquisition. `release_camera` is the explicit teardown path and is
//!   also run on drop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::encoding::encoder_trait::{EncoderSession, FrameEncoder};
use crate::encoding::types::EncoderSettings;
use crate::error_handling::types::CaptureError;
use crate::media_source::source_trait::{MediaSource, VideoStream};
use crate::media_source::types::{StreamConstraints, StreamParams};
use crate::recording::preview::PreviewRegistry;
use crate::recording::session::RecordingSession;
use crate::recording::RecordingState;

/// Capture parameters for new recordings.
#[derive(Debug, Clone, Copy)]
pub struct RecordingOptions {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    /// Converter scale 1-10, lower is better.
    pub quality: u8,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frame_rate: 15,
            quality: 3,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Pump<Sess> {
    cancel: watch::Sender<bool>,
    frames: JoinHandle<Result<Sess, CaptureError>>,
    ticker: JoinHandle<()>,
}

/// Orchestrates a media source and a frame encoder for one session.
pub struct RecordingController<S: MediaSource, E: FrameEncoder> {
    source: S,
    encoder: E,
    options: RecordingOptions,
    session_id: Uuid,
    session: Arc<Mutex<RecordingSession>>,
    previews: Arc<PreviewRegistry>,
    stream: Arc<Mutex<Option<S::Stream>>>,
    pump: Option<Pump<E::Session>>,
}

impl<S: MediaSource, E: FrameEncoder> RecordingController<S, E> {
    pub fn new(source: S, encoder: E, options: RecordingOptions) -> Self {
        Self {
            source,
            encoder,
            options,
            session_id: Uuid::new_v4(),
            session: Arc::new(Mutex::new(RecordingSession::new())),
            previews: Arc::new(PreviewRegistry::new()),
            stream: Arc::new(Mutex::new(None)),
            pump: None,
        }
    }

    /// Cloned view of the session for presentation layers.
    pub fn snapshot(&self) -> RecordingSession {
        lock(&self.session).clone()
    }

    pub fn state(&self) -> RecordingState {
        lock(&self.session).state
    }

    /// Registry resolving the session's preview handle.
    pub fn previews(&self) -> Arc<PreviewRegistry> {
        Arc::clone(&self.previews)
    }

    /// Acquires the camera, transitioning `Idle -> PermissionRequested ->
    /// Live`. Returns the *effective* negotiated parameters, which may be
    /// degraded from the requested hints. A no-op returning the current
    /// parameters when a stream is already held.
    pub async fn request_access(&mut self) -> Result<StreamParams, CaptureError> {
        if let Some(stream) = lock(&self.stream).as_ref() {
            let params = stream.params();
            let mut s = lock(&self.session);
            s.permission_granted = true;
            s.stream_params = Some(params);
            if s.state == RecordingState::Idle {
                s.state = RecordingState::Live;
            }
            return Ok(params);
        }

        {
            let mut s = lock(&self.session);
            s.state = RecordingState::PermissionRequested;
            s.last_error = None;
        }
        let constraints = StreamConstraints {
            width: self.options.width,
            height: self.options.height,
            frame_rate: self.options.frame_rate,
        };
        match self.source.request_access(&constraints).await {
            Ok(stream) => {
                let params = stream.params();
                if (params.width, params.height, params.frame_rate)
                    != (constraints.width, constraints.height, constraints.frame_rate)
                {
                    info!(
                        "[{}] camera degraded constraints to {}x{}@{}",
                        self.session_id, params.width, params.height, params.frame_rate
                    );
                }
                *lock(&self.stream) = Some(stream);
                let mut s = lock(&self.session);
                s.permission_granted = true;
                s.stream_params = Some(params);
                s.state = RecordingState::Live;
                Ok(params)
            }
            Err(e) => {
                let mut s = lock(&self.session);
                s.permission_granted = false;
                s.state = RecordingState::Error;
                s.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Begins capturing. Acquires the camera first if needed; a guarded
    /// no-op while already `Recording`.
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if self.state() == RecordingState::Recording {
            debug!("[{}] start ignored, already recording", self.session_id);
            return Ok(());
        }
        if lock(&self.stream).is_none() {
            self.request_access().await?;
        }
        let params = match lock(&self.stream).as_ref() {
            Some(stream) => stream.params(),
            None => {
                let err = CaptureError::DeviceUnavailable("no live camera stream".into());
                self.fail(err.clone());
                return Err(err);
            }
        };

        // The encoder cadence follows the negotiated rate, not the hint.
        let settings = EncoderSettings {
            width: self.options.width,
            height: self.options.height,
            frame_rate: params.frame_rate,
            quality: self.options.quality,
        };
        let enc = match self.encoder.begin(settings) {
            Ok(enc) => enc,
            Err(e) => {
                self.fail(e.clone());
                return Err(e);
            }
        };

        {
            let mut s = lock(&self.session);
            if let Some(old) = s.preview.take() {
                self.previews.revoke(old);
            }
            s.artifact = None;
            s.elapsed_ms = 0;
            s.started_at = Some(Instant::now());
            s.last_error = None;
            s.state = RecordingState::Recording;
        }
        self.pump = Some(self.spawn_pump(enc, settings));
        info!(
            "[{}] recording started, {}x{} at {} fps",
            self.session_id, settings.width, settings.height, settings.frame_rate
        );
        Ok(())
    }

    /// Stops capturing and finalizes the encoder, transitioning to `Ready`.
    /// A guarded no-op unless currently `Recording`.
    pub async fn stop(&mut self) -> Result<(), CaptureError> {
        if self.state() != RecordingState::Recording {
            debug!("[{}] stop ignored, not recording", self.session_id);
            return Ok(());
        }
        let Some(pump) = self.pump.take() else {
            return Ok(());
        };
        let _ = pump.cancel.send(true);
        let joined = pump.frames.await;
        pump.ticker.abort();

        // Capture ends here; finalize time must not count as recording time.
        let final_elapsed = {
            let s = lock(&self.session);
            s.started_at.map(|t| t.elapsed().as_millis() as u64)
        };

        let enc = match joined {
            Ok(Ok(enc)) => enc,
            // The pump already recorded the capture failure on the session.
            Ok(Err(e)) => return Err(e),
            Err(e) => {
                let err = CaptureError::EncodingFailed(format!("capture task failed: {}", e));
                self.fail(err.clone());
                return Err(err);
            }
        };

        let frames = enc.frame_count();
        let finalized = tokio::task::spawn_blocking(move || enc.finish()).await;
        let artifact = match finalized {
            Ok(Ok(artifact)) => artifact,
            Ok(Err(e)) => {
                self.fail(e.clone());
                return Err(e);
            }
            Err(e) => {
                let err = CaptureError::EncodingFailed(format!("finalize task failed: {}", e));
                self.fail(err.clone());
                return Err(err);
            }
        };

        let mut s = lock(&self.session);
        if let Some(old) = s.preview.take() {
            self.previews.revoke(old);
        }
        s.preview = Some(self.previews.create(artifact.bytes.clone()));
        if let Some(elapsed) = final_elapsed {
            s.elapsed_ms = elapsed;
        }
        info!(
            "[{}] recording stopped after {} ms, {} frames, artifact {} bytes",
            self.session_id,
            s.elapsed_ms,
            frames,
            artifact.bytes.len()
        );
        s.artifact = Some(artifact);
        s.state = RecordingState::Ready;
        Ok(())
    }

    /// Returns to `Idle` from any state. Revokes the preview, clears the
    /// artifact and error, and discards any in-flight encode. The camera
    /// stream is kept so a new recording can start without re-requesting
    /// permission.
    pub async fn reset(&mut self) {
        if let Some(pump) = self.pump.take() {
            let _ = pump.cancel.send(true);
            pump.ticker.abort();
            match pump.frames.await {
                Ok(Ok(enc)) => enc.abort(),
                Ok(Err(_)) | Err(_) => {}
            }
        }
        let mut s = lock(&self.session);
        if let Some(old) = s.preview.take() {
            self.previews.revoke(old);
        }
        s.artifact = None;
        s.elapsed_ms = 0;
        s.started_at = None;
        s.last_error = None;
        s.state = RecordingState::Idle;
        debug!("[{}] session reset", self.session_id);
    }

    /// Stops all camera tracks and forgets the stream. Takes priority over
    /// anything else holding the stream: a pump still running will surface
    /// `DeviceUnavailable` on its next tick.
    pub fn release_camera(&mut self) {
        if let Some(mut stream) = lock(&self.stream).take() {
            stream.release();
            debug!("[{}] camera released", self.session_id);
        }
        let mut s = lock(&self.session);
        s.stream_params = None;
        s.permission_granted = false;
        if s.state == RecordingState::Live {
            s.state = RecordingState::Idle;
        }
    }

    fn fail(&self, err: CaptureError) {
        let mut s = lock(&self.session);
        if let Some(old) = s.preview.take() {
            self.previews.revoke(old);
        }
        s.artifact = None;
        s.state = RecordingState::Error;
        s.last_error = Some(err);
    }

    fn spawn_pump(&self, enc: E::Session, settings: EncoderSettings) -> Pump<E::Session> {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let period = settings.frame_interval();
        let preview_after = settings.frame_rate.max(1) as usize;
        let stream = Arc::clone(&self.stream);
        let session = Arc::clone(&self.session);
        let previews = Arc::clone(&self.previews);
        let session_id = self.session_id;

        let frames = tokio::spawn(async move {
            let mut enc = enc;
            // First frame lands one period in, so k frames represent k
            // elapsed intervals and playback time matches capture time.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = cancel_rx.changed() => break,
                    _ = interval.tick() => {
                        let frame = {
                            let mut slot = lock(&stream);
                            match slot.as_mut() {
                                Some(s) => s.next_frame(),
                                None => Err(CaptureError::DeviceUnavailable(
                                    "camera stream released mid-recording".into(),
                                )),
                            }
                        };
                        match frame.and_then(|f| enc.push_frame(&f)) {
                            Ok(()) => {
                                if enc.frame_count() == preview_after {
                                    match enc.preview_gif() {
                                        Ok(bytes) => {
                                            let mut s = lock(&session);
                                            if let Some(old) = s.preview.take() {
                                                previews.revoke(old);
                                            }
                                            s.preview = Some(previews.create(bytes));
                                            debug!(
                                                "[{}] preview available after {} frames",
                                                session_id, preview_after
                                            );
                                        }
                                        Err(e) => {
                                            warn!("[{}] preview render failed: {}", session_id, e);
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                let mut s = lock(&session);
                                s.state = RecordingState::Error;
                                s.last_error = Some(e.clone());
                                return Err(e);
                            }
                        }
                    }
                }
            }
            Ok(enc)
        });

        let ticker_session = Arc::clone(&self.session);
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(100));
            loop {
                interval.tick().await;
                let mut s = lock(&ticker_session);
                if s.state != RecordingState::Recording {
                    break;
                }
                if let Some(started) = s.started_at {
                    s.elapsed_ms = started.elapsed().as_millis() as u64;
                }
            }
        });

        Pump {
            cancel: cancel_tx,
            frames,
            ticker,
        }
    }
}

impl<S: MediaSource, E: FrameEncoder> Drop for RecordingController<S, E> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            let _ = pump.cancel.send(true);
            pump.frames.abort();
            pump.ticker.abort();
        }
        if let Some(mut stream) = lock(&self.stream).take() {
            stream.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::encoding::gif_encoder::GifFrameEncoder;
    use crate::media_source::synthetic::SyntheticSource;

    const FPS: u32 = 15;
    const FRAME_MS: u64 = 1000 / FPS as u64 + 1;

    fn controller(source: SyntheticSource) -> RecordingController<SyntheticSource, GifFrameEncoder> {
        RecordingController::new(
            source,
            GifFrameEncoder::new(),
            RecordingOptions {
                width: 16,
                height: 12,
                frame_rate: FPS,
                quality: 3,
            },
        )
    }

    /// Advances the paused clock in small steps, yielding so the pump and
    /// ticker tasks keep up with their backlogs.
    async fn run_for(ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(50);
            tokio::time::advance(Duration::from_millis(step)).await;
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            remaining -= step;
        }
    }

    fn playback_ms(bytes: &[u8]) -> u64 {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(Cursor::new(bytes)).unwrap();
        let mut total_cs = 0u64;
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            total_cs += u64::from(frame.delay);
        }
        total_cs * 10
    }

    #[tokio::test(start_paused = true)]
    async fn full_capture_scenario_keeps_real_time_playback() {
        let mut c = controller(SyntheticSource::new());
        assert_eq!(c.state(), RecordingState::Idle);

        let params = c.request_access().await.unwrap();
        let snap = c.snapshot();
        assert_eq!(snap.state, RecordingState::Live);
        assert!(snap.permission_granted);
        assert_eq!(snap.stream_params, Some(params));

        c.start().await.unwrap();
        assert_eq!(c.state(), RecordingState::Recording);

        run_for(1500).await;
        let mid = c.snapshot();
        assert!(
            (1300..=1600).contains(&mid.elapsed_ms),
            "elapsed_ms was {}",
            mid.elapsed_ms
        );
        // One second in, the preview notification has fired.
        assert!(mid.preview.is_some());
        assert!(mid.artifact.is_none());

        run_for(1500).await;
        c.stop().await.unwrap();

        let done = c.snapshot();
        assert_eq!(done.state, RecordingState::Ready);
        assert!((2900..=3100).contains(&done.elapsed_ms));
        let artifact = done.artifact.expect("artifact must exist in Ready");
        assert_eq!(artifact.mime_type, "image/gif");
        assert_eq!(&artifact.bytes[0..6], b"GIF89a");

        // 1:1 timing: playback within one frame interval of wall clock.
        let playback = playback_ms(&artifact.bytes);
        assert!(
            playback.abs_diff(3000) <= FRAME_MS,
            "playback {}ms vs capture 3000ms",
            playback
        );

        // The preview now resolves to the artifact bytes.
        let preview = done.preview.expect("preview must exist in Ready");
        assert_eq!(c.previews().resolve(preview), Some(artifact.bytes));
    }

    #[tokio::test(start_paused = true)]
    async fn denied_permission_lands_in_error() {
        let mut c = controller(SyntheticSource::denying());
        let err = c.request_access().await.unwrap_err();
        assert!(matches!(err, CaptureError::PermissionDenied(_)));

        let snap = c.snapshot();
        assert_eq!(snap.state, RecordingState::Error);
        assert!(!snap.permission_granted);
        assert!(matches!(
            snap.last_error,
            Some(CaptureError::PermissionDenied(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_device_lands_in_error() {
        let mut c = controller(SyntheticSource::unavailable());
        let err = c.start().await.unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
        assert_eq!(c.state(), RecordingState::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_is_a_noop() {
        let mut c = controller(SyntheticSource::new());
        c.start().await.unwrap();
        run_for(500).await;
        // Second start must not restart the pump or clear captured frames.
        c.start().await.unwrap();
        assert_eq!(c.state(), RecordingState::Recording);
        run_for(500).await;
        c.stop().await.unwrap();

        let artifact = c.snapshot().artifact.unwrap();
        let playback = playback_ms(&artifact.bytes);
        assert!(
            playback.abs_diff(1000) <= FRAME_MS,
            "playback {}ms suggests the first start was not preserved",
            playback
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_outside_recording_is_a_noop() {
        let mut c = controller(SyntheticSource::new());
        c.request_access().await.unwrap();
        c.stop().await.unwrap();
        assert_eq!(c.state(), RecordingState::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_from_ready_keeps_the_camera() {
        let mut c = controller(SyntheticSource::new());
        c.start().await.unwrap();
        run_for(1000).await;
        c.stop().await.unwrap();
        assert_eq!(c.previews().len(), 1);

        c.reset().await;
        let snap = c.snapshot();
        assert_eq!(snap.state, RecordingState::Idle);
        assert!(snap.artifact.is_none());
        assert!(snap.preview.is_none());
        assert_eq!(snap.elapsed_ms, 0);
        assert!(c.previews().is_empty());
        // Stream retained: permission survives and the next start is direct.
        assert!(snap.permission_granted);
        assert!(snap.stream_params.is_some());
        c.start().await.unwrap();
        assert_eq!(c.state(), RecordingState::Recording);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_mid_recording_discards_the_encode() {
        let mut c = controller(SyntheticSource::new());
        c.start().await.unwrap();
        run_for(1200).await;
        assert!(c.snapshot().preview.is_some());

        c.reset().await;
        let snap = c.snapshot();
        assert_eq!(snap.state, RecordingState::Idle);
        assert!(snap.artifact.is_none());
        assert!(snap.preview.is_none());
        assert!(c.previews().is_empty());

        // The session remains usable.
        c.start().await.unwrap();
        run_for(1000).await;
        c.stop().await.unwrap();
        assert_eq!(c.state(), RecordingState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_from_error_returns_to_idle() {
        let mut c = controller(SyntheticSource::denying());
        let _ = c.request_access().await;
        assert_eq!(c.state(), RecordingState::Error);

        c.reset().await;
        let snap = c.snapshot();
        assert_eq!(snap.state, RecordingState::Idle);
        assert!(snap.last_error.is_none());
        assert!(!snap.permission_granted);
    }

    #[tokio::test(start_paused = true)]
    async fn release_camera_clears_permission() {
        let mut c = controller(SyntheticSource::new());
        c.request_access().await.unwrap();
        c.release_camera();
        let snap = c.snapshot();
        assert_eq!(snap.state, RecordingState::Idle);
        assert!(!snap.permission_granted);
        assert!(snap.stream_params.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_stops_advancing_after_stop() {
        let mut c = controller(SyntheticSource::new());
        c.start().await.unwrap();
        run_for(1000).await;
        c.stop().await.unwrap();
        let elapsed = c.snapshot().elapsed_ms;
        run_for(1000).await;
        assert_eq!(c.snapshot().elapsed_ms, elapsed);
    }
}
