//! Frame source handle and public API.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::sensor::SensorResponse;
use super::slot::FrameSlot;
use super::source_loop::{run_source_loop, LoopParams, SourceCommand, SourceKind};
use super::types::{CameraError, TexMatrix};
use crate::viewport::Orientation;

/// Settings for a frame source.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Sensor width in pixels (before orientation correction)
    pub width: u32,
    /// Sensor height in pixels (before orientation correction)
    pub height: u32,
    /// Frames published per second
    pub fps: u32,
    /// Sensor mounting orientation
    pub orientation: Orientation,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            orientation: Orientation::Deg90,
        }
    }
}

/// Frame source handle.
///
/// Runs a background thread that publishes frames into a shared
/// [`FrameSlot`]. Frames are scaled by the shared [`SensorResponse`] so the
/// exposure controls are visible without real hardware.
pub struct FrameSource {
    kind: SourceKind,
    slot: Arc<FrameSlot>,
    response: Arc<SensorResponse>,
    thread: Option<JoinHandle<()>>,
    command_tx: Option<Sender<SourceCommand>>,
    stop_signal: Arc<AtomicBool>,
    settings: SourceSettings,
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FrameSource {
    /// Source producing the animated synthetic pattern at the settings' size.
    pub fn synthetic(settings: SourceSettings) -> Result<Self, CameraError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(CameraError::InvalidSize {
                width: settings.width,
                height: settings.height,
            });
        }
        Ok(Self::with_kind(SourceKind::Synthetic, settings))
    }

    /// Source that publishes the image at `path` repeatedly.
    ///
    /// The settings' size is replaced by the image's own size.
    pub fn still(path: &Path, mut settings: SourceSettings) -> Result<Self, CameraError> {
        let image = image::open(path)?.to_rgb8();
        if image.width() == 0 || image.height() == 0 {
            return Err(CameraError::InvalidSize {
                width: image.width(),
                height: image.height(),
            });
        }
        settings.width = image.width();
        settings.height = image.height();
        log::info!(
            "Using still image {} ({}x{}) as frame source",
            path.display(),
            settings.width,
            settings.height
        );
        Ok(Self::with_kind(SourceKind::Still(Arc::new(image)), settings))
    }

    fn with_kind(kind: SourceKind, settings: SourceSettings) -> Self {
        Self {
            kind,
            slot: Arc::new(FrameSlot::new()),
            response: Arc::new(SensorResponse::new()),
            thread: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
        }
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// Slot the renderer polls for new frames.
    pub fn slot(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.slot)
    }

    /// Response factor driven by the exposure controls.
    pub fn response(&self) -> Arc<SensorResponse> {
        Arc::clone(&self.response)
    }

    /// Start publishing frames in a background thread.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If the source is already running
    /// * `CameraError::SpawnFailed` - If the thread could not be created
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        let params = LoopParams {
            kind: self.kind.clone(),
            width: self.settings.width,
            height: self.settings.height,
            fps: self.settings.fps,
            transform: TexMatrix::for_orientation(self.settings.orientation),
        };
        let slot = Arc::clone(&self.slot);
        let response = Arc::clone(&self.response);
        let stop = Arc::clone(&self.stop_signal);

        let handle = std::thread::Builder::new()
            .name("frame-source".to_string())
            .spawn(move || run_source_loop(params, slot, response, stop, rx))?;
        self.thread = Some(handle);
        Ok(())
    }

    /// Stop the source thread and wait for it to finish.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);

        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(SourceCommand::Stop);
        }

        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_synthetic_rejects_empty_size() {
        let settings = SourceSettings {
            width: 0,
            ..SourceSettings::default()
        };
        match FrameSource::synthetic(settings) {
            Err(CameraError::InvalidSize { width, height }) => {
                assert_eq!(width, 0);
                assert_eq!(height, 480);
            }
            other => panic!("Expected InvalidSize, got {:?}", other),
        }
    }

    #[test]
    fn test_still_missing_file() {
        let result = FrameSource::still(
            Path::new("/nonexistent/still.png"),
            SourceSettings::default(),
        );
        assert!(matches!(result, Err(CameraError::StillLoad(_))));
    }

    #[test]
    fn test_synthetic_publishes_frames() {
        let settings = SourceSettings {
            width: 16,
            height: 8,
            fps: 200,
            orientation: Orientation::Deg90,
        };
        let mut source = FrameSource::synthetic(settings).unwrap();
        let slot = source.slot();
        source.start().unwrap();
        assert!(matches!(source.start(), Err(CameraError::AlreadyRunning)));

        let deadline = Instant::now() + Duration::from_secs(5);
        while slot.sequence() == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        source.stop();
        assert!(!source.is_running());

        let frame = slot.latest().expect("at least one frame");
        assert_eq!((frame.width, frame.height), (16, 8));
        assert_eq!(frame.transform, TexMatrix::for_orientation(Orientation::Deg90));
    }
}
