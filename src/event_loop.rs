//! Async event loop for the live preview.
//!
//! Three concurrent concerns share one `tokio::select!`:
//! 1. Terminal events (keys, resize) via the crossterm `EventStream`
//! 2. The render tick at the preview frame rate
//! 3. Finished snapshot captures coming back from background tasks

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::camera::FrameSlot;
use crate::exposure::ExposureCoordinator;
use crate::input::{handle_key_event, KeyAction};
use crate::live::{FrameOutcome, LiveRenderer};
use crate::snapshot::{annotate_async, snapshot_path, Annotator, SnapshotError};
use crate::terminal::{surface_size, CellFrame, StatusBar};

/// Outcome of one capture: the written file or why it failed.
pub type CaptureResult = Result<PathBuf, SnapshotError>;

/// Preview settings that do not live in the renderer or the coordinator.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub annotator: Annotator,
    pub output_dir: PathBuf,
    /// Control positions moved per key press
    pub step: u32,
    pub fps: u32,
}

/// State driven by the event loop.
pub struct Preview {
    renderer: LiveRenderer,
    slot: Arc<FrameSlot>,
    exposure: ExposureCoordinator,
    status_bar: StatusBar,
    options: PreviewOptions,
    capture_tx: mpsc::UnboundedSender<CaptureResult>,
    capture_rx: mpsc::UnboundedReceiver<CaptureResult>,
    pending_captures: usize,
    term_size: (u16, u16),
}

impl Preview {
    pub fn new(
        renderer: LiveRenderer,
        slot: Arc<FrameSlot>,
        exposure: ExposureCoordinator,
        options: PreviewOptions,
    ) -> Self {
        let (capture_tx, capture_rx) = mpsc::unbounded_channel();
        Self {
            renderer,
            slot,
            exposure,
            status_bar: StatusBar::new(),
            options,
            capture_tx,
            capture_rx,
            pending_captures: 0,
            term_size: (0, 0),
        }
    }

    pub fn exposure(&self) -> &ExposureCoordinator {
        &self.exposure
    }

    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    pub fn status_bar_mut(&mut self) -> &mut StatusBar {
        &mut self.status_bar
    }

    pub fn renderer(&self) -> &LiveRenderer {
        &self.renderer
    }

    pub fn pending_captures(&self) -> usize {
        self.pending_captures
    }

    /// Fit the surface to a terminal of `cols` × `rows` cells, keeping the
    /// last row for the status line.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.term_size = (cols, rows);
        let (width, height) = surface_size(cols, rows.saturating_sub(1));
        self.renderer.resize(width, height);
    }

    /// Apply a key action. Returns `false` when the preview should quit.
    pub fn handle_action(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::Adjust { kind, delta } => {
                self.exposure.step(kind, delta);
            }
            KeyAction::Capture => self.capture(),
            KeyAction::ToggleStatus => self.status_bar.toggle(),
            KeyAction::Quit => return false,
            KeyAction::None => {}
        }
        true
    }

    /// Start a snapshot of the latest frame off the render path.
    ///
    /// One capture runs at a time; the counter only moves once the file is
    /// written. Must be called from within a tokio runtime.
    pub fn capture(&mut self) {
        if self.pending_captures > 0 {
            self.status_bar.set_message("capture in progress");
            return;
        }
        let Some(frame) = self.slot.latest() else {
            self.status_bar.set_message("no frame to capture");
            return;
        };
        let Some(image) = frame.to_rgb_image() else {
            self.status_bar.set_message("capture failed: malformed frame");
            return;
        };

        let index = self.exposure.next_capture_index();
        let path = snapshot_path(&self.options.output_dir, index);
        let annotator = self.options.annotator;
        let tx = self.capture_tx.clone();
        self.pending_captures += 1;
        log::info!("Capturing snapshot {} to {}", index, path.display());

        tokio::spawn(async move {
            let result = capture_to(annotator, image, path).await;
            let _ = tx.send(result);
        });
    }

    /// Report a finished capture on the status line.
    pub fn finish_capture(&mut self, result: CaptureResult) {
        self.pending_captures = self.pending_captures.saturating_sub(1);
        match result {
            Ok(path) => {
                self.exposure.record_capture();
                log::info!("Saved snapshot {}", path.display());
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.status_bar.set_message(format!("saved {}", name));
            }
            Err(e) => {
                log::warn!("Snapshot failed: {}", e);
                self.status_bar.set_message(format!("capture failed: {}", e));
            }
        }
    }

    /// Wait for the next finished capture.
    pub async fn next_capture(&mut self) -> Option<CaptureResult> {
        self.capture_rx.recv().await
    }

    /// Render the latest frame and return the terminal output, or `None` if
    /// nothing should be presented this tick.
    pub fn render_tick(&mut self) -> Option<String> {
        match self.renderer.draw_frame(&self.slot) {
            FrameOutcome::Rendered { .. } | FrameOutcome::Reused => {}
            FrameOutcome::Waiting | FrameOutcome::Dropped(_) => return None,
        }
        let mut out = CellFrame::from_surface(self.renderer.surface()).to_ansi();
        let (cols, rows) = self.term_size;
        if rows > 0 {
            out.push_str(&self.status_bar.to_ansi(&self.exposure, rows - 1, cols));
        }
        Some(out)
    }
}

/// Annotate `image` and write it to `path`, both on the blocking pool.
pub async fn capture_to(annotator: Annotator, image: image::RgbImage, path: PathBuf) -> CaptureResult {
    let annotated = annotate_async(annotator, image, None).await?;
    tokio::task::spawn_blocking(move || -> CaptureResult {
        annotated.save(&path)?;
        Ok(path)
    })
    .await?
}

/// Run the preview until the user quits or the event stream ends.
pub async fn run(preview: &mut Preview) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut stdout = std::io::stdout();
    let mut event_stream = EventStream::new();

    let fps = preview.options.fps.max(1);
    let mut render_interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));
    render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    preview.resize(cols, rows);

    loop {
        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        let action = handle_key_event(key_event, preview.options.step);
                        if !preview.handle_action(action) {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(cols, rows))) => {
                        // Clear leftovers from the old size
                        write!(stdout, "\x1b[0m\x1b[2J")?;
                        preview.resize(cols, rows);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(Box::new(e)),
                    None => break,
                }
            }

            _ = render_interval.tick() => {
                if let Some(output) = preview.render_tick() {
                    stdout.write_all(output.as_bytes())?;
                    stdout.flush()?;
                }
            }

            Some(result) = preview.capture_rx.recv() => {
                preview.finish_capture(result);
            }
        }
    }

    if preview.pending_captures > 0 {
        log::info!(
            "Waiting for {} snapshot(s) to finish",
            preview.pending_captures
        );
        while preview.pending_captures > 0 {
            match preview.capture_rx.recv().await {
                Some(result) => preview.finish_capture(result),
                None => break,
            }
        }
    }

    Ok(())
}
