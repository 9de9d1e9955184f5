//! Background frame production loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbImage;

use super::frame_utils::{still_to_frame, synthetic_pattern};
use super::sensor::SensorResponse;
use super::slot::FrameSlot;
use super::types::{Frame, TexMatrix};

/// Commands sent to the source thread.
pub enum SourceCommand {
    Stop,
}

/// What a source thread produces.
#[derive(Debug, Clone)]
pub enum SourceKind {
    /// Animated gray test pattern of the configured size
    Synthetic,
    /// A still image published over and over
    Still(Arc<RgbImage>),
}

/// Parameters passed to the source thread.
#[derive(Debug, Clone)]
pub struct LoopParams {
    pub kind: SourceKind,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub transform: TexMatrix,
}

/// Run the source loop until stopped.
pub fn run_source_loop(
    params: LoopParams,
    slot: Arc<FrameSlot>,
    response: Arc<SensorResponse>,
    stop: Arc<AtomicBool>,
    rx: Receiver<SourceCommand>,
) {
    let interval = Duration::from_secs_f64(1.0 / params.fps.max(1) as f64);
    let started = Instant::now();
    let mut produced: u64 = 0;

    while !stop.load(Ordering::Relaxed) {
        if let Ok(SourceCommand::Stop) = rx.try_recv() {
            break;
        }

        let tick = Instant::now();
        let mut frame = match &params.kind {
            SourceKind::Synthetic => {
                // One full scroll every four seconds
                let phase = (started.elapsed().as_secs_f32() / 4.0).fract();
                Frame::rgb(
                    synthetic_pattern(params.width, params.height, phase),
                    params.width,
                    params.height,
                )
                .with_transform(params.transform)
            }
            SourceKind::Still(image) => still_to_frame(image, params.transform),
        };
        response.apply(&mut frame.data);
        slot.publish(frame);
        produced += 1;

        if produced % 300 == 0 {
            log::debug!("Frame source produced {} frames", produced);
        }

        if let Some(remaining) = interval.checked_sub(tick.elapsed()) {
            thread::sleep(remaining);
        }
    }

    log::debug!("Frame source stopped after {} frames", produced);
}
