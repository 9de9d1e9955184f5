//! End-to-end tests for the live path: frame source -> slot -> renderer.
//!
//! These cover:
//! - A running source publishes frames the renderer can pick up
//! - The renderer shades exactly like the ramp program
//! - Pixels outside the fitted quad stay black
//! - Gain changes show up without a new frame

use std::sync::Arc;
use std::time::{Duration, Instant};

use falsecolor::camera::{Frame, FrameSlot, FrameSource, SourceSettings};
use falsecolor::live::{FrameOutcome, LiveRenderer, RampProgram, SharedGain};
use falsecolor::ramp::LIVE_RAMP;
use falsecolor::viewport::{Orientation, SharedViewport};

fn renderer(gain: Arc<SharedGain>) -> LiveRenderer {
    let mut renderer = LiveRenderer::new(Arc::new(SharedViewport::new()), gain);
    renderer.prepare(LIVE_RAMP).expect("live ramp is valid");
    renderer
}

fn uniform_frame(value: u8, width: u32, height: u32) -> Frame {
    Frame::rgb(vec![value; (width * height * 3) as usize], width, height)
}

// ==================== Source -> Renderer ====================

#[test]
fn test_synthetic_source_feeds_renderer() {
    let settings = SourceSettings {
        width: 32,
        height: 24,
        fps: 60,
        orientation: Orientation::Deg0,
    };
    let mut source = FrameSource::synthetic(settings).expect("valid size");
    let slot = source.slot();
    source.start().expect("source starts");

    let deadline = Instant::now() + Duration::from_secs(2);
    while slot.sequence() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(slot.sequence() > 0, "no frame published within 2s");

    let mut renderer = renderer(Arc::new(SharedGain::default()));
    renderer.resize(16, 12);
    match renderer.draw_frame(&slot) {
        FrameOutcome::Rendered { sequence } => assert!(sequence > 0),
        other => panic!("Expected Rendered, got {:?}", other),
    }

    source.stop();
    assert!(!source.is_running());
}

#[test]
fn test_waiting_until_first_frame() {
    let slot = FrameSlot::new();
    let mut renderer = renderer(Arc::new(SharedGain::default()));
    renderer.resize(8, 8);
    assert!(matches!(renderer.draw_frame(&slot), FrameOutcome::Waiting));

    slot.publish(uniform_frame(50, 4, 3));
    assert!(matches!(
        renderer.draw_frame(&slot),
        FrameOutcome::Rendered { .. }
    ));
    assert!(matches!(renderer.draw_frame(&slot), FrameOutcome::Reused));
}

// ==================== Shading parity ====================

#[test]
fn test_render_matches_program() {
    let program = RampProgram::prepare(LIVE_RAMP).unwrap();
    for value in [0u8, 40, 100, 128, 200, 255] {
        let mut renderer = renderer(Arc::new(SharedGain::default()));
        renderer.resize(16, 12);
        renderer.render(&uniform_frame(value, 4, 3)).unwrap();

        let sample = value as f32 / 255.0;
        let expected = program.shade([sample; 3], 1.0);
        // A flat frame samples exactly, so any difference is a shading mismatch
        for (x, y) in [(8, 6), (0, 0), (15, 11), (3, 9)] {
            assert_eq!(
                renderer.surface().pixel(x, y),
                Some(expected),
                "gray {} at ({}, {})",
                value,
                x,
                y
            );
        }
    }
}

#[test]
fn test_letterbox_outside_quad_is_black() {
    let mut renderer = renderer(Arc::new(SharedGain::default()));
    // Square surface, 4:3 source: the quad spans 3/4 of the width
    renderer.resize(16, 16);
    renderer.render(&uniform_frame(255, 4, 3)).unwrap();

    let surface = renderer.surface();
    assert_eq!(surface.pixel(0, 8), Some([0, 0, 0]));
    assert_eq!(surface.pixel(15, 8), Some([0, 0, 0]));
    assert_eq!(surface.pixel(8, 8), Some(LIVE_RAMP.map_rgb8(1.0)));
}

#[test]
fn test_gain_applies_to_reused_frame() {
    let gain = Arc::new(SharedGain::default());
    let mut renderer = renderer(Arc::clone(&gain));
    renderer.resize(16, 12);

    let slot = FrameSlot::new();
    slot.publish(uniform_frame(64, 4, 3));
    renderer.draw_frame(&slot);
    let before = renderer.surface().pixel(8, 6).unwrap();

    gain.set(2.0);
    assert!(matches!(renderer.draw_frame(&slot), FrameOutcome::Reused));
    let after = renderer.surface().pixel(8, 6).unwrap();
    assert_ne!(before, after);

    let program = RampProgram::prepare(LIVE_RAMP).unwrap();
    assert_eq!(after, program.shade([64.0 / 255.0; 3], 2.0));
}

#[test]
fn test_malformed_frame_keeps_previous_surface() {
    let mut renderer = renderer(Arc::new(SharedGain::default()));
    renderer.resize(8, 6);
    renderer.render(&uniform_frame(200, 4, 3)).unwrap();
    let before = renderer.surface().pixels.clone();

    let bad = Frame::rgb(vec![0; 5], 4, 3);
    assert!(renderer.render(&bad).is_err());
    assert_eq!(renderer.surface().pixels, before);
}
