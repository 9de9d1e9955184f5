//! Live-preview brightness gain shared with the control timeline.

use std::sync::atomic::{AtomicU32, Ordering};

/// Smallest gain the preview applies.
pub const MIN_GAIN: f32 = 0.5;
/// Largest gain the preview applies.
pub const MAX_GAIN: f32 = 2.0;

/// Gain published as a single atomic word.
///
/// The brightness control writes it, the render loop reads whatever value
/// was last fully written.
#[derive(Debug)]
pub struct SharedGain {
    bits: AtomicU32,
}

impl Default for SharedGain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SharedGain {
    pub fn new(gain: f32) -> Self {
        Self {
            bits: AtomicU32::new(clamp_gain(gain).to_bits()),
        }
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, gain: f32) {
        self.bits.store(clamp_gain(gain).to_bits(), Ordering::Release);
    }
}

/// Gain for a brightness control position: 0 maps to 0.5, `max` to 2.0.
pub fn gain_for_progress(progress: u32, max_progress: u32) -> f32 {
    if max_progress == 0 {
        return MIN_GAIN;
    }
    let fraction = progress.min(max_progress) as f32 / max_progress as f32;
    MIN_GAIN + (MAX_GAIN - MIN_GAIN) * fraction
}

fn clamp_gain(gain: f32) -> f32 {
    if gain.is_nan() {
        1.0
    } else {
        gain.clamp(MIN_GAIN, MAX_GAIN)
    }
}
