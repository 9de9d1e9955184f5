//! The prepared color-mapping stage of the live pipeline.

use crate::ramp::{RampError, RampTable};

/// BT.601 luma weights.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// A validated ramp ready to shade pixels.
///
/// Preparing fails if the table is unusable, so a renderer holding a
/// `RampProgram` can always map every pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampProgram {
    table: RampTable,
}

impl RampProgram {
    pub fn prepare(table: RampTable) -> Result<Self, RampError> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &RampTable {
        &self.table
    }

    /// Shade one normalized RGB sample: gain, clamp, luma, ramp.
    #[inline]
    pub fn shade(&self, sample: [f32; 3], gain: f32) -> [u8; 3] {
        let gray = luma(boost(sample, gain));
        self.table.map_rgb8(gray)
    }
}

/// `clamp(sample * gain, 0, 1)` per channel.
#[inline]
pub fn boost(sample: [f32; 3], gain: f32) -> [f32; 3] {
    [
        (sample[0] * gain).clamp(0.0, 1.0),
        (sample[1] * gain).clamp(0.0, 1.0),
        (sample[2] * gain).clamp(0.0, 1.0),
    ]
}

#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}
