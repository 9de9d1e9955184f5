//! Piecewise-linear pseudo-color ramps.
//!
//! A ramp is a table of four bands. Each band interpolates between a start
//! and an end color over `[start, start + width)`; the last band also
//! includes its upper bound. [`RampTable::map`] is the only evaluation path:
//! the live renderer calls it per pixel from a parallel kernel and the
//! snapshot annotator calls it from a sequential loop, so identical inputs
//! always produce identical colors.
//!
//! Colors are expressed in 8-bit channel units. Two tables exist:
//! - [`LIVE_RAMP`] - normalized input in `[0, 1]`, black → blue → green →
//!   yellow → red
//! - [`SNAPSHOT_RAMP`] - 8-bit input with thresholds at 64/128/192, each
//!   channel moving 4 units per input step

use thiserror::Error;

/// Number of bands in every ramp table.
pub const BAND_COUNT: usize = 4;

/// One linear segment of a ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Input value where this band begins (inclusive)
    pub start: f32,
    /// Width of the band in input units
    pub width: f32,
    /// Color at `start`
    pub from: [f32; 3],
    /// Color at `start + width`
    pub to: [f32; 3],
}

/// A fixed four-band color ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampTable {
    pub bands: [Band; BAND_COUNT],
}

/// Errors reported when a ramp table is not usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RampError {
    #[error("band {index} has non-positive width {width}")]
    EmptyBand { index: usize, width: f32 },

    #[error("band {index} does not start where band {previous} ends")]
    Gap { index: usize, previous: usize },

    #[error("band {index} contains a non-finite value")]
    NonFinite { index: usize },
}

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 255.0];
const GREEN: [f32; 3] = [0.0, 255.0, 0.0];
const YELLOW: [f32; 3] = [255.0, 255.0, 0.0];
const RED: [f32; 3] = [255.0, 0.0, 0.0];

/// Ramp used by the live preview, indexed by normalized gray.
pub const LIVE_RAMP: RampTable = RampTable {
    bands: [
        Band { start: 0.0, width: 0.25, from: BLACK, to: BLUE },
        Band { start: 0.25, width: 0.25, from: BLUE, to: GREEN },
        Band { start: 0.5, width: 0.25, from: GREEN, to: YELLOW },
        Band { start: 0.75, width: 0.25, from: YELLOW, to: RED },
    ],
};

/// Ramp used for captured stills, indexed by the 8-bit gray value.
///
/// The end colors overshoot the 8-bit range so that every channel moves by
/// exactly 4 per input step (`gray * 4`, `255 - (gray - 64) * 4`, ...).
/// Quantization clamps the overshoot.
pub const SNAPSHOT_RAMP: RampTable = RampTable {
    bands: [
        Band { start: 0.0, width: 64.0, from: BLACK, to: [0.0, 0.0, 256.0] },
        Band { start: 64.0, width: 64.0, from: BLUE, to: [0.0, 256.0, -1.0] },
        Band { start: 128.0, width: 64.0, from: [0.0, 255.0, 0.0], to: [256.0, -1.0, 0.0] },
        Band { start: 192.0, width: 64.0, from: [255.0, 0.0, 0.0], to: [255.0, 256.0, 0.0] },
    ],
};

impl RampTable {
    /// Lowest input value covered by the table.
    pub fn lower(&self) -> f32 {
        self.bands[0].start
    }

    /// Highest input value covered by the table.
    pub fn upper(&self) -> f32 {
        let last = &self.bands[BAND_COUNT - 1];
        last.start + last.width
    }

    /// Index of the band containing `value`.
    ///
    /// A value sitting exactly on a boundary belongs to the band that starts
    /// there. Values below the table fall into the first band, values above
    /// it into the last.
    #[inline]
    pub fn band_index(&self, value: f32) -> usize {
        for index in (1..BAND_COUNT).rev() {
            if value >= self.bands[index].start {
                return index;
            }
        }
        0
    }

    /// Map an input value to a color in 8-bit channel units (unclamped).
    #[inline]
    pub fn map(&self, value: f32) -> [f32; 3] {
        let band = &self.bands[self.band_index(value)];
        let t = (value - band.start) / band.width;
        mix(band.from, band.to, t)
    }

    /// Map an input value straight to an 8-bit RGB triple.
    #[inline]
    pub fn map_rgb8(&self, value: f32) -> [u8; 3] {
        quantize(self.map(value))
    }

    /// Check that bands are contiguous, non-empty and finite.
    pub fn validate(&self) -> Result<(), RampError> {
        for (index, band) in self.bands.iter().enumerate() {
            let finite = band.start.is_finite()
                && band.width.is_finite()
                && band.from.iter().chain(band.to.iter()).all(|c| c.is_finite());
            if !finite {
                return Err(RampError::NonFinite { index });
            }
            if band.width <= 0.0 {
                return Err(RampError::EmptyBand {
                    index,
                    width: band.width,
                });
            }
            if index > 0 {
                let prev = &self.bands[index - 1];
                if (prev.start + prev.width - band.start).abs() > f32::EPSILON * band.start.abs().max(1.0) {
                    return Err(RampError::Gap {
                        index,
                        previous: index - 1,
                    });
                }
            }
        }
        Ok(())
    }
}

/// `from * (1 - t) + to * t`, per channel.
#[inline]
fn mix(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    [
        from[0] * (1.0 - t) + to[0] * t,
        from[1] * (1.0 - t) + to[1] * t,
        from[2] * (1.0 - t) + to[2] * t,
    ]
}

/// Clamp a color in 8-bit units to `[0, 255]` and round to the nearest byte.
#[inline]
pub fn quantize(color: [f32; 3]) -> [u8; 3] {
    [
        color[0].clamp(0.0, 255.0).round() as u8,
        color[1].clamp(0.0, 255.0).round() as u8,
        color[2].clamp(0.0, 255.0).round() as u8,
    ]
}
