//! Live pseudo-color preview.
//!
//! Each display refresh pulls the newest frame, samples it through the
//! frame's orientation transform inside the fitted viewport, applies the
//! shared gain, reduces to luma and maps through the live ramp.

mod gain;
mod program;
mod renderer;

pub use gain::{gain_for_progress, SharedGain, MAX_GAIN, MIN_GAIN};
pub use program::{boost, luma, RampProgram, LUMA_WEIGHTS};
pub use renderer::{sample_bilinear, FrameOutcome, LiveRenderer, RenderError, Surface};
