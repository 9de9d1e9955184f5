//! Frame sources feeding the live preview.
//!
//! - Frame data and transforms via [`Frame`] and [`TexMatrix`]
//! - Latest-frame hand-off via [`FrameSlot`]
//! - Background producers via [`FrameSource`]
//! - Simulated exposure response via [`SimulatedSensor`]

mod frame_utils;
mod sensor;
mod slot;
mod source;
mod source_loop;
mod types;

pub use sensor::{mid_reference, SensorResponse, SimulatedSensor, MAX_RESPONSE};
pub use slot::FrameSlot;
pub use source::{FrameSource, SourceSettings};
pub use types::{CameraError, Frame, FrameFormat, TexMatrix};
