//! Manual exposure controls.
//!
//! - Hardware ranges and the exposure quantity via [`HardwareCaps`] and
//!   [`ExposureFormula`]
//! - Control reconciliation via [`transition`] and [`ExposureCoordinator`]

mod coordinator;
mod types;

pub use coordinator::{
    transition, ControlInput, ControlKind, ControlState, ExposureCoordinator, ExposureMode,
    ExposureSink, NullSink,
};
pub use types::{
    format_exposure_time, format_exposure_value, ExposureFormula, ExposureSettings, HardwareCaps,
    RangeValue, ValueRange,
};
