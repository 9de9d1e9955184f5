//! CLI enum types for controls and exposure formulas.

use clap::ValueEnum;

use crate::exposure::{ControlKind, ExposureFormula};

/// Manual control to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Control {
    Iso,
    Exposure,
    Brightness,
}

impl From<Control> for ControlKind {
    fn from(c: Control) -> Self {
        match c {
            Control::Iso => ControlKind::Iso,
            Control::Exposure => ControlKind::Exposure,
            Control::Brightness => ControlKind::Brightness,
        }
    }
}

/// Exposure quantity formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Formula {
    /// ISO × t
    IsoTime,
    /// ISO × t / N²
    IsoTimeAperture,
}

impl From<Formula> for ExposureFormula {
    fn from(f: Formula) -> Self {
        match f {
            Formula::IsoTime => ExposureFormula::IsoTime,
            Formula::IsoTimeAperture => ExposureFormula::IsoTimeAperture,
        }
    }
}
