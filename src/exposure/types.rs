//! Exposure values, hardware capabilities and the exposure quantity.

use serde::{Deserialize, Serialize};

use crate::viewport::Orientation;

/// Integer quantity that can be linearly interpolated over a control range.
pub trait RangeValue: Copy + PartialOrd {
    fn to_f64(self) -> f64;
    /// Convert back, truncating toward zero.
    fn from_f64(value: f64) -> Self;
}

impl RangeValue for u32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as u32
    }
}

impl RangeValue for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as u64
    }
}

/// Closed range reported by the hardware. `lower <= upper` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange<T> {
    lower: T,
    upper: T,
}

impl<T: RangeValue> ValueRange<T> {
    /// Returns `None` when `lower > upper`.
    pub fn new(lower: T, upper: T) -> Option<Self> {
        if lower > upper {
            None
        } else {
            Some(Self { lower, upper })
        }
    }

    pub fn lower(&self) -> T {
        self.lower
    }

    pub fn upper(&self) -> T {
        self.upper
    }

    /// `lower + (upper - lower) * (progress / max_progress)`.
    ///
    /// Progress beyond `max_progress` is clamped, so the result always lies
    /// inside the range.
    pub fn lerp(&self, progress: u32, max_progress: u32) -> T {
        if max_progress == 0 {
            return self.lower;
        }
        let fraction = progress.min(max_progress) as f64 / max_progress as f64;
        let span = self.upper.to_f64() - self.lower.to_f64();
        T::from_f64(self.lower.to_f64() + span * fraction)
    }
}

/// What the hardware supports, read once at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareCaps {
    pub iso_range: Option<ValueRange<u32>>,
    pub exposure_range: Option<ValueRange<u64>>,
    pub apertures: Vec<f32>,
    pub orientation: Orientation,
}

impl Default for HardwareCaps {
    fn default() -> Self {
        Self {
            iso_range: None,
            exposure_range: None,
            apertures: Vec::new(),
            orientation: Orientation::Deg90,
        }
    }
}

impl HardwareCaps {
    /// The fixed aperture; only the first reported value is used.
    pub fn aperture(&self) -> f32 {
        self.apertures
            .first()
            .copied()
            .filter(|n| n.is_finite() && *n > 0.0)
            .unwrap_or(1.0)
    }

    /// Settings at the bottom of both ranges (zero where a range is missing).
    pub fn initial_settings(&self) -> ExposureSettings {
        ExposureSettings {
            iso: self.iso_range.map_or(0, |r| r.lower()),
            exposure_ns: self.exposure_range.map_or(0, |r| r.lower()),
        }
    }
}

/// The (ISO, exposure time) pair pushed to the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExposureSettings {
    pub iso: u32,
    pub exposure_ns: u64,
}

impl ExposureSettings {
    pub fn exposure_secs(&self) -> f64 {
        self.exposure_ns as f64 / 1e9
    }
}

/// How the exposure quantity E is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExposureFormula {
    /// `E = ISO × t`
    #[default]
    IsoTime,
    /// `E = ISO × t / N²`
    IsoTimeAperture,
}

impl ExposureFormula {
    pub fn evaluate(self, settings: ExposureSettings, aperture: f32) -> f64 {
        let e = settings.iso as f64 * settings.exposure_secs();
        match self {
            ExposureFormula::IsoTime => e,
            ExposureFormula::IsoTimeAperture => {
                let n = aperture as f64;
                if n > 0.0 {
                    e / (n * n)
                } else {
                    e
                }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExposureFormula::IsoTime => "iso-time",
            ExposureFormula::IsoTimeAperture => "iso-time-aperture",
        }
    }
}

/// Display string for the exposure quantity.
pub fn format_exposure_value(e: f64) -> String {
    format!("E: {:.2}", e)
}

/// Exposure time for display: microseconds below 1 ms, milliseconds above.
pub fn format_exposure_time(exposure_ns: u64) -> String {
    if exposure_ns < 1_000_000 {
        format!("{:.2}μs", exposure_ns as f64 / 1e3)
    } else {
        format!("{:.2}ms", exposure_ns as f64 / 1e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rejects_inverted() {
        assert!(ValueRange::new(10u32, 5).is_none());
        assert!(ValueRange::new(5u32, 5).is_some());
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let iso = ValueRange::new(100u32, 1600).unwrap();
        assert_eq!(iso.lerp(0, 5000), 100);
        assert_eq!(iso.lerp(5000, 5000), 1600);
        assert_eq!(iso.lerp(2500, 5000), 850);

        let exposure = ValueRange::new(1_000_000u64, 500_000_000).unwrap();
        assert_eq!(exposure.lerp(2500, 5000), 250_500_000);
    }

    #[test]
    fn test_lerp_clamps_progress() {
        let iso = ValueRange::new(100u32, 1600).unwrap();
        assert_eq!(iso.lerp(7000, 5000), 1600);
        assert_eq!(iso.lerp(10, 0), 100);
    }

    #[test]
    fn test_lerp_truncates() {
        let iso = ValueRange::new(0u32, 10).unwrap();
        // 10 * 1/3 = 3.33
        assert_eq!(iso.lerp(1, 3), 3);
    }

    #[test]
    fn test_aperture_first_value() {
        let caps = HardwareCaps {
            apertures: vec![1.8, 2.4],
            ..HardwareCaps::default()
        };
        assert_eq!(caps.aperture(), 1.8);
        assert_eq!(HardwareCaps::default().aperture(), 1.0);
    }

    #[test]
    fn test_formula_iso_time() {
        let settings = ExposureSettings {
            iso: 850,
            exposure_ns: 250_500_000,
        };
        let e = ExposureFormula::IsoTime.evaluate(settings, 1.8);
        assert!((e - 212.925).abs() < 1e-9);
        assert_eq!(format_exposure_value(e), "E: 212.93");
    }

    #[test]
    fn test_formula_with_aperture() {
        let settings = ExposureSettings {
            iso: 400,
            exposure_ns: 10_000_000,
        };
        let e = ExposureFormula::IsoTimeAperture.evaluate(settings, 2.0);
        assert!((e - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_format_exposure_time() {
        assert_eq!(format_exposure_time(500_000), "500.00μs");
        assert_eq!(format_exposure_time(250_500_000), "250.50ms");
        assert_eq!(format_exposure_time(1_000_000), "1.00ms");
    }
}
