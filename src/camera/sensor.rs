//! Simulated sensor response to the applied exposure.
//!
//! Frame sources without real hardware scale their output by the ratio of
//! the applied exposure quantity to a reference exposure, so the manual
//! controls have a visible effect on the preview.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::exposure::{ExposureFormula, ExposureSettings, ExposureSink, HardwareCaps};

/// Largest brightening the simulated sensor applies.
pub const MAX_RESPONSE: f64 = 4.0;

/// Response factor shared between the exposure sink and a frame source.
#[derive(Debug)]
pub struct SensorResponse {
    factor: AtomicU64,
}

impl Default for SensorResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorResponse {
    pub fn new() -> Self {
        Self {
            factor: AtomicU64::new(1.0f64.to_bits()),
        }
    }

    pub fn factor(&self) -> f64 {
        f64::from_bits(self.factor.load(Ordering::Acquire))
    }

    pub fn set_factor(&self, factor: f64) {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, MAX_RESPONSE)
        } else {
            1.0
        };
        self.factor.store(factor.to_bits(), Ordering::Release);
    }

    /// Scale 8-bit samples by the current factor, saturating at 255.
    pub fn apply(&self, data: &mut [u8]) {
        let factor = self.factor();
        if (factor - 1.0).abs() < f64::EPSILON {
            return;
        }
        for sample in data.iter_mut() {
            *sample = (*sample as f64 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Exposure sink that drives a [`SensorResponse`] instead of hardware.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    response: Arc<SensorResponse>,
    reference: f64,
    formula: ExposureFormula,
    aperture: f32,
}

impl SimulatedSensor {
    /// `reference` is the exposure quantity that yields an unscaled frame.
    pub fn new(
        response: Arc<SensorResponse>,
        reference: f64,
        formula: ExposureFormula,
        aperture: f32,
    ) -> Self {
        Self {
            response,
            reference,
            formula,
            aperture,
        }
    }
}

/// Reference exposure halfway (in stops) between the smallest and largest
/// exposure the hardware ranges allow. Falls back to 1.0 without ranges.
pub fn mid_reference(caps: &HardwareCaps, formula: ExposureFormula) -> f64 {
    let (Some(iso), Some(exposure)) = (caps.iso_range, caps.exposure_range) else {
        return 1.0;
    };
    let aperture = caps.aperture();
    let low = formula.evaluate(
        ExposureSettings {
            iso: iso.lower(),
            exposure_ns: exposure.lower(),
        },
        aperture,
    );
    let high = formula.evaluate(
        ExposureSettings {
            iso: iso.upper(),
            exposure_ns: exposure.upper(),
        },
        aperture,
    );
    let mid = (low * high).sqrt();
    if mid.is_finite() && mid > 0.0 {
        mid
    } else {
        1.0
    }
}

impl ExposureSink for SimulatedSensor {
    fn apply(&mut self, settings: ExposureSettings) {
        if self.reference <= 0.0 {
            return;
        }
        let e = self.formula.evaluate(settings, self.aperture);
        self.response.set_factor(e / self.reference);
        log::debug!(
            "Simulated sensor: ISO {} / {} ns -> response {:.3}",
            settings.iso,
            settings.exposure_ns,
            self.response.factor()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_default_is_identity() {
        let response = SensorResponse::new();
        let mut data = vec![10, 200, 255];
        response.apply(&mut data);
        assert_eq!(data, vec![10, 200, 255]);
    }

    #[test]
    fn test_response_scales_and_saturates() {
        let response = SensorResponse::new();
        response.set_factor(2.0);
        let mut data = vec![10, 200];
        response.apply(&mut data);
        assert_eq!(data, vec![20, 255]);
    }

    #[test]
    fn test_response_clamped() {
        let response = SensorResponse::new();
        response.set_factor(100.0);
        assert_eq!(response.factor(), MAX_RESPONSE);
        response.set_factor(f64::NAN);
        assert_eq!(response.factor(), 1.0);
    }

    #[test]
    fn test_mid_reference() {
        use crate::exposure::ValueRange;
        let caps = HardwareCaps {
            iso_range: ValueRange::new(100, 400),
            exposure_range: ValueRange::new(1_000_000, 4_000_000),
            ..HardwareCaps::default()
        };
        // low 0.1, high 1.6 -> sqrt(0.16)
        let mid = mid_reference(&caps, ExposureFormula::IsoTime);
        assert!((mid - 0.4).abs() < 1e-12);
        assert_eq!(
            mid_reference(&HardwareCaps::default(), ExposureFormula::IsoTime),
            1.0
        );
    }

    #[test]
    fn test_simulated_sensor_sets_ratio() {
        let response = Arc::new(SensorResponse::new());
        let mut sensor = SimulatedSensor::new(
            Arc::clone(&response),
            10.0,
            ExposureFormula::IsoTime,
            1.8,
        );
        sensor.apply(ExposureSettings {
            iso: 200,
            exposure_ns: 100_000_000,
        });
        assert!((response.factor() - 2.0).abs() < 1e-9);
    }
}
