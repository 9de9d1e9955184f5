//! Calibrated luminance estimates for the snapshot legend.
//!
//! The center luminance comes from the brightness value (BV) in the still's
//! metadata when it parses, otherwise from the average gray of a 5-point
//! sample. The legend spans `center ± 25%` in four equal bands.

use image::RgbImage;

/// Number of legend bands; there is one more threshold than bands.
pub const LEGEND_LEVELS: usize = 4;

/// Relative half-span of the legend around the center value.
pub const LEGEND_HALF_SPAN: f64 = 0.25;

/// Luminance from a brightness value: `2.9 * exp(0.729 * BV)` in cd/m².
pub fn luminance_from_bv(bv: f64) -> f64 {
    2.9 * (0.729 * bv).exp()
}

/// Linear fallback keyed to the sampled average gray (0-255).
pub fn luminance_from_gray(gray: f64) -> f64 {
    gray / 255.0 * 400.0 + 50.0
}

/// Parse brightness metadata as a decimal or a `numerator/denominator` rational.
///
/// Anything that does not parse to a finite number is treated as unavailable.
pub fn parse_brightness(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let value = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            num / den
        }
        None => raw.parse().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Result of sampling a still at five fixed points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraySample {
    /// Per-channel integer mean over the sample points
    pub avg_rgb: [u8; 3],
    /// BT.601 luma of the mean color (0-255)
    pub gray: f64,
}

/// The four quadrant centers followed by the image center.
pub fn sample_points(width: u32, height: u32) -> [(u32, u32); 5] {
    [
        (width / 4, height / 4),
        (width * 3 / 4, height / 4),
        (width / 4, height * 3 / 4),
        (width * 3 / 4, height * 3 / 4),
        (width / 2, height / 2),
    ]
}

/// Sample the average color and gray of an image at [`sample_points`].
///
/// Returns `None` for an empty image.
pub fn sample_gray(image: &RgbImage) -> Option<GraySample> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let points = sample_points(width, height);
    let mut sum = [0u32; 3];
    for &(x, y) in &points {
        let px = image.get_pixel(x.min(width - 1), y.min(height - 1));
        for (acc, channel) in sum.iter_mut().zip(px.0) {
            *acc += channel as u32;
        }
    }

    let n = points.len() as u32;
    let avg_rgb = [(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8];
    let gray = 0.299 * avg_rgb[0] as f64 + 0.587 * avg_rgb[1] as f64 + 0.114 * avg_rgb[2] as f64;

    Some(GraySample { avg_rgb, gray })
}

/// Center luminance and legend thresholds for one still.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceEstimate {
    /// Center luminance in cd/m²
    pub center: f64,
    /// Ascending band boundaries from `0.75 * center` to `1.25 * center`
    pub thresholds: [f64; LEGEND_LEVELS + 1],
    /// Brightness value the center was derived from, if metadata parsed
    pub brightness_value: Option<f64>,
}

impl LuminanceEstimate {
    /// Estimate luminance from a sampled gray (0-255) and optional metadata.
    pub fn estimate(sampled_gray: f64, metadata: Option<&str>) -> Self {
        let brightness_value = metadata.and_then(parse_brightness);
        let center = match brightness_value {
            Some(bv) => luminance_from_bv(bv),
            None => luminance_from_gray(sampled_gray),
        };
        Self::around(center, brightness_value)
    }

    fn around(center: f64, brightness_value: Option<f64>) -> Self {
        let delta = center * LEGEND_HALF_SPAN;
        let mut thresholds = [0.0; LEGEND_LEVELS + 1];
        for (i, t) in thresholds.iter_mut().enumerate() {
            *t = center - delta + (2.0 * delta) * i as f64 / LEGEND_LEVELS as f64;
        }
        Self {
            center,
            thresholds,
            brightness_value,
        }
    }

    /// Lower and upper bound of legend band `index`.
    pub fn band(&self, index: usize) -> Option<(f64, f64)> {
        if index >= LEGEND_LEVELS {
            return None;
        }
        Some((self.thresholds[index], self.thresholds[index + 1]))
    }
}
