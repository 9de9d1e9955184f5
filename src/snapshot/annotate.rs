//! Pseudo-color annotation of captured stills.

use std::path::Path;

use image::{imageops, Rgb, RgbImage};
use thiserror::Error;

use super::legend::{draw_legend, LegendStyle};
use super::text::{draw_text_shadowed, line_height};
use crate::luminance::{sample_gray, LuminanceEstimate};
use crate::ramp::{RampTable, LIVE_RAMP, SNAPSHOT_RAMP};

/// Errors that fail a capture.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Cannot annotate an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Image I/O failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Layout of the annotated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatorConfig {
    /// Width of the side legend in pixels
    pub legend_width: u32,
    /// Integer scale of the 8×8 font for the legend header
    pub header_scale: u32,
    /// Integer scale of the 8×8 font for band labels
    pub label_scale: u32,
    /// Integer scale of the 8×8 font for the statistics overlay
    pub stats_scale: u32,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            legend_width: 190,
            header_scale: 2,
            label_scale: 3,
            stats_scale: 3,
        }
    }
}

/// Statistics printed on the annotated image.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotStats {
    pub avg_rgb: [u8; 3],
    pub gray: f64,
    /// Brightness metadata exactly as supplied
    pub metadata: Option<String>,
    pub estimate: LuminanceEstimate,
}

impl SnapshotStats {
    /// The overlay text, top to bottom.
    pub fn lines(&self) -> [String; 4] {
        let [r, g, b] = self.avg_rgb;
        let luminance = match self.estimate.brightness_value {
            Some(_) => format!("L = 2.9 × exp(0.729×BV) = {:.2}", self.estimate.center),
            None => "L = N/A".to_string(),
        };
        [
            format!("Avg RGB: R={}, G={}, B={}", r, g, b),
            format!("Gray = {:.2}", self.gray),
            format!("EXIF BV = {}", self.metadata.as_deref().unwrap_or("N/A")),
            luminance,
        ]
    }
}

/// Finished capture: the composed image and what was printed on it.
#[derive(Debug, Clone)]
pub struct AnnotatedImage {
    pub image: RgbImage,
    pub stats: SnapshotStats,
}

impl AnnotatedImage {
    /// Write the image, format chosen by the file extension.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.image.save(path)?;
        Ok(())
    }
}

/// Pseudo-colors a still and composes it with a legend and statistics.
///
/// Holds no state besides its configuration, so annotating the same input
/// twice gives the same pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Annotator {
    config: AnnotatorConfig,
}

const STATS_X: i64 = 30;
const STATS_Y: i64 = 30;
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

impl Annotator {
    pub fn new(config: AnnotatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate `image` whose gray level is carried in the red channel.
    pub fn annotate(
        &self,
        image: &RgbImage,
        metadata: Option<&str>,
    ) -> Result<AnnotatedImage, SnapshotError> {
        let sample = sample_gray(image).ok_or(SnapshotError::EmptyImage {
            width: image.width(),
            height: image.height(),
        })?;
        let estimate = LuminanceEstimate::estimate(sample.gray, metadata);
        let stats = SnapshotStats {
            avg_rgb: sample.avg_rgb,
            gray: sample.gray,
            metadata: metadata.map(str::to_string),
            estimate,
        };

        let rotated = imageops::rotate90(&pseudo_color(image, &SNAPSHOT_RAMP));
        let (width, height) = rotated.dimensions();

        let mut canvas = RgbImage::new(width + self.config.legend_width, height);
        imageops::replace(&mut canvas, &rotated, 0, 0);

        let style = LegendStyle {
            width: self.config.legend_width,
            header_scale: self.config.header_scale,
            label_scale: self.config.label_scale,
        };
        draw_legend(&mut canvas, width, &style, &LIVE_RAMP, &estimate);
        self.draw_stats(&mut canvas, &stats);

        log::debug!(
            "Annotated {}x{} still: gray {:.2}, L {:.2}",
            image.width(),
            image.height(),
            stats.gray,
            estimate.center
        );
        Ok(AnnotatedImage {
            image: canvas,
            stats,
        })
    }

    fn draw_stats(&self, canvas: &mut RgbImage, stats: &SnapshotStats) {
        let scale = self.config.stats_scale;
        let advance = (line_height(scale) * 2) as i64;
        for (i, line) in stats.lines().iter().enumerate() {
            draw_text_shadowed(
                canvas,
                STATS_X,
                STATS_Y + i as i64 * advance,
                line,
                scale,
                WHITE,
                BLACK,
            );
        }
    }
}

/// Map every pixel's red channel through `ramp`.
pub fn pseudo_color(image: &RgbImage, ramp: &RampTable) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        *dst = Rgb(ramp.map_rgb8(src.0[0] as f32));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            let v = (x * 255 / (width - 1)) as u8;
            Rgb([v, v, v])
        })
    }

    #[test]
    fn test_pseudo_color_uses_red_channel() {
        let img = RgbImage::from_pixel(1, 1, Rgb([200, 0, 0]));
        let out = pseudo_color(&img, &SNAPSHOT_RAMP);
        assert_eq!(out.get_pixel(0, 0).0, [255, 32, 0]);
    }

    #[test]
    fn test_empty_image_fails() {
        let err = Annotator::default()
            .annotate(&RgbImage::new(0, 0), None)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::EmptyImage { .. }));
    }

    #[test]
    fn test_output_dimensions() {
        let annotated = Annotator::default()
            .annotate(&gradient(64, 48), None)
            .unwrap();
        // Rotated: 48 wide, 64 tall, plus the legend
        assert_eq!(annotated.image.dimensions(), (48 + 190, 64));
    }

    #[test]
    fn test_stats_lines_without_metadata() {
        let img = RgbImage::from_pixel(8, 8, Rgb([100, 100, 100]));
        let annotated = Annotator::default().annotate(&img, None).unwrap();
        let lines = annotated.stats.lines();
        assert_eq!(lines[0], "Avg RGB: R=100, G=100, B=100");
        assert_eq!(lines[1], "Gray = 100.00");
        assert_eq!(lines[2], "EXIF BV = N/A");
        assert_eq!(lines[3], "L = N/A");
    }

    #[test]
    fn test_stats_lines_with_metadata() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 10, 10]));
        let annotated = Annotator::default().annotate(&img, Some("2.0")).unwrap();
        let lines = annotated.stats.lines();
        assert_eq!(lines[2], "EXIF BV = 2.0");
        assert_eq!(lines[3], "L = 2.9 × exp(0.729×BV) = 12.46");
    }

    #[test]
    fn test_unparsable_metadata_shown_raw() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 10, 10]));
        let annotated = Annotator::default().annotate(&img, Some("bogus")).unwrap();
        let lines = annotated.stats.lines();
        assert_eq!(lines[2], "EXIF BV = bogus");
        assert_eq!(lines[3], "L = N/A");
    }

    #[test]
    fn test_pixels_rotated_clockwise() {
        // Width 600 keeps the sampled pixel clear of legend and stats text.
        let mut img = RgbImage::from_pixel(600, 400, Rgb([0, 0, 0]));
        img.put_pixel(599, 399, Rgb([255, 0, 0]));
        let annotated = Annotator::default().annotate(&img, None).unwrap();
        // Bottom-right of the source lands at the bottom-left after rotation.
        assert_eq!(annotated.image.get_pixel(0, 599).0, [255, 252, 0]);
    }
}
