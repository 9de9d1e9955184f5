//! Side legend showing the luminance range of each ramp band.

use image::{Rgb, RgbImage};

use super::text::{draw_text, line_height, text_width};
use crate::luminance::{LuminanceEstimate, LEGEND_LEVELS};
use crate::ramp::{quantize, RampTable};

pub const LEGEND_HEADER: &str = "L (cd/m²)";

const PANEL: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Smallest band height, even on short images.
pub const MIN_BAND_HEIGHT: u32 = 50;
/// Inset of the gradient rectangle inside each band cell.
const BAND_INSET: u32 = 10;
/// Extra inset of the gradient end points.
const GRADIENT_INSET: u32 = 5;

/// Legend placement and text sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendStyle {
    pub width: u32,
    pub header_scale: u32,
    pub label_scale: u32,
}

/// Labels for band `index`: `L`, lower bound, arrow, upper bound.
pub fn band_labels(estimate: &LuminanceEstimate, index: usize) -> Option<[String; 4]> {
    let (lower, upper) = estimate.band(index)?;
    Some([
        "L".to_string(),
        format!("{:.2}", lower),
        "v".to_string(),
        format!("{:.2}", upper),
    ])
}

/// Height of the header strip above the bands.
pub fn header_height(style: &LegendStyle) -> u32 {
    line_height(style.header_scale) + 2 * BAND_INSET
}

/// Height of one band cell for an image `height` pixels tall.
pub fn band_height(style: &LegendStyle, height: u32) -> u32 {
    let available = height.saturating_sub(header_height(style));
    (available / LEGEND_LEVELS as u32).max(MIN_BAND_HEIGHT)
}

/// Draw the legend into the columns `[x0, x0 + style.width)` of `canvas`.
///
/// Band `i` shows the colors of `ramp` band `i` and the luminance range
/// `thresholds[i]..thresholds[i + 1]`; the lowest band is at the top.
pub fn draw_legend(
    canvas: &mut RgbImage,
    x0: u32,
    style: &LegendStyle,
    ramp: &RampTable,
    estimate: &LuminanceEstimate,
) {
    let height = canvas.height();
    let x1 = (x0 + style.width).min(canvas.width());
    for y in 0..height {
        for x in x0..x1 {
            canvas.put_pixel(x, y, PANEL);
        }
    }

    let header_scale = fit_scale(LEGEND_HEADER, style.header_scale, style.width);
    draw_text(
        canvas,
        text_x(x0, LEGEND_HEADER, header_scale, style.width),
        BAND_INSET as i64,
        LEGEND_HEADER,
        header_scale,
        INK,
    );

    let top = header_height(style);
    let cell = band_height(style, height);
    for index in 0..LEGEND_LEVELS {
        let y = top + index as u32 * cell;
        fill_band(canvas, x0, y, style.width, cell, ramp, index);

        if let Some(labels) = band_labels(estimate, index) {
            let advance = line_height(style.label_scale) + 2 * style.label_scale;
            let block = advance * labels.len() as u32;
            let mut text_y = y as i64 + (cell as i64 - block as i64) / 2;
            for label in &labels {
                let scale = fit_scale(label, style.label_scale, style.width);
                let x = text_x(x0, label, scale, style.width);
                draw_text(canvas, x, text_y, label, scale, INK);
                text_y += advance as i64;
            }
        }
    }
}

/// Fill a band cell with a gradient running along its diagonal.
fn fill_band(
    canvas: &mut RgbImage,
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    ramp: &RampTable,
    index: usize,
) {
    let band = &ramp.bands[index];
    let rect_x = (x0 + BAND_INSET, x0 + width.saturating_sub(BAND_INSET));
    let rect_y = (y0 + BAND_INSET, y0 + height.saturating_sub(BAND_INSET));

    // Gradient from the top-left to the bottom-right of the inner rectangle.
    let start = (
        (rect_x.0 + GRADIENT_INSET) as f32,
        rect_y.0 as f32,
    );
    let end = (
        rect_x.1.saturating_sub(GRADIENT_INSET) as f32,
        rect_y.1 as f32,
    );
    let axis = (end.0 - start.0, end.1 - start.1);
    let length_sq = axis.0 * axis.0 + axis.1 * axis.1;

    for y in rect_y.0..rect_y.1.min(canvas.height()) {
        for x in rect_x.0..rect_x.1.min(canvas.width()) {
            let t = if length_sq > 0.0 {
                let d = (x as f32 + 0.5 - start.0, y as f32 + 0.5 - start.1);
                ((d.0 * axis.0 + d.1 * axis.1) / length_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let color = [
                band.from[0] + (band.to[0] - band.from[0]) * t,
                band.from[1] + (band.to[1] - band.from[1]) * t,
                band.from[2] + (band.to[2] - band.from[2]) * t,
            ];
            canvas.put_pixel(x, y, Rgb(quantize(color)));
        }
    }
}

/// Largest scale up to `scale` at which `text` fits in `width`, never below 1.
pub fn fit_scale(text: &str, scale: u32, width: u32) -> u32 {
    let mut scale = scale.max(1);
    while scale > 1 && text_width(text, scale) > width {
        scale -= 1;
    }
    scale
}

/// Left edge of `text` centered in the legend, never left of `x0`.
fn text_x(x0: u32, text: &str, scale: u32, width: u32) -> i64 {
    let content = text_width(text, scale) as i64;
    x0 as i64 + ((width as i64 - content) / 2).max(0)
}
