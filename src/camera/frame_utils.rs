//! Frame construction helpers for the built-in frame sources.

use image::RgbImage;

use super::types::{Frame, TexMatrix};

/// Render the synthetic test pattern at animation `phase` (0.0-1.0).
///
/// The pattern is a gray horizontal ramp scrolling with `phase`, modulated
/// vertically so every ramp band is visible somewhere in the frame.
pub fn synthetic_pattern(width: u32, height: u32, phase: f32) -> Vec<u8> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        let row_weight = 0.5 + 0.5 * (y as f32 + 0.5) / height as f32;
        for x in 0..width {
            let ramp = ((x as f32 + 0.5) / width as f32 + phase).fract();
            let value = (ramp * row_weight * 255.0).round() as u8;
            data.extend_from_slice(&[value, value, value]);
        }
    }
    data
}

/// Wrap a still image as a frame with the given transform.
pub fn still_to_frame(image: &RgbImage, transform: TexMatrix) -> Frame {
    Frame::rgb(image.as_raw().clone(), image.width(), image.height()).with_transform(transform)
}
