//! Bitmap text drawing with the 8×8 font.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

/// Glyph cell size in font pixels.
pub const GLYPH_SIZE: u32 = 8;

/// Font rows for `c`; bit 0 of each row is the leftmost pixel.
///
/// Characters missing from both font tables render blank.
pub fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .unwrap_or([0; 8])
}

/// Width in pixels of `text` at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Height in pixels of one line at `scale`.
pub fn line_height(scale: u32) -> u32 {
    GLYPH_SIZE * scale
}

/// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the
/// image are skipped.
pub fn draw_text(image: &mut RgbImage, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1) as i64;
    let cell = GLYPH_SIZE as i64 * scale;
    let (width, height) = (image.width() as i64, image.height() as i64);

    for (index, c) in text.chars().enumerate() {
        let origin_x = x + index as i64 * cell;
        if origin_x >= width {
            break;
        }
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_SIZE as i64 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x + col * scale;
                let py = y + row as i64 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (tx, ty) = (px + dx, py + dy);
                        if (0..width).contains(&tx) && (0..height).contains(&ty) {
                            image.put_pixel(tx as u32, ty as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// Draw `text` over a drop shadow offset by one font pixel.
pub fn draw_text_shadowed(
    image: &mut RgbImage,
    x: i64,
    y: i64,
    text: &str,
    scale: u32,
    color: Rgb<u8>,
    shadow: Rgb<u8>,
) {
    let offset = scale.max(1) as i64;
    draw_text(image, x + offset, y + offset, text, scale, shadow);
    draw_text(image, x, y, text, scale, color);
}
