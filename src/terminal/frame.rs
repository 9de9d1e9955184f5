//! Rendered surfaces as terminal cells.
//!
//! Each cell shows two vertically stacked pixels using the upper half block:
//! the foreground color is the top pixel, the background the bottom one.

use std::fmt::Write as _;

use crate::live::Surface;

/// Upper half block character.
pub const HALF_BLOCK: char = '▀';

/// RGB color of a half cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<[u8; 3]> for CellColor {
    fn from(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
        }
    }
}

/// One terminal cell: top and bottom pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub top: CellColor,
    pub bottom: CellColor,
}

/// A surface folded into terminal cells.
#[derive(Debug, Clone, Default)]
pub struct CellFrame {
    pub cells: Vec<Cell>,
    /// Width in cells (= surface width)
    pub width: u16,
    /// Height in cells (= surface height / 2, rounded up)
    pub height: u16,
}

/// Surface size that fills `cols` × `rows` terminal cells.
pub fn surface_size(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32, rows as u32 * 2)
}

impl CellFrame {
    pub fn from_surface(surface: &Surface) -> Self {
        let width = surface.width;
        let height = surface.height.div_ceil(2);
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height {
            for x in 0..width {
                let top = surface.pixel(x, row * 2).unwrap_or_default();
                let bottom = surface.pixel(x, row * 2 + 1).unwrap_or_default();
                cells.push(Cell {
                    top: top.into(),
                    bottom: bottom.into(),
                });
            }
        }
        Self {
            cells,
            width: width.min(u16::MAX as u32) as u16,
            height: height.min(u16::MAX as u32) as u16,
        }
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// ANSI output drawing the frame from the top-left of the screen.
    ///
    /// Color escapes are only emitted when they change along a row.
    pub fn to_ansi(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 24);
        for y in 0..self.height {
            let _ = write!(out, "\x1b[{};1H", y + 1);
            let mut last: Option<Cell> = None;
            for x in 0..self.width {
                let Some(cell) = self.cell(x, y) else {
                    continue;
                };
                if last.map(|l| l.top) != Some(cell.top) {
                    let c = cell.top;
                    let _ = write!(out, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b);
                }
                if last.map(|l| l.bottom) != Some(cell.bottom) {
                    let c = cell.bottom;
                    let _ = write!(out, "\x1b[48;2;{};{};{}m", c.r, c.g, c.b);
                }
                out.push(HALF_BLOCK);
                last = Some(cell);
            }
            out.push_str("\x1b[0m");
        }
        out
    }
}
