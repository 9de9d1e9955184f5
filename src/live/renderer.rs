//! Per-frame pseudo-color rendering onto an RGB surface.

use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use super::gain::SharedGain;
use super::program::RampProgram;
use crate::camera::{Frame, FrameSlot};
use crate::ramp::{RampError, RampTable};
use crate::viewport::{SharedViewport, ViewportGeometry};

/// Errors that drop a live frame.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render surface is unavailable ({width}x{height})")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("Malformed frame: {width}x{height} with {len} bytes")]
    MalformedFrame { width: u32, height: u32, len: usize },

    #[error("Color-mapping program has not been prepared")]
    ProgramNotPrepared,

    #[error("Invalid color ramp: {0}")]
    InvalidRamp(#[from] RampError),
}

/// RGB pixel buffer the renderer draws into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB, 3 bytes per pixel
    pub pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

/// What a draw call did.
#[derive(Debug)]
pub enum FrameOutcome {
    /// A newly published frame was rendered
    Rendered { sequence: u64 },
    /// No newer frame; the last frame was rendered again
    Reused,
    /// No frame has been published yet
    Waiting,
    /// Rendering failed; the previous surface stays presented
    Dropped(RenderError),
}

/// Draws frames through the ramp program into a double-buffered surface.
///
/// The kernel renders into the back buffer and the buffers are swapped only
/// when the whole frame succeeded, so the presented surface never holds a
/// partial frame.
pub struct LiveRenderer {
    program: Option<RampProgram>,
    viewport: Arc<SharedViewport>,
    gain: Arc<SharedGain>,
    geometry: ViewportGeometry,
    geometry_updates: u64,
    front: Surface,
    back: Surface,
    last_seen: u64,
    last_frame: Option<Arc<Frame>>,
}

impl std::fmt::Debug for LiveRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveRenderer")
            .field("prepared", &self.program.is_some())
            .field("geometry", &self.geometry)
            .field("size", &(self.front.width, self.front.height))
            .field("last_seen", &self.last_seen)
            .finish_non_exhaustive()
    }
}

impl LiveRenderer {
    pub fn new(viewport: Arc<SharedViewport>, gain: Arc<SharedGain>) -> Self {
        Self {
            program: None,
            viewport,
            gain,
            geometry: ViewportGeometry::FULL,
            geometry_updates: 0,
            front: Surface::default(),
            back: Surface::default(),
            last_seen: 0,
            last_frame: None,
        }
    }

    /// Prepare the color-mapping stage from a ramp table.
    pub fn prepare(&mut self, table: RampTable) -> Result<(), RenderError> {
        self.program = Some(RampProgram::prepare(table)?);
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.program.is_some()
    }

    /// Resize the surface and mark the viewport dirty.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.front.width, self.front.height) {
            return;
        }
        self.front = Surface::new(width, height);
        self.back = Surface::new(width, height);
        self.viewport.set_view_size(width, height);
    }

    /// The presented surface.
    pub fn surface(&self) -> &Surface {
        &self.front
    }

    pub fn geometry(&self) -> ViewportGeometry {
        self.geometry
    }

    /// How many times geometry was recomputed.
    pub fn geometry_updates(&self) -> u64 {
        self.geometry_updates
    }

    /// Pull the latest frame from `slot` without waiting and render it.
    ///
    /// Without a newer frame the previous one is rendered again, picking up
    /// gain or geometry changes. Errors are logged and drop the frame.
    pub fn draw_frame(&mut self, slot: &FrameSlot) -> FrameOutcome {
        let fresh = match slot.newer_than(self.last_seen) {
            Some((sequence, frame)) => {
                self.last_seen = sequence;
                self.last_frame = Some(frame);
                Some(sequence)
            }
            None => None,
        };

        let Some(frame) = self.last_frame.clone() else {
            return FrameOutcome::Waiting;
        };

        match self.render(&frame) {
            Ok(()) => match fresh {
                Some(sequence) => FrameOutcome::Rendered { sequence },
                None => FrameOutcome::Reused,
            },
            Err(e) => {
                log::debug!("Dropped frame: {}", e);
                FrameOutcome::Dropped(e)
            }
        }
    }

    /// Render one frame and present it.
    pub fn render(&mut self, frame: &Frame) -> Result<(), RenderError> {
        let program = self.program.ok_or(RenderError::ProgramNotPrepared)?;
        if self.back.is_empty() {
            return Err(RenderError::SurfaceUnavailable {
                width: self.back.width,
                height: self.back.height,
            });
        }
        if !frame.is_well_formed() {
            return Err(RenderError::MalformedFrame {
                width: frame.width,
                height: frame.height,
                len: frame.data.len(),
            });
        }

        if let Some(geometry) = self.viewport.take_dirty() {
            log::debug!(
                "Viewport geometry: {:.3} x {:.3}",
                geometry.scale_x,
                geometry.scale_y
            );
            self.geometry = geometry;
            self.geometry_updates += 1;
        }

        render_into(
            &mut self.back,
            frame,
            &program,
            self.geometry,
            self.gain.get(),
        );
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

/// Run the shading kernel over every row of `target` in parallel.
fn render_into(
    target: &mut Surface,
    frame: &Frame,
    program: &RampProgram,
    geometry: ViewportGeometry,
    gain: f32,
) {
    let width = target.width as usize;
    let height = target.height as usize;

    target
        .pixels
        .par_chunks_mut(width * 3)
        .enumerate()
        .for_each(|(y, row)| {
            let ndc_y = 1.0 - (y as f32 + 0.5) / height as f32 * 2.0;
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let ndc_x = (x as f32 + 0.5) / width as f32 * 2.0 - 1.0;
                let color = match geometry.ndc_to_tex(ndc_x, ndc_y) {
                    Some((u, v)) => {
                        let (su, sv) = frame.transform.apply(u, v);
                        program.shade(sample_bilinear(frame, su, sv), gain)
                    }
                    None => [0, 0, 0],
                };
                px.copy_from_slice(&color);
            }
        });
}

/// Bilinear sample at texture coordinates `(u, v)`, clamped to edge.
///
/// Returns normalized RGB.
#[inline]
pub fn sample_bilinear(frame: &Frame, u: f32, v: f32) -> [f32; 3] {
    let w = frame.width as usize;
    let h = frame.height as usize;
    let fx = (u * w as f32 - 0.5).clamp(0.0, (w - 1) as f32);
    let fy = (v * h as f32 - 0.5).clamp(0.0, (h - 1) as f32);

    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let texel = |x: usize, y: usize, c: usize| frame.data[(y * w + x) * 3 + c] as f32;
    // a + (b - a) * t is exact when a == b, so flat regions sample exactly
    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let mut out = [0.0f32; 3];
    for (c, value) in out.iter_mut().enumerate() {
        let top = lerp(texel(x0, y0, c), texel(x1, y0, c), tx);
        let bottom = lerp(texel(x0, y1, c), texel(x1, y1, c), tx);
        *value = lerp(top, bottom, ty) / 255.0;
    }
    out
}
