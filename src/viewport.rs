//! Center-crop viewport fitting.
//!
//! The rendered quad is centered at the origin of normalized device
//! coordinates with half-extents `scale_x` × `scale_y`. Geometry only changes
//! when the display size or the source aspect ratio changes, so the shared
//! state carries a dirty flag the render loop checks and clears atomically.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Default source aspect before the first frame size is known (4:3).
pub const DEFAULT_SOURCE_ASPECT: f32 = 4.0 / 3.0;

/// Half-extents of the fitted quad in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for ViewportGeometry {
    fn default() -> Self {
        Self::FULL
    }
}

impl ViewportGeometry {
    /// Quad covering the whole viewport.
    pub const FULL: ViewportGeometry = ViewportGeometry {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Fit a source of `source_aspect` (width / height) into a view of
    /// `view_aspect`.
    ///
    /// A view wider than the source scales Y by `source / view`; otherwise X
    /// is scaled by `view / source`. Degenerate aspects yield [`Self::FULL`].
    pub fn fit(view_aspect: f32, source_aspect: f32) -> Self {
        let valid = |a: f32| a.is_finite() && a > 0.0;
        if !valid(view_aspect) || !valid(source_aspect) {
            return Self::FULL;
        }

        if view_aspect > source_aspect {
            ViewportGeometry {
                scale_x: 1.0,
                scale_y: source_aspect / view_aspect,
            }
        } else {
            ViewportGeometry {
                scale_x: view_aspect / source_aspect,
                scale_y: 1.0,
            }
        }
    }

    /// Triangle-strip vertices (bottom-left, bottom-right, top-left, top-right).
    pub fn vertices(&self) -> [f32; 8] {
        let (x, y) = (self.scale_x, self.scale_y);
        [-x, -y, x, -y, -x, y, x, y]
    }

    /// Area of the quad in NDC units (`2 * scale_x × 2 * scale_y`).
    pub fn area(&self) -> f32 {
        4.0 * self.scale_x * self.scale_y
    }

    /// Map an NDC point to texture coordinates inside the quad.
    ///
    /// Texture coordinates have their origin at the top-left of the source.
    /// Returns `None` for points outside the quad.
    #[inline]
    pub fn ndc_to_tex(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        if x.abs() > self.scale_x || y.abs() > self.scale_y {
            return None;
        }
        let u = (x / self.scale_x + 1.0) * 0.5;
        let v = (1.0 - y / self.scale_y) * 0.5;
        Some((u, v))
    }
}

/// Mounting rotation of the sensor relative to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Build from a rotation in degrees; values are normalized to a quarter turn.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Orientation::Deg90,
            180 => Orientation::Deg180,
            270 => Orientation::Deg270,
            _ => Orientation::Deg0,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Whether width and height swap when shown upright.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Orientation::Deg90 | Orientation::Deg270)
    }
}

/// View and source aspects shared between the control side and the render loop.
///
/// Writers store an aspect and then raise the dirty flag; the render loop
/// clears the flag with a single `swap` before reading the aspects, so an
/// update racing with a recompute is picked up on the next frame.
#[derive(Debug)]
pub struct SharedViewport {
    view_aspect: AtomicU32,
    source_aspect: AtomicU32,
    dirty: AtomicBool,
}

impl Default for SharedViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedViewport {
    pub fn new() -> Self {
        Self {
            view_aspect: AtomicU32::new(1.0f32.to_bits()),
            source_aspect: AtomicU32::new(DEFAULT_SOURCE_ASPECT.to_bits()),
            dirty: AtomicBool::new(true),
        }
    }

    /// Record a new display surface size.
    pub fn set_view_size(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.view_aspect
            .store((width as f32 / height as f32).to_bits(), Ordering::Release);
        self.dirty.store(true, Ordering::Release);
    }

    /// Record the source frame size as delivered by the sensor.
    ///
    /// Sensors mounted at 90° or 270° deliver frames whose width and height
    /// are swapped relative to the display, so they are swapped back here.
    pub fn set_source_size(&self, width: u32, height: u32, orientation: Orientation) {
        if width == 0 || height == 0 {
            return;
        }
        let (w, h) = if orientation.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        };
        self.source_aspect
            .store((w as f32 / h as f32).to_bits(), Ordering::Release);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn view_aspect(&self) -> f32 {
        f32::from_bits(self.view_aspect.load(Ordering::Acquire))
    }

    pub fn source_aspect(&self) -> f32 {
        f32::from_bits(self.source_aspect.load(Ordering::Acquire))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Clear the dirty flag and return fresh geometry if it was set.
    pub fn take_dirty(&self) -> Option<ViewportGeometry> {
        if self.dirty.swap(false, Ordering::AcqRel) {
            Some(ViewportGeometry::fit(self.view_aspect(), self.source_aspect()))
        } else {
            None
        }
    }
}
