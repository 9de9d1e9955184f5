//! Frame types and data structures.

use std::time::Instant;

use image::RgbImage;
use thiserror::Error;

use crate::viewport::Orientation;

/// Pixel format of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
}

/// 4×4 column-major texture-coordinate transform supplied with each frame.
///
/// Only the 2D affine part is used: `u' = m[0]*u + m[4]*v + m[12]`,
/// `v' = m[1]*u + m[5]*v + m[13]`. Texture coordinates have their origin at
/// the top-left of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexMatrix(pub [f32; 16]);

impl Default for TexMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TexMatrix {
    pub const IDENTITY: TexMatrix = TexMatrix([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Transform that displays a frame from a sensor mounted at `orientation`
    /// upright (clockwise rotation by the mounting angle).
    pub fn for_orientation(orientation: Orientation) -> Self {
        let (m0, m1, m4, m5, m12, m13) = match orientation {
            Orientation::Deg0 => return Self::IDENTITY,
            Orientation::Deg90 => (0.0, -1.0, 1.0, 0.0, 0.0, 1.0),
            Orientation::Deg180 => (-1.0, 0.0, 0.0, -1.0, 1.0, 1.0),
            Orientation::Deg270 => (0.0, 1.0, -1.0, 0.0, 1.0, 0.0),
        };
        let mut m = Self::IDENTITY.0;
        m[0] = m0;
        m[1] = m1;
        m[4] = m4;
        m[5] = m5;
        m[12] = m12;
        m[13] = m13;
        TexMatrix(m)
    }

    #[inline]
    pub fn apply(&self, u: f32, v: f32) -> (f32, f32) {
        let m = &self.0;
        (m[0] * u + m[4] * v + m[12], m[1] * u + m[5] * v + m[13])
    }
}

/// A frame delivered by a frame source.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when frame was produced
    pub timestamp: Instant,
    /// Orientation correction for sampling
    pub transform: TexMatrix,
}

impl Frame {
    /// Build an RGB frame with an identity transform.
    pub fn rgb(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
            transform: TexMatrix::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: TexMatrix) -> Self {
        self.transform = transform;
        self
    }

    /// Get the number of bytes per pixel (3 for RGB).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb => 3,
        }
    }

    /// Whether the buffer length matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.width as usize * self.height as usize * self.bytes_per_pixel()
    }

    /// Copy the frame into an image buffer, as stored (no orientation applied).
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if !self.is_well_formed() {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

/// Errors that can occur while running a frame source.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Source thread is already running
    #[error("Frame source is already running")]
    AlreadyRunning,

    /// Requested frame size is unusable
    #[error("Invalid frame size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Still image could not be loaded
    #[error("Failed to load still image: {0}")]
    StillLoad(#[from] image::ImageError),

    /// Source thread could not be spawned
    #[error("Failed to start frame source: {0}")]
    SpawnFailed(#[from] std::io::Error),
}
