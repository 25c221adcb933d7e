use serde::{Deserialize, Serialize};

use crate::color::{hsv_to_rgb, rgb_to_hsv};

/// Pixel layout of a [`Frame`].
///
/// HSV frames use the 8-bit half-degree hue convention: hue in `0..=179`,
/// saturation and value in `0..=255`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Hsv,
    Rgb,
    Bgr,
}

/// Errors produced when wrapping a raw camera buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("unsupported channel count {0} (expected 3)")]
    UnsupportedChannels(usize),
    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    BufferLength { expected: usize, got: usize },
}

/// One immutable camera snapshot.
///
/// Row-major, interleaved, 8 bits per channel. A `Frame` can only be built
/// through [`Frame::from_raw`], so every instance has a buffer that matches
/// its dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    color_space: ColorSpace,
    data: Vec<u8>,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    /// Wrap a raw interleaved buffer, validating its shape.
    pub fn from_raw(
        width: usize,
        height: usize,
        channels: usize,
        color_space: ColorSpace,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }
        if channels != Self::CHANNELS {
            return Err(FrameError::UnsupportedChannels(channels));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or(FrameError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(FrameError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            color_space,
            data,
        })
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        color_space: ColorSpace,
        mut f: impl FnMut(usize, usize) -> [u8; 3],
    ) -> Result<Self, FrameError> {
        let mut data = Vec::with_capacity(width * height * Self::CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::from_raw(width, height, Self::CHANNELS, color_space, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Raw pixel in the frame's own colour space.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * Self::CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Pixel converted to `[r, g, b]`.
    pub fn rgb_at(&self, x: usize, y: usize) -> [u8; 3] {
        let [a, b, c] = self.pixel(x, y);
        match self.color_space {
            ColorSpace::Rgb => [a, b, c],
            ColorSpace::Bgr => [c, b, a],
            ColorSpace::Hsv => hsv_to_rgb([a, b, c]),
        }
    }

    /// Pixel converted to `[h, s, v]`.
    pub fn hsv_at(&self, x: usize, y: usize) -> [u8; 3] {
        let [a, b, c] = self.pixel(x, y);
        match self.color_space {
            ColorSpace::Hsv => [a, b, c],
            ColorSpace::Rgb => rgb_to_hsv([a, b, c]),
            ColorSpace::Bgr => rgb_to_hsv([c, b, a]),
        }
    }
}

/// Axis-aligned rectangle in pixel coordinates (`x`, `y` is the top-left).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Height over width. Zero-width rectangles report `0.0`.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        self.height as f64 / self.width as f64
    }

    /// Horizontal centre, with the half-width truncated to a whole pixel.
    pub fn center_x(&self) -> f64 {
        (self.x + self.width / 2) as f64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
