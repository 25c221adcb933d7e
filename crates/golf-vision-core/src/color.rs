//! HSV colour segmentation.
//!
//! A pixel is set in the output mask when it falls inside *any* of the
//! supplied inclusive ranges. Colours whose hue wraps around the origin
//! (red) are expressed as a low range plus a high range.

use serde::{Deserialize, Serialize};

use crate::{Frame, GrayImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Inclusive `[h, s, v]` range.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HsvRange {
    pub min: [u8; 3],
    pub max: [u8; 3],
}

impl HsvRange {
    pub const fn new(min: [u8; 3], max: [u8; 3]) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.min[c] && hsv[c] <= self.max[c])
    }
}

/// Convert one `[r, g, b]` pixel to 8-bit `[h, s, v]` (hue in half degrees).
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h = ((h * 0.5).round() as u32 % 180) as u8;
    [h, s.round() as u8, v as u8]
}

/// Convert one 8-bit `[h, s, v]` pixel (hue in half degrees) to `[r, g, b]`.
pub fn hsv_to_rgb(hsv: [u8; 3]) -> [u8; 3] {
    let h = (f32::from(hsv[0]) * 2.0) % 360.0;
    let s = f32::from(hsv[1]) / 255.0;
    let v = f32::from(hsv[2]);

    let c = v * s;
    let sector = h / 60.0;
    let x = c * (1.0 - ((sector % 2.0) - 1.0).abs());
    let (r1, g1, b1) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    [r1, g1, b1].map(|ch| (ch + m).round().clamp(0.0, 255.0) as u8)
}

/// Threshold the whole frame against `ranges` (pixel-wise union).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, ranges), fields(width = frame.width(), height = frame.height()))
)]
pub fn segment(frame: &Frame, ranges: &[HsvRange]) -> GrayImage {
    segment_rows(frame, 0, ranges)
}

/// Threshold rows `y0..height` of the frame; the mask row 0 is frame row `y0`.
pub fn segment_rows(frame: &Frame, y0: usize, ranges: &[HsvRange]) -> GrayImage {
    let y0 = y0.min(frame.height());
    GrayImage::from_fn(frame.width(), frame.height() - y0, |x, y| {
        let hsv = frame.hsv_at(x, y + y0);
        if ranges.iter().any(|r| r.contains(hsv)) {
            255
        } else {
            0
        }
    })
}
