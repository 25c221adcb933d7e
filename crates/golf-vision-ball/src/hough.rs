//! Gradient Hough transform for circles.
//!
//! Pipeline: Sobel gradients and Canny edges (from `imageproc`), voting
//! along the gradient direction for every radius in range, local-maximum
//! centre extraction, then a per-centre radius vote over the edge distances.

use serde::{Deserialize, Serialize};

use golf_vision_core::GrayImageView;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Circle in pixel units.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Circle {
    pub x: u32,
    pub y: u32,
    pub radius: u32,
}

impl Circle {
    pub fn new(x: u32, y: u32, radius: u32) -> Self {
        Self { x, y, radius }
    }
}

/// Sensitivity of the transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoughParams {
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_high: f64,
    /// Minimum votes for a centre and for its radius.
    pub accumulator_threshold: u32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            canny_high: 150.0,
            accumulator_threshold: 15,
        }
    }
}

/// Detect circles, strongest centre first.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn find_circles(
    img: &GrayImageView<'_>,
    min_dist: f64,
    min_radius: u32,
    max_radius: u32,
    params: &HoughParams,
) -> Vec<Circle> {
    let (w, h) = (img.width, img.height);
    let min_radius = min_radius.max(1);
    if w < 3 || h < 3 || max_radius < min_radius {
        return Vec::new();
    }

    let luma = img.to_luma();
    let grad = Gradient {
        width: w,
        dx: horizontal_sobel(&luma).into_raw(),
        dy: vertical_sobel(&luma).into_raw(),
    };
    let edges = canny(
        &luma,
        (params.canny_high * 0.5) as f32,
        params.canny_high as f32,
    );
    let edge_points = edge_points(&edges);
    if edge_points.is_empty() {
        return Vec::new();
    }

    let acc = vote(&grad, h, &edge_points, min_radius, max_radius);
    let centers = local_maxima(&acc, w, h, params.accumulator_threshold);
    log::debug!(
        "hough: {} edge pixels, {} centre candidates",
        edge_points.len(),
        centers.len()
    );

    let min_dist2 = min_dist * min_dist;
    let mut out: Vec<Circle> = Vec::new();
    for idx in centers {
        let (cx, cy) = (idx % w, idx / w);
        let crowded = out.iter().any(|c| {
            let dx = c.x as f64 - cx as f64;
            let dy = c.y as f64 - cy as f64;
            dx * dx + dy * dy < min_dist2
        });
        if crowded {
            continue;
        }
        if let Some((radius, support)) = best_radius(cx, cy, &edge_points, min_radius, max_radius) {
            if support >= params.accumulator_threshold {
                out.push(Circle::new(cx as u32, cy as u32, radius));
            }
        }
    }
    out
}

/// Sobel responses, row-major.
struct Gradient {
    width: usize,
    dx: Vec<i16>,
    dy: Vec<i16>,
}

/// Coordinates of the set pixels of a Canny edge map, in raster order.
fn edge_points(edges: &::image::GrayImage) -> Vec<(usize, usize)> {
    edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] != 0)
        .map(|(x, y, _)| (x as usize, y as usize))
        .collect()
}

fn vote(
    grad: &Gradient,
    h: usize,
    edge_points: &[(usize, usize)],
    min_r: u32,
    max_r: u32,
) -> Vec<u32> {
    let w = grad.width;
    let mut acc = vec![0u32; w * h];
    for &(x, y) in edge_points {
        let i = y * w + x;
        let gx = f64::from(grad.dx[i]);
        let gy = f64::from(grad.dy[i]);
        let norm = gx.hypot(gy);
        if norm == 0.0 {
            continue;
        }
        let (vx, vy) = (gx / norm, gy / norm);
        for sign in [1.0, -1.0] {
            for r in min_r..=max_r {
                let r = sign * f64::from(r);
                let cx = (x as f64 + r * vx).round();
                let cy = (y as f64 + r * vy).round();
                if cx < 0.0 || cy < 0.0 || cx >= w as f64 || cy >= h as f64 {
                    break;
                }
                acc[cy as usize * w + cx as usize] += 1;
            }
        }
    }
    acc
}

/// Indices of accumulator peaks above `threshold`, most votes first.
fn local_maxima(acc: &[u32], w: usize, h: usize, threshold: u32) -> Vec<usize> {
    let mut peaks = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let v = acc[i];
            if v > threshold && v > acc[i - 1] && v >= acc[i + 1] && v > acc[i - w] && v >= acc[i + w]
            {
                peaks.push(i);
            }
        }
    }
    // stable: equal votes keep raster order
    peaks.sort_by(|&a, &b| acc[b].cmp(&acc[a]));
    peaks
}

/// Most supported integer edge distance from a centre, with its support.
fn best_radius(
    cx: usize,
    cy: usize,
    edge_points: &[(usize, usize)],
    min_r: u32,
    max_r: u32,
) -> Option<(u32, u32)> {
    let mut hist = vec![0u32; (max_r - min_r + 1) as usize];
    for &(x, y) in edge_points {
        let d = (x as f64 - cx as f64).hypot(y as f64 - cy as f64).round();
        if d >= f64::from(min_r) && d <= f64::from(max_r) {
            hist[(d as u32 - min_r) as usize] += 1;
        }
    }
    let mut best: Option<(u32, u32)> = None;
    for (k, &count) in hist.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((min_r + k as u32, count));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use golf_vision_core::{gaussian_blur, GrayImage};

    fn disc_mask(w: usize, h: usize, discs: &[(f64, f64, f64)]) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = discs.iter().any(|&(cx, cy, r)| {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                dx * dx + dy * dy <= r * r
            });
            if inside {
                255
            } else {
                0
            }
        })
    }

    fn near(a: u32, b: u32, tol: u32) -> bool {
        a.abs_diff(b) <= tol
    }

    #[test]
    fn empty_mask_has_no_circles() {
        let mask = GrayImage::new(64, 48);
        let circles = find_circles(&mask.view(), 4.0, 1, 10, &HoughParams::default());
        assert!(circles.is_empty());
    }

    #[test]
    fn finds_a_single_blurred_disc() {
        let mask = disc_mask(120, 100, &[(50.0, 50.0, 20.0)]);
        let blurred = gaussian_blur(&mask.view(), 9, 1.5);
        let circles = find_circles(&blurred.view(), 10.0, 1, 30, &HoughParams::default());

        assert!(!circles.is_empty());
        let c = circles[0];
        assert!(near(c.x, 50, 2) && near(c.y, 50, 2), "centre {c:?}");
        assert!(near(c.radius, 20, 2), "radius {c:?}");
    }

    #[test]
    fn nearby_centres_are_suppressed_and_distant_ones_kept() {
        let mask = disc_mask(200, 100, &[(45.0, 50.0, 15.0), (150.0, 50.0, 15.0)]);
        let circles = find_circles(&mask.view(), 20.0, 1, 25, &HoughParams::default());

        assert_eq!(circles.len(), 2, "{circles:?}");
        let mut xs: Vec<u32> = circles.iter().map(|c| c.x).collect();
        xs.sort_unstable();
        assert!(near(xs[0], 45, 2) && near(xs[1], 150, 2), "{circles:?}");
    }

    #[test]
    fn inverted_radius_range_is_empty() {
        let mask = disc_mask(60, 60, &[(30.0, 30.0, 10.0)]);
        assert!(find_circles(&mask.view(), 5.0, 20, 10, &HoughParams::default()).is_empty());
    }

    #[test]
    fn edge_points_hug_a_vertical_step() {
        let img = GrayImage::from_fn(16, 10, |x, _| if x >= 8 { 255 } else { 0 });
        let edges = canny(&img.view().to_luma(), 75.0, 150.0);
        let points = edge_points(&edges);
        assert!(!points.is_empty());
        assert!(points.iter().all(|&(x, _)| (6..=9).contains(&x)), "{points:?}");
        for y in 2..8 {
            assert!(points.iter().any(|&(_, py)| py == y), "row {y}");
        }
    }
}
