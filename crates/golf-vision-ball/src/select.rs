//! Colour-purity choice among circle candidates.
//!
//! A real ball on grass seen through the `4r` window around its centre
//! contains a moderate share of red pixels and some green. The candidate
//! whose red share is closest to a reference purity wins.

use serde::{Deserialize, Serialize};

use golf_vision_core::Frame;

use crate::Circle;

/// Purity thresholds for [`select_ball`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    pub min_red_ratio: f64,
    pub min_green_ratio: f64,
    pub target_red_ratio: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            min_red_ratio: 0.12,
            min_green_ratio: 0.10,
            target_red_ratio: 0.19,
        }
    }
}

/// Colour statistics of one candidate window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub circle: Circle,
    pub red_ratio: f64,
    pub green_ratio: f64,
}

/// Whether the `center ± 2r` square lies inside a `width x height` frame.
pub fn window_in_bounds(circle: &Circle, width: usize, height: usize) -> bool {
    let r = u64::from(circle.radius);
    let (cx, cy) = (u64::from(circle.x), u64::from(circle.y));
    r >= 1
        && cx >= 2 * r
        && cy >= 2 * r
        && cx - 2 * r + 4 * r <= width as u64
        && cy - 2 * r + 4 * r <= height as u64
}

/// Red/green shares of the candidate window, `None` when it is out of bounds.
///
/// The window spans `x0..=x0+4r` on both axes, clipped to the frame.
pub fn score_candidate(frame: &Frame, circle: &Circle) -> Option<ScoredCandidate> {
    if !window_in_bounds(circle, frame.width(), frame.height()) {
        return None;
    }
    let r = circle.radius as usize;
    let x0 = circle.x as usize - 2 * r;
    let y0 = circle.y as usize - 2 * r;
    let x1 = (x0 + 4 * r).min(frame.width() - 1);
    let y1 = (y0 + 4 * r).min(frame.height() - 1);

    let (mut red, mut green, mut n) = (0usize, 0usize, 0usize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let [r, g, b] = frame.rgb_at(x, y);
            if r > g && r > b {
                red += 1;
            }
            if g > r {
                green += 1;
            }
            n += 1;
        }
    }
    let n = n as f64;
    Some(ScoredCandidate {
        circle: *circle,
        red_ratio: red as f64 / n,
        green_ratio: green as f64 / n,
    })
}

/// Eligible candidate closest to the target red share; first one wins ties.
pub fn choose_by_purity(scored: &[ScoredCandidate], params: &SelectionParams) -> Option<Circle> {
    let mut best: Option<(f64, Circle)> = None;
    for s in scored {
        if s.red_ratio < params.min_red_ratio || s.green_ratio < params.min_green_ratio {
            continue;
        }
        let dev = (s.red_ratio - params.target_red_ratio).abs();
        if best.map_or(true, |(d, _)| dev < d) {
            best = Some((dev, s.circle));
        }
    }
    best.map(|(_, c)| c)
}

/// Pick the ball among the detected circles.
///
/// A lone in-bounds circle is accepted without a colour check; otherwise
/// every in-bounds circle is scored and [`choose_by_purity`] decides.
pub fn select_ball(frame: &Frame, circles: &[Circle], params: &SelectionParams) -> Option<Circle> {
    match circles {
        [] => None,
        [only] if window_in_bounds(only, frame.width(), frame.height()) => Some(*only),
        _ => {
            let scored: Vec<ScoredCandidate> = circles
                .iter()
                .filter_map(|c| score_candidate(frame, c))
                .collect();
            log::debug!(
                "ball selection: {} of {} candidates in bounds",
                scored.len(),
                circles.len()
            );
            choose_by_purity(&scored, params)
        }
    }
}
