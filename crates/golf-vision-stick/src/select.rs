//! Size and shape filter for stick candidates.

use golf_vision_core::PixelRect;

use crate::Contour;

/// Size thresholds derived from the full frame size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourLimits {
    pub min_perimeter: f64,
    pub min_area: f64,
}

impl ContourLimits {
    /// `H / 8` perimeter and `H * W / 1000` area.
    pub fn for_frame(frame_width: usize, frame_height: usize) -> Self {
        Self {
            min_perimeter: frame_height as f64 / 8.0,
            min_area: (frame_height * frame_width) as f64 / 1000.0,
        }
    }
}

/// Bounding rectangles of the contours that pass the size limits.
pub fn candidate_rects(contours: &[Contour], limits: &ContourLimits) -> Vec<PixelRect> {
    contours
        .iter()
        .filter(|c| c.perimeter() > limits.min_perimeter && c.area() > limits.min_area)
        .map(Contour::bounding_rect)
        .collect()
}

/// Tallest rectangle (by `h / w`) above `min_aspect`; first one wins ties.
pub fn pick_tallest(rects: &[PixelRect], min_aspect: f64) -> Option<PixelRect> {
    let mut best: Option<PixelRect> = None;
    for rect in rects.iter().filter(|r| r.aspect_ratio() > min_aspect) {
        if best.map_or(true, |b| rect.aspect_ratio() > b.aspect_ratio()) {
            best = Some(*rect);
        }
    }
    best
}

/// Size filter followed by [`pick_tallest`]. Coordinates stay in mask space.
pub fn filter_and_pick(
    contours: &[Contour],
    frame_width: usize,
    frame_height: usize,
    min_aspect: f64,
) -> Option<PixelRect> {
    let rects = candidate_rects(contours, &ContourLimits::for_frame(frame_width, frame_height));
    log::debug!(
        "stick: {} contours, {} pass size limits",
        contours.len(),
        rects.len()
    );
    pick_tallest(&rects, min_aspect)
}
