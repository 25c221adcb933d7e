use golf_vision_core::{clean_mask, segment, Frame, GrayImage};

use crate::hough::find_circles;
use crate::select::select_ball;
use crate::types::{BallDetectorParams, BallObservation};
use crate::Circle;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Red golf-ball detector.
#[derive(Clone, Debug, Default)]
pub struct BallDetector {
    params: BallDetectorParams,
}

/// Intermediate products of one detection, for inspection.
#[derive(Clone, Debug)]
pub struct BallDetectionDebug {
    pub mask: GrayImage,
    pub circles: Vec<Circle>,
    pub selected: Option<BallObservation>,
}

impl BallDetector {
    pub fn new(params: BallDetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BallDetectorParams {
        &self.params
    }

    /// Segmented and cleaned ball mask.
    pub fn preprocess(&self, frame: &Frame) -> GrayImage {
        let mask = segment(frame, &self.params.ranges);
        clean_mask(&mask.view(), &self.params.clean)
    }

    /// Circle candidates with the frame-derived spacing and radius bounds.
    pub fn candidates(&self, mask: &GrayImage) -> Vec<Circle> {
        let h = mask.height;
        let min_dist = (h / 30) as f64;
        let max_radius = (h / 10) as u32;
        find_circles(&mask.view(), min_dist, 1, max_radius, &self.params.hough)
    }

    /// Detect the ball; `None` when nothing passes selection.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect(&self, frame: &Frame) -> Option<BallObservation> {
        self.detect_debug(frame).selected
    }

    pub fn detect_debug(&self, frame: &Frame) -> BallDetectionDebug {
        let mask = self.preprocess(frame);
        let circles = self.candidates(&mask);
        let selected = select_ball(frame, &circles, &self.params.selection).map(BallObservation::from);
        match &selected {
            Some(obs) => log::debug!(
                "ball at ({}, {}) r={} from {} candidates",
                obs.center_x,
                obs.center_y,
                obs.radius,
                circles.len()
            ),
            None => log::debug!("no ball among {} candidates", circles.len()),
        }
        BallDetectionDebug {
            mask,
            circles,
            selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use golf_vision_core::ColorSpace;

    const GRASS: [u8; 3] = [30, 140, 40];
    const RED: [u8; 3] = [220, 25, 25];

    fn ball_frame(w: usize, h: usize, cx: f64, cy: f64, r: f64) -> Frame {
        Frame::from_fn(w, h, ColorSpace::Rgb, |x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            if dx * dx + dy * dy <= r * r {
                RED
            } else {
                GRASS
            }
        })
        .expect("frame")
    }

    #[test]
    fn grass_only_frame_has_no_ball() {
        let frame = Frame::from_fn(160, 120, ColorSpace::Rgb, |_, _| GRASS).expect("frame");
        assert_eq!(BallDetector::default().detect(&frame), None);
    }

    #[test]
    fn red_disc_on_grass_is_found() {
        let frame = ball_frame(320, 240, 150.0, 130.0, 14.0);
        let obs = BallDetector::default().detect(&frame).expect("ball");
        assert!(obs.center_x.abs_diff(150) <= 2, "{obs:?}");
        assert!(obs.center_y.abs_diff(130) <= 2, "{obs:?}");
        assert!(obs.radius.abs_diff(14) <= 3, "{obs:?}");
    }

    #[test]
    fn hsv_frames_are_handled_without_conversion_by_the_caller() {
        let rgb = ball_frame(320, 240, 100.0, 100.0, 12.0);
        let hsv = Frame::from_fn(320, 240, ColorSpace::Hsv, |x, y| {
            golf_vision_core::rgb_to_hsv(rgb.rgb_at(x, y))
        })
        .expect("frame");
        let a = BallDetector::default().detect(&rgb);
        let b = BallDetector::default().detect(&hsv);
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
