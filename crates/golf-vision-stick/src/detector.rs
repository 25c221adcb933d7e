use serde::{Deserialize, Serialize};

use golf_vision_core::{clean_mask, segment_rows, CleanParams, Frame, GrayImage, HsvRange, PixelRect};

use crate::contour::find_external_contours;
use crate::select::filter_and_pick;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Yellow stick colour.
pub const STICK_YELLOW: HsvRange = HsvRange::new([27, 55, 115], [45, 255, 255]);

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StickError {
    #[error("crop_keep must be in (0, 1], got {0}")]
    InvalidCrop(f64),
}

/// Parameters for [`StickDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickDetectorParams {
    pub range: HsvRange,
    /// Fraction of the frame, from the bottom, that is searched.
    pub crop_keep: f64,
    pub clean: CleanParams,
    /// Minimum `h / w` of the bounding rectangle (exclusive).
    pub min_aspect: f64,
}

impl Default for StickDetectorParams {
    fn default() -> Self {
        Self {
            range: STICK_YELLOW,
            crop_keep: 0.75,
            clean: CleanParams {
                blur_sigma: 0.0,
                ..CleanParams::default()
            },
            min_aspect: 0.8,
        }
    }
}

/// Stick bounding box in full-frame pixel coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StickObservation {
    pub rect: PixelRect,
}

/// Observation and bearing (radians) from the same cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StickSighting {
    pub observation: StickObservation,
    pub angle: f64,
}

/// Vertical yellow stick detector.
#[derive(Clone, Debug)]
pub struct StickDetector {
    params: StickDetectorParams,
}

impl StickDetector {
    pub fn new(params: StickDetectorParams) -> Result<Self, StickError> {
        if !(params.crop_keep > 0.0 && params.crop_keep <= 1.0) {
            return Err(StickError::InvalidCrop(params.crop_keep));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &StickDetectorParams {
        &self.params
    }

    /// First frame row that is kept by the crop.
    pub fn crop_offset(&self, frame_height: usize) -> usize {
        (frame_height as f64 * (1.0 - self.params.crop_keep)).floor() as usize
    }

    /// Cleaned mask of the cropped region; row 0 is frame row `crop_offset`.
    pub fn preprocess(&self, frame: &Frame) -> GrayImage {
        let mask = segment_rows(frame, self.crop_offset(frame.height()), &[self.params.range]);
        clean_mask(&mask.view(), &self.params.clean)
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect(&self, frame: &Frame) -> Option<StickObservation> {
        let mask = self.preprocess(frame);
        let contours = find_external_contours(&mask.view());
        let mut rect = filter_and_pick(
            &contours,
            frame.width(),
            frame.height(),
            self.params.min_aspect,
        )?;
        rect.y += self.crop_offset(frame.height()) as u32;
        log::debug!(
            "stick at x={} y={} w={} h={}",
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
        Some(StickObservation { rect })
    }
}

impl Default for StickDetector {
    fn default() -> Self {
        Self {
            params: StickDetectorParams::default(),
        }
    }
}
