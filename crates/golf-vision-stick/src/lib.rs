//! Vertical yellow stick detector.
//!
//! The lower part of the frame is segmented on the stick colour and
//! cleaned; external contours are extracted, filtered by size and the
//! tallest upright bounding box wins. The bearing is computed with
//! [`golf_vision_core::stick_bearing`].

pub mod contour;
mod detector;
pub mod select;

pub use contour::{find_external_contours, Contour};
pub use detector::{
    StickDetector, StickDetectorParams, StickError, StickObservation, StickSighting, STICK_YELLOW,
};
pub use select::{filter_and_pick, pick_tallest, ContourLimits};
