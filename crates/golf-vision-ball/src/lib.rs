//! Red golf-ball detector.
//!
//! Pipeline per frame:
//! - segment the red hue (two ranges across the hue origin),
//! - clean the mask (close, open, blur),
//! - gradient Hough transform for circle candidates,
//! - colour-purity selection among the candidates.
//!
//! The detector only reports pixels; placing the ball in the robot frame
//! is done with [`golf_vision_core::project_ball`].

mod detector;
pub mod hough;
pub mod select;
mod types;

pub use detector::{BallDetectionDebug, BallDetector};
pub use hough::{find_circles, Circle, HoughParams};
pub use select::{choose_by_purity, score_candidate, select_ball, ScoredCandidate, SelectionParams};
pub use types::{BallDetectorParams, BallObservation, BallSighting, RED_HIGH, RED_LOW};
