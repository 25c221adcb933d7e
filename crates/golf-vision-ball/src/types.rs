use serde::{Deserialize, Serialize};

use golf_vision_core::{BallPosition, CleanParams, HsvRange, DEFAULT_BALL_RADIUS};

use crate::{Circle, HoughParams, SelectionParams};

/// Red hue just above the origin.
pub const RED_LOW: HsvRange = HsvRange::new([0, 43, 46], [10, 255, 255]);
/// Red hue just below the wrap.
pub const RED_HIGH: HsvRange = HsvRange::new([156, 43, 46], [180, 255, 255]);

/// Parameters for [`crate::BallDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallDetectorParams {
    /// Colour ranges whose union is the ball mask.
    pub ranges: Vec<HsvRange>,
    pub clean: CleanParams,
    pub hough: HoughParams,
    pub selection: SelectionParams,
    /// Physical ball radius (m).
    pub ball_radius: f64,
}

impl Default for BallDetectorParams {
    fn default() -> Self {
        Self {
            ranges: vec![RED_LOW, RED_HIGH],
            clean: CleanParams::default(),
            hough: HoughParams::default(),
            selection: SelectionParams::default(),
            ball_radius: DEFAULT_BALL_RADIUS,
        }
    }
}

/// Ball seen in a frame, pixel units.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BallObservation {
    pub center_x: u32,
    pub center_y: u32,
    pub radius: u32,
}

impl BallObservation {
    pub const ZERO: Self = Self {
        center_x: 0,
        center_y: 0,
        radius: 0,
    };
}

impl From<Circle> for BallObservation {
    fn from(c: Circle) -> Self {
        Self {
            center_x: c.x,
            center_y: c.y,
            radius: c.radius,
        }
    }
}

/// Observation and robot-frame position from the same cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallSighting {
    pub observation: BallObservation,
    pub position: BallPosition,
}
