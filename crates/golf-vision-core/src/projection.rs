//! Back-projection from image observations into the robot frame.
//!
//! Two flavours share this module:
//! - ball/stick: a pixel location plus the current camera and head pose is
//!   intersected with the ground plane (ball) or turned into a bearing
//!   (stick);
//! - landmark: an angular marker descriptor is composed with the measured
//!   robot→camera transform.
//!
//! Angles are radians, distances metres. The ball bearing is
//! `atan2(y, x)`; the landmark bearing is `atan2(x, y)`. Both conventions
//! are kept as the behaviour layer consumes them.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::PixelRect;

/// Physical radius of the golf ball (m).
pub const DEFAULT_BALL_RADIUS: f64 = 0.025;
/// Physical side of the fiducial marker (m).
pub const DEFAULT_MARKER_SIZE: f64 = 0.105;

/// Smallest accepted `tan` of the depression angle towards the ground.
const MIN_DEPRESSION_TAN: f64 = 1e-6;

/// Errors raised by the back-projection.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("unknown stance {0:?} (expected \"standInit\" or \"standUp\")")]
    UnknownStance(String),
    #[error("ray does not meet the ground (depression angle {depression:.4} rad)")]
    InvalidDistance { depression: f64 },
    #[error("marker angular size {0} is outside (0, pi)")]
    InvalidAngularSize(f64),
    #[error("frame has zero width or height")]
    EmptyFrame,
}

/// Longest ground distance (m) a ball projection may report by default.
pub const DEFAULT_MAX_GROUND_RANGE: f64 = 10.0;

/// Fixed field of view of the camera, radians, plus the usable ground range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    pub vertical_fov: f64,
    pub horizontal_fov: f64,
    /// Rays that meet the ground further away than this (m) are rejected.
    #[serde(default = "default_max_ground_range")]
    pub max_ground_range: f64,
}

fn default_max_ground_range() -> f64 {
    DEFAULT_MAX_GROUND_RANGE
}

impl Default for CameraModel {
    fn default() -> Self {
        Self {
            vertical_fov: 47.64_f64.to_radians(),
            horizontal_fov: 60.97_f64.to_radians(),
            max_ground_range: DEFAULT_MAX_GROUND_RANGE,
        }
    }
}

/// Robot stance; selects the fixed mount pitch of the lower camera.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stance {
    StandInit,
    StandUp,
}

impl Stance {
    /// Camera mount pitch below the head axis for this stance (radians).
    pub fn mount_pitch(self) -> f64 {
        match self {
            Stance::StandInit => 49.2_f64.to_radians(),
            Stance::StandUp => 39.7_f64.to_radians(),
        }
    }

    /// Lateral scale correction `ky(x)` measured for this stance, if any.
    pub fn lateral_correction(self, x: f64) -> Option<f64> {
        match self {
            Stance::StandInit => {
                Some(42.513 * x.powi(4) - 109.66 * x.powi(3) + 104.2 * x.powi(2) - 44.218 * x + 8.5526)
            }
            Stance::StandUp => None,
        }
    }
}

impl FromStr for Stance {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standInit" | "StandInit" | "stand_init" | "stand-init" => Ok(Stance::StandInit),
            "standUp" | "StandUp" | "stand_up" | "stand-up" => Ok(Stance::StandUp),
            other => Err(ProjectionError::UnknownStance(other.to_string())),
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stance::StandInit => "standInit",
            Stance::StandUp => "standUp",
        })
    }
}

/// Six-component pose `[x, y, z, roll, pitch, yaw]` of a body frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl CameraPose {
    pub fn from_position(p: [f64; 6]) -> Self {
        Self {
            x: p[0],
            y: p[1],
            z: p[2],
            roll: p[3],
            pitch: p[4],
            yaw: p[5],
        }
    }

    /// Rigid transform from the reference frame into this body frame.
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.x, self.y, self.z),
            UnitQuaternion::from_euler_angles(self.roll, self.pitch, self.yaw),
        )
    }
}

/// Head joint angles, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub pitch: f64,
    pub yaw: f64,
}

/// Everything needed to place a ball seen at a pixel centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallProjectionInput {
    pub center_x: f64,
    pub center_y: f64,
    pub frame_width: usize,
    pub frame_height: usize,
    pub camera: CameraModel,
    pub camera_pose: CameraPose,
    pub head: HeadPose,
    pub stance: Stance,
    pub ball_radius: f64,
}

/// Ball position in the robot frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BallPosition {
    pub dis_x: f64,
    pub dis_y: f64,
    pub angle: f64,
}

impl BallPosition {
    pub const ZERO: Self = Self {
        dis_x: 0.0,
        dis_y: 0.0,
        angle: 0.0,
    };
}

/// Angular description of a detected marker, as reported by the marker feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkDescriptor {
    /// Horizontal angle of the marker centre in the camera (alpha).
    pub azimuth: f64,
    /// Vertical angle of the marker centre in the camera (beta).
    pub elevation: f64,
    /// Apparent marker width as an angle.
    pub angular_size: f64,
    /// `azimuth` plus the head yaw at the time of detection.
    pub head_relative_azimuth: f64,
}

impl LandmarkDescriptor {
    pub const ZERO: Self = Self {
        azimuth: 0.0,
        elevation: 0.0,
        angular_size: 0.0,
        head_relative_azimuth: 0.0,
    };
}

/// Landmark position in the robot frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPosition {
    pub dis_x: f64,
    pub dis_y: f64,
    pub distance: f64,
    pub yaw_angle: f64,
}

/// Intersect the ray through the ball centre with the plane at ball height.
pub fn project_ball(input: &BallProjectionInput) -> Result<BallPosition, ProjectionError> {
    if input.frame_width == 0 || input.frame_height == 0 {
        return Err(ProjectionError::EmptyFrame);
    }
    let w = input.frame_width as f64;
    let h = input.frame_height as f64;

    let ball_pitch = (input.center_y - h / 2.0) * input.camera.vertical_fov / h;
    let ball_yaw = (w / 2.0 - input.center_x) * input.camera.horizontal_fov / w;

    let depression = input.stance.mount_pitch() + input.head.pitch + ball_pitch;
    let tan_depression = depression.tan();
    if !tan_depression.is_finite() || tan_depression <= MIN_DEPRESSION_TAN {
        return Err(ProjectionError::InvalidDistance { depression });
    }

    let d_pitch = (input.camera_pose.z - input.ball_radius) / tan_depression;
    // grazing rays: tiny depression blows the ground distance up
    if d_pitch > input.camera.max_ground_range {
        return Err(ProjectionError::InvalidDistance { depression });
    }
    let d_yaw = d_pitch / ball_yaw.cos();

    let x = d_yaw * (ball_yaw + input.head.yaw).cos() + input.camera_pose.x;
    let mut y = d_yaw * (ball_yaw + input.head.yaw).sin() + input.camera_pose.y;
    if let Some(ky) = input.stance.lateral_correction(x) {
        y *= ky;
    }
    let angle = y.atan2(x);

    if !(x.is_finite() && y.is_finite()) {
        return Err(ProjectionError::InvalidDistance { depression });
    }
    Ok(BallPosition {
        dis_x: x,
        dis_y: y,
        angle,
    })
}

/// Place a marker from its angular descriptor and the robot→camera transform.
pub fn project_landmark(
    descriptor: &LandmarkDescriptor,
    robot_to_camera: &Isometry3<f64>,
    marker_size: f64,
) -> Result<LandmarkPosition, ProjectionError> {
    let size = descriptor.angular_size;
    if !(size > 0.0 && size < PI) {
        return Err(ProjectionError::InvalidAngularSize(size));
    }
    let range = marker_size / (2.0 * (size / 2.0).tan());

    let camera_to_marker_rot = Isometry3::from_parts(
        Translation3::identity(),
        UnitQuaternion::from_euler_angles(0.0, descriptor.elevation, descriptor.azimuth),
    );
    let camera_to_marker_trans = Isometry3::translation(range, 0.0, 0.0);
    let robot_to_marker = robot_to_camera * camera_to_marker_rot * camera_to_marker_trans;

    let t = robot_to_marker.translation.vector;
    let (dis_x, dis_y) = (t.x, t.y);
    Ok(LandmarkPosition {
        dis_x,
        dis_y,
        distance: dis_x.hypot(dis_y),
        yaw_angle: dis_x.atan2(dis_y),
    })
}

/// Bearing of a stick bounding box, corrected by the head yaw.
pub fn stick_bearing(
    rect: &PixelRect,
    frame_width: usize,
    camera: &CameraModel,
    head_yaw: f64,
) -> f64 {
    let w = frame_width as f64;
    (w / 2.0 - rect.center_x()) / w * camera.horizontal_fov + head_yaw
}
