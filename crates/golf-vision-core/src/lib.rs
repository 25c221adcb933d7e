//! Core types and utilities for golf-target perception on a legged robot.
//!
//! This crate owns everything the per-target detectors share:
//! - immutable camera [`Frame`]s and single-channel masks,
//! - HSV colour segmentation and morphological mask cleaning,
//! - the geometric back-projection from pixels (or marker angles) into the
//!   robot frame,
//! - narrow capability traits for the external collaborators (camera,
//!   pose queries, head actuation, marker-detection feed).
//!
//! It does *not* know what a ball or a stick looks like; that lives in the
//! `golf-vision-ball` and `golf-vision-stick` crates.

mod color;
mod frame;
mod image;
mod logger;
mod morphology;
mod projection;
mod source;

pub use color::{hsv_to_rgb, rgb_to_hsv, segment, segment_rows, HsvRange};
pub use frame::{ColorSpace, Frame, FrameError, PixelRect};
pub use self::image::{GrayImage, GrayImageView};
pub use morphology::{clean_mask, close, gaussian_blur, open, CleanParams};
pub use projection::{
    project_ball, project_landmark, stick_bearing, BallPosition, BallProjectionInput,
    CameraModel, CameraPose, HeadPose, LandmarkDescriptor, LandmarkPosition, ProjectionError,
    Stance, DEFAULT_BALL_RADIUS, DEFAULT_MARKER_SIZE, DEFAULT_MAX_GROUND_RANGE,
};
pub use source::{
    acquire_frame, ensure_camera, CameraId, FrameRequest, FrameSource, HeadActuator, Joint, MarkerFeed,
    PoseSource, RawFrame, ReferenceFrame, Resolution, SourceError,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
