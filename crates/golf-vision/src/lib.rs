//! Perception-to-geometry pipeline for a golf-playing legged robot.
//!
//! This crate provides:
//! - re-exports of the per-target crates (`ball`, `stick`, `landmark`) and
//!   the shared `core`,
//! - [`GolfVision`], which runs detection cycles against the robot's camera,
//!   pose queries, head joints and marker feed,
//! - a JSON [`VisionConfig`] covering every tunable,
//! - (feature `image`) conversions from and to `image` buffers.
//!
//! ## Quickstart
//!
//! ```no_run
//! use golf_vision::{GolfVision, Sources, Stance, VisionConfig};
//! # use golf_vision::core::*;
//! # struct Robot;
//! # impl FrameSource for Robot {
//! #     fn active_camera(&mut self) -> Result<CameraId, SourceError> { Ok(CameraId::Bottom) }
//! #     fn set_active_camera(&mut self, _: CameraId) -> Result<(), SourceError> { Ok(()) }
//! #     fn acquire(&mut self, _: &FrameRequest) -> Result<RawFrame, SourceError> { unimplemented!() }
//! # }
//! # impl PoseSource for Robot {
//! #     fn position(&mut self, _: &str, _: ReferenceFrame, _: bool) -> Result<[f64; 6], SourceError> { Ok([0.0; 6]) }
//! #     fn joint_angle(&mut self, _: Joint, _: bool) -> Result<f64, SourceError> { Ok(0.0) }
//! # }
//! # impl HeadActuator for Robot {
//! #     fn move_head(&mut self, _: f64, _: f64) -> Result<(), SourceError> { Ok(()) }
//! # }
//! # impl MarkerFeed for Robot {
//! #     fn subscribe(&mut self, _: &str) -> Result<(), SourceError> { Ok(()) }
//! #     fn unsubscribe(&mut self, _: &str) -> Result<(), SourceError> { Ok(()) }
//! #     fn poll(&mut self) -> Result<serde_json::Value, SourceError> { Ok(serde_json::Value::Null) }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sources = Sources { frames: Robot, poses: Robot, head: Robot, markers: Robot };
//! let mut vision = GolfVision::new(sources, VisionConfig::default())?;
//!
//! let report = vision.ball_cycle(Stance::StandInit)?;
//! if let Some(ball) = report.sighting {
//!     println!("ball {:.2} m ahead", ball.position.dis_x);
//! }
//! # Ok(())
//! # }
//! ```

pub use golf_vision_ball as ball;
pub use golf_vision_core as core;
pub use golf_vision_landmark as landmark;
pub use golf_vision_stick as stick;

mod config;
mod vision;

pub use config::{ConfigError, VisionConfig};
pub use golf_vision_core::{
    BallPosition, Frame, LandmarkDescriptor, LandmarkPosition, PixelRect, Stance,
};
pub use vision::{BallReport, GolfVision, Sources, StickReport, VisionError};

#[cfg(feature = "image")]
pub mod detect;

/// Install a `tracing` subscriber and route `log` records into it.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let _ = tracing_log::LogTracer::init();
    golf_vision_core::init_tracing(json);
}

pub use golf_vision_core::init_with_level;
