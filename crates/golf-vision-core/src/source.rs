//! Capabilities of the external collaborators.
//!
//! The detectors never talk to the robot directly. They are handed narrow
//! trait objects for the camera, the pose queries, the head joints and the
//! marker-detection feed; the concrete transport lives outside this
//! workspace.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ColorSpace, Frame, FrameError};

/// Errors raised by a collaborator or while wrapping its output.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("collaborator transport failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Physical camera on the head.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraId {
    Top = 0,
    Bottom = 1,
}

impl CameraId {
    /// Name of the camera frame in pose queries.
    pub fn frame_name(self) -> &'static str {
        match self {
            CameraId::Top => "CameraTop",
            CameraId::Bottom => "CameraBottom",
        }
    }
}

/// Capture resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// 160 x 120
    Qqvga,
    /// 320 x 240
    Qvga,
    /// 640 x 480
    Vga,
    /// 1280 x 960
    FourVga,
}

impl Resolution {
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            Resolution::Qqvga => (160, 120),
            Resolution::Qvga => (320, 240),
            Resolution::Vga => (640, 480),
            Resolution::FourVga => (1280, 960),
        }
    }
}

/// Reference frame of a pose query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceFrame {
    Torso = 0,
    World = 1,
    Robot = 2,
}

/// Head joints read by the pipeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Joint {
    HeadPitch,
    HeadYaw,
}

impl Joint {
    pub fn name(self) -> &'static str {
        match self {
            Joint::HeadPitch => "HeadPitch",
            Joint::HeadYaw => "HeadYaw",
        }
    }
}

/// Parameters of one frame acquisition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRequest {
    pub client: String,
    pub camera: CameraId,
    pub resolution: Resolution,
    pub color_space: ColorSpace,
    pub fps: u32,
}

impl Default for FrameRequest {
    fn default() -> Self {
        Self {
            client: "golf-vision".to_string(),
            camera: CameraId::Bottom,
            resolution: Resolution::Vga,
            color_space: ColorSpace::Hsv,
            fps: 30,
        }
    }
}

/// Frame as delivered by the transport, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawFrame {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

/// Camera capability.
pub trait FrameSource {
    fn active_camera(&mut self) -> Result<CameraId, SourceError>;
    fn set_active_camera(&mut self, camera: CameraId) -> Result<(), SourceError>;
    /// Subscribe, grab one image and unsubscribe.
    fn acquire(&mut self, request: &FrameRequest) -> Result<RawFrame, SourceError>;
}

/// Pose queries.
pub trait PoseSource {
    /// `[x, y, z, roll, pitch, yaw]` of `frame_name` in `reference`.
    fn position(
        &mut self,
        frame_name: &str,
        reference: ReferenceFrame,
        use_sensors: bool,
    ) -> Result<[f64; 6], SourceError>;

    fn joint_angle(&mut self, joint: Joint, use_sensors: bool) -> Result<f64, SourceError>;
}

/// Head actuation; blocks until the joints reach the target.
pub trait HeadActuator {
    fn move_head(&mut self, pitch: f64, yaw: f64) -> Result<(), SourceError>;
}

/// Marker-detection feed.
pub trait MarkerFeed {
    fn subscribe(&mut self, client: &str) -> Result<(), SourceError>;
    fn unsubscribe(&mut self, client: &str) -> Result<(), SourceError>;
    /// Latest detection payload; `null` or an empty array when nothing is seen.
    fn poll(&mut self) -> Result<serde_json::Value, SourceError>;
}

/// Make `camera` the active camera, waiting `settle` after a switch.
pub fn ensure_camera<S: FrameSource + ?Sized>(
    source: &mut S,
    camera: CameraId,
    settle: Duration,
) -> Result<(), SourceError> {
    if source.active_camera()? != camera {
        log::debug!("switching active camera to {camera:?}");
        source.set_active_camera(camera)?;
        if !settle.is_zero() {
            std::thread::sleep(settle);
        }
    }
    Ok(())
}

/// Acquire exactly one frame and validate it.
///
/// A short or malformed buffer is reported as [`SourceError::Frame`]; there
/// is no retry and no fallback to an earlier frame.
pub fn acquire_frame<S: FrameSource + ?Sized>(
    source: &mut S,
    request: &FrameRequest,
    settle: Duration,
) -> Result<Frame, SourceError> {
    ensure_camera(source, request.camera, settle)?;
    let raw = source.acquire(request)?;
    Frame::from_raw(
        raw.width,
        raw.height,
        raw.channels,
        request.color_space,
        raw.data,
    )
    .map_err(|err| {
        log::warn!("rejected frame from {:?}: {err}", request.camera);
        SourceError::Frame(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCamera {
        active: CameraId,
        switches: usize,
        next: RawFrame,
    }

    impl FrameSource for FakeCamera {
        fn active_camera(&mut self) -> Result<CameraId, SourceError> {
            Ok(self.active)
        }

        fn set_active_camera(&mut self, camera: CameraId) -> Result<(), SourceError> {
            self.active = camera;
            self.switches += 1;
            Ok(())
        }

        fn acquire(&mut self, _request: &FrameRequest) -> Result<RawFrame, SourceError> {
            Ok(self.next.clone())
        }
    }

    fn raw(width: usize, height: usize, len: usize) -> RawFrame {
        RawFrame {
            width,
            height,
            channels: 3,
            data: vec![0; len],
        }
    }

    #[test]
    fn switches_camera_only_when_needed() {
        let mut cam = FakeCamera {
            active: CameraId::Top,
            switches: 0,
            next: raw(4, 2, 24),
        };
        let request = FrameRequest::default();

        let frame = acquire_frame(&mut cam, &request, Duration::ZERO).expect("frame");
        assert_eq!((frame.width(), frame.height()), (4, 2));
        assert_eq!(frame.color_space(), ColorSpace::Hsv);
        assert_eq!(cam.switches, 1);

        acquire_frame(&mut cam, &request, Duration::ZERO).expect("frame");
        assert_eq!(cam.switches, 1);
    }

    #[test]
    fn short_buffer_surfaces_as_frame_error() {
        let mut cam = FakeCamera {
            active: CameraId::Bottom,
            switches: 0,
            next: raw(4, 2, 10),
        };
        let err = acquire_frame(&mut cam, &FrameRequest::default(), Duration::ZERO).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Frame(FrameError::BufferLength {
                expected: 24,
                got: 10
            })
        ));
    }

    #[test]
    fn names_match_pose_query_frames() {
        assert_eq!(CameraId::Bottom.frame_name(), "CameraBottom");
        assert_eq!(Joint::HeadYaw.name(), "HeadYaw");
        assert_eq!(Resolution::Vga.dimensions(), (640, 480));
        assert_eq!(ReferenceFrame::Robot as i32, 2);
    }
}
