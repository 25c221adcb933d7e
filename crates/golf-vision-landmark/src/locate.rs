//! One-shot landmark update: poll the feed once and place the marker.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use golf_vision_core::{
    ensure_camera, project_landmark, CameraId, CameraPose, FrameSource, Joint, LandmarkDescriptor,
    LandmarkPosition, MarkerFeed, PoseSource, ProjectionError, ReferenceFrame, SourceError,
    DEFAULT_MARKER_SIZE,
};

use crate::feed::{parse_payload, FeedError};

#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkLocatorParams {
    pub camera: CameraId,
    /// Physical marker side (m).
    pub marker_size: f64,
    pub client: String,
    /// Wait after switching the active camera.
    pub settle: Duration,
}

impl Default for LandmarkLocatorParams {
    fn default() -> Self {
        Self {
            camera: CameraId::Top,
            marker_size: DEFAULT_MARKER_SIZE,
            client: "landMark".to_string(),
            settle: Duration::from_secs(1),
        }
    }
}

/// Descriptor and robot-frame position from the same poll.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSighting {
    pub descriptor: LandmarkDescriptor,
    pub position: LandmarkPosition,
}

#[derive(Clone, Debug, Default)]
pub struct LandmarkLocator {
    params: LandmarkLocatorParams,
}

impl LandmarkLocator {
    pub fn new(params: LandmarkLocatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LandmarkLocatorParams {
        &self.params
    }

    /// Poll once; `None` when no marker is in view.
    pub fn locate<C, F, P>(
        &self,
        camera: &mut C,
        feed: &mut F,
        poses: &mut P,
    ) -> Result<Option<LandmarkSighting>, LocateError>
    where
        C: FrameSource + ?Sized,
        F: MarkerFeed + ?Sized,
        P: PoseSource + ?Sized,
    {
        let p = &self.params;
        ensure_camera(camera, p.camera, p.settle)?;

        feed.subscribe(&p.client)?;
        let polled = feed.poll();
        let released = feed.unsubscribe(&p.client);
        let payload = polled?;
        released?;

        let Some(angles) = parse_payload(&payload)? else {
            return Ok(None);
        };
        let head_yaw = poses.joint_angle(Joint::HeadYaw, true)?;
        let descriptor = LandmarkDescriptor {
            azimuth: angles.azimuth,
            elevation: angles.elevation,
            angular_size: angles.angular_size,
            head_relative_azimuth: angles.azimuth + head_yaw,
        };

        let pose = poses.position(p.camera.frame_name(), ReferenceFrame::Robot, true)?;
        let robot_to_camera = CameraPose::from_position(pose).isometry();
        let position = project_landmark(&descriptor, &robot_to_camera, p.marker_size)?;
        log::debug!(
            "landmark at ({:.3}, {:.3}) m, distance {:.3} m",
            position.dis_x,
            position.dis_y,
            position.distance
        );
        Ok(Some(LandmarkSighting {
            descriptor,
            position,
        }))
    }
}
