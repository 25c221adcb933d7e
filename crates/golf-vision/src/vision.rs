use serde::{Deserialize, Serialize};

use golf_vision_ball::{BallDetector, BallObservation, BallSighting};
use golf_vision_core::{
    acquire_frame, project_ball, stick_bearing, BallPosition, BallProjectionInput, CameraPose,
    Frame, FrameSource, HeadActuator, HeadPose, Joint, MarkerFeed, PixelRect, PoseSource,
    ProjectionError, ReferenceFrame, SourceError, Stance,
};
use golf_vision_landmark::{
    LandmarkLocator, LandmarkSearch, LandmarkSighting, LocateError, SearchError, SearchOutcome,
};
use golf_vision_stick::{StickDetector, StickError, StickSighting};

use crate::VisionConfig;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Pose frame whose yaw corrects the stick bearing.
const HEAD_FRAME: &str = "Head";

/// Errors produced by a detection cycle.
#[derive(thiserror::Error, Debug)]
pub enum VisionError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Stick(#[from] StickError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Locate(#[from] LocateError),
}

/// External collaborators the pipeline runs against.
#[derive(Debug)]
pub struct Sources<F, P, H, M> {
    pub frames: F,
    pub poses: P,
    pub head: H,
    pub markers: M,
}

/// Result of one ball cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallReport {
    pub sighting: Option<BallSighting>,
}

impl BallReport {
    pub fn found(&self) -> bool {
        self.sighting.is_some()
    }

    /// Observation, or all zeros (radius 0) when nothing was found.
    pub fn observation_or_zero(&self) -> BallObservation {
        self.sighting
            .map(|s| s.observation)
            .unwrap_or(BallObservation::ZERO)
    }

    /// Position, or all zeros when nothing was found.
    pub fn position_or_zero(&self) -> BallPosition {
        self.sighting
            .map(|s| s.position)
            .unwrap_or(BallPosition::ZERO)
    }
}

/// Result of one stick cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StickReport {
    pub sighting: Option<StickSighting>,
}

impl StickReport {
    pub fn found(&self) -> bool {
        self.sighting.is_some()
    }

    /// Bounding box, or an empty rectangle when nothing was found.
    pub fn rect_or_empty(&self) -> PixelRect {
        self.sighting
            .map(|s| s.observation.rect)
            .unwrap_or_default()
    }

    /// Bearing, or `0.0` when nothing was found.
    pub fn angle_or_zero(&self) -> f64 {
        self.sighting.map_or(0.0, |s| s.angle)
    }
}

/// The perception pipeline composed over its collaborators.
///
/// Every cycle takes `&mut self`: the camera is a single resource and
/// cycles never overlap.
pub struct GolfVision<F, P, H, M> {
    sources: Sources<F, P, H, M>,
    config: VisionConfig,
    ball: BallDetector,
    stick: StickDetector,
    search: LandmarkSearch,
    locator: LandmarkLocator,
}

impl<F, P, H, M> GolfVision<F, P, H, M>
where
    F: FrameSource,
    P: PoseSource,
    H: HeadActuator,
    M: MarkerFeed,
{
    /// Build the detectors from `config`; invalid parameters are rejected here.
    pub fn new(sources: Sources<F, P, H, M>, config: VisionConfig) -> Result<Self, VisionError> {
        let stick = StickDetector::new(config.stick.clone())?;
        let search = LandmarkSearch::new(config.landmark_search.clone())?;
        Ok(Self {
            ball: BallDetector::new(config.ball.clone()),
            locator: LandmarkLocator::new(config.landmark_locator.clone()),
            stick,
            search,
            sources,
            config,
        })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    pub fn sources(&self) -> &Sources<F, P, H, M> {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut Sources<F, P, H, M> {
        &mut self.sources
    }

    pub fn into_sources(self) -> Sources<F, P, H, M> {
        self.sources
    }

    fn acquire(&mut self) -> Result<Frame, VisionError> {
        Ok(acquire_frame(
            &mut self.sources.frames,
            &self.config.frame,
            self.config.camera_settle,
        )?)
    }

    /// Acquire a frame, detect the ball and place it in the robot frame.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn ball_cycle(&mut self, stance: Stance) -> Result<BallReport, VisionError> {
        let frame = self.acquire()?;
        let Some(observation) = self.ball.detect(&frame) else {
            return Ok(BallReport { sighting: None });
        };

        let poses = &mut self.sources.poses;
        let camera_frame = self.config.frame.camera.frame_name();
        let camera_pose =
            CameraPose::from_position(poses.position(camera_frame, ReferenceFrame::Robot, true)?);
        let head = HeadPose {
            pitch: poses.joint_angle(Joint::HeadPitch, true)?,
            yaw: poses.joint_angle(Joint::HeadYaw, true)?,
        };

        let position = project_ball(&BallProjectionInput {
            center_x: f64::from(observation.center_x),
            center_y: f64::from(observation.center_y),
            frame_width: frame.width(),
            frame_height: frame.height(),
            camera: self.config.camera,
            camera_pose,
            head,
            stance,
            ball_radius: self.ball.params().ball_radius,
        })?;
        Ok(BallReport {
            sighting: Some(BallSighting {
                observation,
                position,
            }),
        })
    }

    /// [`Self::ball_cycle`] with the stance given by name.
    ///
    /// An unknown stance fails before any frame is acquired.
    pub fn ball_cycle_named(&mut self, stance: &str) -> Result<BallReport, VisionError> {
        let stance: Stance = stance.parse().inspect_err(|err| log::warn!("{err}"))?;
        self.ball_cycle(stance)
    }

    /// Acquire a frame, detect the stick and compute its bearing.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn stick_cycle(&mut self) -> Result<StickReport, VisionError> {
        let frame = self.acquire()?;
        let Some(observation) = self.stick.detect(&frame) else {
            return Ok(StickReport { sighting: None });
        };

        let head = self
            .sources
            .poses
            .position(HEAD_FRAME, ReferenceFrame::Robot, true)?;
        let angle = stick_bearing(&observation.rect, frame.width(), &self.config.camera, head[5]);
        Ok(StickReport {
            sighting: Some(StickSighting { observation, angle }),
        })
    }

    /// Sweep the head until a landmark is reported.
    pub fn search_landmark(&mut self) -> Result<SearchOutcome, VisionError> {
        let s = &mut self.sources;
        Ok(self.search.run(&mut s.head, &mut s.markers, &mut s.poses)?)
    }

    /// Poll the marker feed once and place the landmark.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn locate_landmark(&mut self) -> Result<Option<LandmarkSighting>, VisionError> {
        let s = &mut self.sources;
        Ok(self
            .locator
            .locate(&mut s.frames, &mut s.markers, &mut s.poses)?)
    }
}
