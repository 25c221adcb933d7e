//! JSON configuration for the whole pipeline.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use golf_vision_ball::BallDetectorParams;
use golf_vision_core::{CameraModel, FrameRequest};
use golf_vision_landmark::{LandmarkLocatorParams, LandmarkSearchParams};
use golf_vision_stick::StickDetectorParams;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_camera_settle() -> Duration {
    Duration::from_secs(1)
}

/// Every tunable of the pipeline; missing sections take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Acquisition settings for the ball and stick cycles.
    #[serde(default)]
    pub frame: FrameRequest,
    /// Wait after switching the active camera.
    #[serde(default = "default_camera_settle")]
    pub camera_settle: Duration,
    #[serde(default)]
    pub camera: CameraModel,
    #[serde(default)]
    pub ball: BallDetectorParams,
    #[serde(default)]
    pub stick: StickDetectorParams,
    #[serde(default)]
    pub landmark_search: LandmarkSearchParams,
    #[serde(default)]
    pub landmark_locator: LandmarkLocatorParams,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            frame: FrameRequest::default(),
            camera_settle: default_camera_settle(),
            camera: CameraModel::default(),
            ball: BallDetectorParams::default(),
            stick: StickDetectorParams::default(),
            landmark_search: LandmarkSearchParams::default(),
            landmark_locator: LandmarkLocatorParams::default(),
        }
    }
}

impl VisionConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Same config with every settle delay set to zero.
    pub fn without_settle(mut self) -> Self {
        self.camera_settle = Duration::ZERO;
        self.landmark_search.settle = Duration::ZERO;
        self.landmark_locator.settle = Duration::ZERO;
        self
    }
}
