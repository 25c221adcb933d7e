//! Head sweep until the marker feed reports a landmark.
//!
//! The head is reset to `(0, 0)`, then yawed through
//! `start_deg, start_deg + step_deg, ...` up to `end_deg`. At each step the
//! head is moved, the search waits for the image to settle and polls the
//! feed once. The first detection ends the sweep. A sweep always runs to
//! one of its terminal states and the feed is unsubscribed on every exit.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use golf_vision_core::{HeadActuator, Joint, LandmarkDescriptor, MarkerFeed, PoseSource, SourceError};

use crate::feed::{parse_payload, FeedError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Slack on the last step so float accumulation cannot drop it.
const YAW_EPS_DEG: f64 = 1e-9;

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("sweep step must be positive, got {0} deg")]
    InvalidStep(f64),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// States of the sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchState {
    Sweeping { yaw_deg: f64 },
    Found(LandmarkDescriptor),
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkSearchParams {
    pub start_deg: f64,
    pub end_deg: f64,
    pub step_deg: f64,
    /// Wait after each head move before polling.
    pub settle: Duration,
    /// Feed subscription name.
    pub client: String,
}

impl Default for LandmarkSearchParams {
    fn default() -> Self {
        Self {
            start_deg: -2.0,
            end_deg: 2.0,
            step_deg: 0.8,
            settle: Duration::from_secs(1),
            client: "landMark".to_string(),
        }
    }
}

impl LandmarkSearchParams {
    /// Yaw targets of one full sweep, degrees.
    pub fn yaw_steps(&self) -> Vec<f64> {
        if !(self.step_deg > 0.0) {
            return Vec::new();
        }
        (0..)
            .map(|k| self.start_deg + k as f64 * self.step_deg)
            .take_while(|&yaw| yaw <= self.end_deg + YAW_EPS_DEG)
            .collect()
    }
}

/// Terminal state of a sweep and the yaw targets it visited.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub state: SearchState,
    pub visited_deg: Vec<f64>,
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        matches!(self.state, SearchState::Found(_))
    }

    pub fn descriptor(&self) -> Option<LandmarkDescriptor> {
        match self.state {
            SearchState::Found(d) => Some(d),
            _ => None,
        }
    }

    /// Descriptor, or all zeros when the sweep found nothing.
    pub fn descriptor_or_zero(&self) -> LandmarkDescriptor {
        self.descriptor().unwrap_or(LandmarkDescriptor::ZERO)
    }
}

/// Landmark search controller.
#[derive(Clone, Debug, Default)]
pub struct LandmarkSearch {
    params: LandmarkSearchParams,
}

impl LandmarkSearch {
    pub fn new(params: LandmarkSearchParams) -> Result<Self, SearchError> {
        if !(params.step_deg > 0.0) {
            return Err(SearchError::InvalidStep(params.step_deg));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &LandmarkSearchParams {
        &self.params
    }

    /// Run one full sweep.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn run<A, F, P>(
        &self,
        actuator: &mut A,
        feed: &mut F,
        poses: &mut P,
    ) -> Result<SearchOutcome, SearchError>
    where
        A: HeadActuator + ?Sized,
        F: MarkerFeed + ?Sized,
        P: PoseSource + ?Sized,
    {
        actuator.move_head(0.0, 0.0)?;
        feed.subscribe(&self.params.client)?;

        let swept = self.sweep(actuator, feed, poses);
        let released = feed.unsubscribe(&self.params.client);
        match (swept, released) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(unsub)) => {
                log::warn!("feed unsubscribe failed after sweep error: {unsub}");
                Err(err)
            }
        }
    }

    fn sweep<A, F, P>(
        &self,
        actuator: &mut A,
        feed: &mut F,
        poses: &mut P,
    ) -> Result<SearchOutcome, SearchError>
    where
        A: HeadActuator + ?Sized,
        F: MarkerFeed + ?Sized,
        P: PoseSource + ?Sized,
    {
        let p = &self.params;
        let mut steps = p.yaw_steps().into_iter();
        let mut visited_deg = Vec::new();
        let mut state = next_step(&mut steps);

        while let SearchState::Sweeping { yaw_deg } = state {
            actuator.move_head(0.0, yaw_deg.to_radians())?;
            if !p.settle.is_zero() {
                std::thread::sleep(p.settle);
            }
            visited_deg.push(yaw_deg);

            let payload = feed.poll()?;
            state = match parse_payload(&payload)? {
                Some(angles) => {
                    let head_yaw = poses.joint_angle(Joint::HeadYaw, true)?;
                    log::debug!("landmark seen at sweep yaw {yaw_deg:.1} deg");
                    SearchState::Found(LandmarkDescriptor {
                        azimuth: angles.azimuth,
                        elevation: angles.elevation,
                        angular_size: angles.angular_size,
                        head_relative_azimuth: angles.azimuth + head_yaw,
                    })
                }
                None => next_step(&mut steps),
            };
        }

        if state == SearchState::NotFound {
            log::debug!("landmark sweep exhausted after {} steps", visited_deg.len());
        }
        Ok(SearchOutcome { state, visited_deg })
    }
}

fn next_step(steps: &mut impl Iterator<Item = f64>) -> SearchState {
    steps
        .next()
        .map_or(SearchState::NotFound, |yaw_deg| SearchState::Sweeping { yaw_deg })
}
