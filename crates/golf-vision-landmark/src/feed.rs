//! Marker-detection payload parsing.
//!
//! The feed reports
//! `[timestamp, [[shape, id], ...], camera_pose_torso, camera_pose_robot, camera_name]`
//! where `shape = [1, alpha, beta, size_x, size_y, heading]`. Only the first
//! marker's `alpha` (azimuth), `beta` (elevation) and `size_x` (angular
//! size) are used.

use serde_json::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("malformed marker payload: {0}")]
    Malformed(String),
}

/// Camera-relative angles of one marker, radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerAngles {
    pub azimuth: f64,
    pub elevation: f64,
    pub angular_size: f64,
}

/// Whether the payload carries a detection (an array with at least two elements).
pub fn has_detection(payload: &Value) -> bool {
    payload.as_array().is_some_and(|a| a.len() >= 2)
}

/// First marker of a payload; `Ok(None)` when nothing was detected.
pub fn parse_payload(payload: &Value) -> Result<Option<MarkerAngles>, FeedError> {
    if !has_detection(payload) {
        return Ok(None);
    }
    let shape = payload
        .get(1)
        .and_then(|marks| marks.get(0))
        .and_then(|mark| mark.get(0))
        .ok_or_else(|| FeedError::Malformed("missing first marker shape".to_string()))?;

    let field = |i: usize, name: &str| -> Result<f64, FeedError> {
        shape
            .get(i)
            .and_then(Value::as_f64)
            .ok_or_else(|| FeedError::Malformed(format!("shape field {name} is not a number")))
    };
    Ok(Some(MarkerAngles {
        azimuth: field(1, "alpha")?,
        elevation: field(2, "beta")?,
        angular_size: field(3, "size_x")?,
    }))
}
