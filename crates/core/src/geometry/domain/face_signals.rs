use super::eye_aspect_ratio::{eye_aspect_ratio, Eye};
use super::geometry_error::GeometryError;
use super::yaw_proxy::yaw_proxy;
use crate::shared::landmark_set::LandmarkSet;

/// Raw (unsmoothed) signal samples extracted from one landmark set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSignals {
    pub left_ear: f64,
    pub right_ear: f64,
    pub yaw: f64,
}

/// Run every extractor; the first failure wins.
pub fn extract_signals(landmarks: &LandmarkSet) -> Result<RawSignals, GeometryError> {
    Ok(RawSignals {
        left_ear: eye_aspect_ratio(landmarks, Eye::Left)?,
        right_ear: eye_aspect_ratio(landmarks, Eye::Right)?,
        yaw: yaw_proxy(landmarks)?,
    })
}
