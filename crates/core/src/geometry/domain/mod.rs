pub mod eye_aspect_ratio;
pub mod face_signals;
pub mod geometry_error;
pub mod yaw_proxy;

use crate::shared::constants::REQUIRED_LANDMARKS;
use crate::shared::landmark_set::{LandmarkSet, Point};
use geometry_error::GeometryError;

/// Below this span (normalized units) a ratio denominator is treated as zero.
const MIN_SPAN: f64 = 1e-6;

fn ensure_cardinality(landmarks: &LandmarkSet) -> Result<(), GeometryError> {
    if landmarks.len() < REQUIRED_LANDMARKS {
        return Err(GeometryError::InsufficientLandmarks {
            required: REQUIRED_LANDMARKS,
            actual: landmarks.len(),
        });
    }
    Ok(())
}

fn checked_point(landmarks: &LandmarkSet, index: usize) -> Result<Point, GeometryError> {
    let point = landmarks
        .get(index)
        .ok_or(GeometryError::InsufficientLandmarks {
            required: index + 1,
            actual: landmarks.len(),
        })?;
    if !point.is_finite() {
        return Err(GeometryError::NonFinite { index });
    }
    Ok(point)
}
