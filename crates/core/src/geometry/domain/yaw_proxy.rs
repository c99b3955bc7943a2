use super::geometry_error::GeometryError;
use super::{checked_point, ensure_cardinality, MIN_SPAN};
use crate::shared::constants::{LEFT_FACE_EDGE, NOSE_TIP, RIGHT_FACE_EDGE};
use crate::shared::landmark_set::LandmarkSet;

/// Nose tip offset from the midpoint of the cheek-level outline points,
/// relative to half the face width, clamped to [-1, 1]. Positive means the
/// nose moved toward the image-right outline point.
pub fn yaw_proxy(landmarks: &LandmarkSet) -> Result<f64, GeometryError> {
    ensure_cardinality(landmarks)?;

    let nose = checked_point(landmarks, NOSE_TIP)?;
    let left = checked_point(landmarks, LEFT_FACE_EDGE)?;
    let right = checked_point(landmarks, RIGHT_FACE_EDGE)?;

    let half_width = (right.x - left.x) / 2.0;
    if half_width.abs() < MIN_SPAN {
        return Err(GeometryError::Degenerate("face outline has no width"));
    }

    let mid_x = (left.x + right.x) / 2.0;
    Ok(((nose.x - mid_x) / half_width).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::FACE_MESH_LANDMARKS;
    use crate::shared::landmark_set::Point;
    use crate::shared::synthetic_face::SyntheticFace;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn face_with_nose(nose_x: f64) -> LandmarkSet {
        let mut points = vec![Point::new(0.5, 0.5); FACE_MESH_LANDMARKS];
        points[LEFT_FACE_EDGE] = Point::new(0.2, 0.5);
        points[RIGHT_FACE_EDGE] = Point::new(0.6, 0.5);
        points[NOSE_TIP] = Point::new(nose_x, 0.5);
        LandmarkSet::new(points)
    }

    #[test]
    fn test_frontal_is_zero() {
        let face = SyntheticFace::new().build();
        assert_relative_eq!(yaw_proxy(&face).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case::quarter_right(0.45, 0.25)]
    #[case::half_left(0.3, -0.5)]
    #[case::at_edge(0.6, 1.0)]
    fn test_offset_relative_to_half_width(#[case] nose_x: f64, #[case] expected: f64) {
        // Outline 0.2..0.6: midpoint 0.4, half width 0.2
        assert_relative_eq!(
            yaw_proxy(&face_with_nose(nose_x)).unwrap(),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_clamped_beyond_outline() {
        assert_relative_eq!(yaw_proxy(&face_with_nose(0.9)).unwrap(), 1.0);
        assert_relative_eq!(yaw_proxy(&face_with_nose(0.0)).unwrap(), -1.0);
    }

    #[test]
    fn test_zero_width_is_degenerate() {
        let set = LandmarkSet::new(vec![Point::new(0.5, 0.5); FACE_MESH_LANDMARKS]);
        assert!(matches!(
            yaw_proxy(&set).unwrap_err(),
            GeometryError::Degenerate(_)
        ));
    }

    #[test]
    fn test_empty_set_is_insufficient() {
        let err = yaw_proxy(&LandmarkSet::new(Vec::new())).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InsufficientLandmarks { actual: 0, .. }
        ));
    }
}
