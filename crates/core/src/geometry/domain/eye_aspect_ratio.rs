use super::geometry_error::GeometryError;
use super::{checked_point, ensure_cardinality, MIN_SPAN};
use crate::shared::constants::{LEFT_EYE, RIGHT_EYE};
use crate::shared::landmark_set::LandmarkSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    fn contour(self) -> [usize; 6] {
        match self {
            Eye::Left => LEFT_EYE,
            Eye::Right => RIGHT_EYE,
        }
    }
}

/// `EAR = (|p2 - p6| + |p3 - p5|) / (2 * |p1 - p4|)`
///
/// p1/p4 are the eye corners, p2/p3 the upper lid and p6/p5 the matching
/// lower lid. Open eyes sit around 0.25..0.35.
pub fn eye_aspect_ratio(landmarks: &LandmarkSet, eye: Eye) -> Result<f64, GeometryError> {
    ensure_cardinality(landmarks)?;

    let [i1, i2, i3, i4, i5, i6] = eye.contour();
    let p1 = checked_point(landmarks, i1)?;
    let p2 = checked_point(landmarks, i2)?;
    let p3 = checked_point(landmarks, i3)?;
    let p4 = checked_point(landmarks, i4)?;
    let p5 = checked_point(landmarks, i5)?;
    let p6 = checked_point(landmarks, i6)?;

    let horizontal = p1.distance(&p4);
    if horizontal < MIN_SPAN {
        return Err(GeometryError::Degenerate("eye corners coincide"));
    }

    Ok((p2.distance(&p6) + p3.distance(&p5)) / (2.0 * horizontal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::FACE_MESH_LANDMARKS;
    use crate::shared::landmark_set::Point;
    use crate::shared::synthetic_face::SyntheticFace;
    use approx::assert_relative_eq;

    #[test]
    fn test_open_eye() {
        let face = SyntheticFace::new().with_ear(0.31).build();
        assert_relative_eq!(
            eye_aspect_ratio(&face, Eye::Left).unwrap(),
            0.31,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_closed_eye_is_zero() {
        let face = SyntheticFace::new().with_ear(0.0).build();
        assert_relative_eq!(eye_aspect_ratio(&face, Eye::Right).unwrap(), 0.0);
    }

    #[test]
    fn test_known_geometry() {
        // Corners 0.1 apart, lid pairs 0.02 and 0.04 apart: (0.02 + 0.04) / 0.2 = 0.3
        let mut points = vec![Point::new(0.5, 0.5); FACE_MESH_LANDMARKS];
        let [p1, p2, p3, p4, p5, p6] = LEFT_EYE;
        points[p1] = Point::new(0.30, 0.40);
        points[p4] = Point::new(0.40, 0.40);
        points[p2] = Point::new(0.33, 0.39);
        points[p6] = Point::new(0.33, 0.41);
        points[p3] = Point::new(0.37, 0.38);
        points[p5] = Point::new(0.37, 0.42);
        let set = LandmarkSet::new(points);
        assert_relative_eq!(
            eye_aspect_ratio(&set, Eye::Left).unwrap(),
            0.3,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_truncated_set_is_insufficient() {
        let set = LandmarkSet::new(vec![Point::new(0.5, 0.5); 100]);
        let err = eye_aspect_ratio(&set, Eye::Left).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InsufficientLandmarks { actual: 100, .. }
        ));
    }

    #[test]
    fn test_coincident_corners_are_degenerate() {
        let set = LandmarkSet::new(vec![Point::new(0.5, 0.5); FACE_MESH_LANDMARKS]);
        let err = eye_aspect_ratio(&set, Eye::Left).unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate(_)));
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        let mut points = SyntheticFace::new().build().points().to_vec();
        points[RIGHT_EYE[1]] = Point::new(f64::NAN, 0.4);
        let set = LandmarkSet::new(points);
        let err = eye_aspect_ratio(&set, Eye::Right).unwrap_err();
        assert_eq!(err, GeometryError::NonFinite { index: RIGHT_EYE[1] });
    }
}
