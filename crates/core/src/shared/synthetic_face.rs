use crate::shared::constants::{
    FACE_MESH_LANDMARKS, LEFT_EYE, LEFT_FACE_EDGE, NOSE_TIP, RIGHT_EYE, RIGHT_FACE_EDGE,
};
use crate::shared::landmark_set::{LandmarkSet, Point};

const EYE_WIDTH: f64 = 0.08;
const EYE_Y: f64 = 0.42;
const LEFT_EYE_X: f64 = 0.40;
const RIGHT_EYE_X: f64 = 0.60;
const FACE_LEFT_X: f64 = 0.30;
const FACE_RIGHT_X: f64 = 0.70;
const CHEEK_Y: f64 = 0.55;

/// Eyes-open EAR of a relaxed, frontal synthetic face.
pub const OPEN_EAR: f64 = 0.30;

/// Builds Face Mesh shaped landmark sets whose extracted EAR and yaw proxy
/// equal the requested values.
///
/// Used to drive sessions without a landmark model: replay demos and tests.
/// Every landmark not involved in a measurement sits at the face centre.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticFace {
    left_ear: f64,
    right_ear: f64,
    yaw: f64,
}

impl SyntheticFace {
    pub fn new() -> Self {
        Self {
            left_ear: OPEN_EAR,
            right_ear: OPEN_EAR,
            yaw: 0.0,
        }
    }

    pub fn with_ear(self, ear: f64) -> Self {
        self.with_eyes(ear, ear)
    }

    pub fn with_eyes(mut self, left_ear: f64, right_ear: f64) -> Self {
        self.left_ear = left_ear;
        self.right_ear = right_ear;
        self
    }

    /// Yaw proxy in [-1, 1]; positive moves the nose toward the image-right edge.
    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn build(&self) -> LandmarkSet {
        let mut points = vec![Point::new(0.5, CHEEK_Y); FACE_MESH_LANDMARKS];

        place_eye(&mut points, &LEFT_EYE, LEFT_EYE_X, self.left_ear);
        place_eye(&mut points, &RIGHT_EYE, RIGHT_EYE_X, self.right_ear);

        let half_width = (FACE_RIGHT_X - FACE_LEFT_X) / 2.0;
        let mid_x = (FACE_LEFT_X + FACE_RIGHT_X) / 2.0;
        points[LEFT_FACE_EDGE] = Point::new(FACE_LEFT_X, CHEEK_Y);
        points[RIGHT_FACE_EDGE] = Point::new(FACE_RIGHT_X, CHEEK_Y);
        points[NOSE_TIP] = Point::new(mid_x + self.yaw * half_width, CHEEK_Y);

        LandmarkSet::new(points)
    }
}

impl Default for SyntheticFace {
    fn default() -> Self {
        Self::new()
    }
}

/// Corners on the horizontal axis, two vertical lid pairs at a quarter width
/// from the centre. EAR then reduces to `opening / EYE_WIDTH`.
fn place_eye(points: &mut [Point], contour: &[usize; 6], cx: f64, ear: f64) {
    let [p1, p2, p3, p4, p5, p6] = *contour;
    let half_open = ear * EYE_WIDTH / 2.0;
    let quarter = EYE_WIDTH / 4.0;

    points[p1] = Point::new(cx - EYE_WIDTH / 2.0, EYE_Y);
    points[p4] = Point::new(cx + EYE_WIDTH / 2.0, EYE_Y);
    points[p2] = Point::new(cx - quarter, EYE_Y - half_open);
    points[p6] = Point::new(cx - quarter, EYE_Y + half_open);
    points[p3] = Point::new(cx + quarter, EYE_Y - half_open);
    points[p5] = Point::new(cx + quarter, EYE_Y + half_open);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::domain::face_signals::extract_signals;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::open(0.30, 0.0)]
    #[case::closed_turned_left(0.05, -0.8)]
    #[case::half_turned_right(0.19, 0.6)]
    fn test_extracted_signals_match_requested(#[case] ear: f64, #[case] yaw: f64) {
        let face = SyntheticFace::new().with_ear(ear).with_yaw(yaw).build();
        let signals = extract_signals(&face).unwrap();
        assert_relative_eq!(signals.left_ear, ear, epsilon = 1e-9);
        assert_relative_eq!(signals.right_ear, ear, epsilon = 1e-9);
        assert_relative_eq!(signals.yaw, yaw, epsilon = 1e-9);
    }

    #[test]
    fn test_eyes_independent() {
        let face = SyntheticFace::new().with_eyes(0.12, 0.28).build();
        let signals = extract_signals(&face).unwrap();
        assert_relative_eq!(signals.left_ear, 0.12, epsilon = 1e-9);
        assert_relative_eq!(signals.right_ear, 0.28, epsilon = 1e-9);
    }

    #[test]
    fn test_full_mesh_cardinality() {
        assert_eq!(SyntheticFace::default().build().len(), FACE_MESH_LANDMARKS);
    }
}
