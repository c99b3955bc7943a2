#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Landmarks of the first detected face in one frame.
///
/// Coordinates are normalized to the frame and indexed by the Face Mesh
/// numbering. Depth is dropped at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Build from `[x, y]` pairs.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Self {
        Self::new(pairs.iter().map(|[x, y]| Point::new(*x, *y)).collect())
    }

    /// Build from `[x, y, z]` triples, discarding depth.
    pub fn from_triples(triples: &[[f64; 3]]) -> Self {
        Self::new(triples.iter().map(|[x, y, _]| Point::new(*x, *y)).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}
