use serde::{Deserialize, Serialize};

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Landmark points for one face, in the order the landmark model emits them.
/// The dlib 68-point model follows the iBUG 300-W layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub points: Vec<Point>,
}

impl Shape {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn get(&self, idx: usize) -> Option<Point> {
        self.points.get(idx).copied()
    }
}

impl FromIterator<Point> for Shape {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_scaling() {
        let scaled = Point::new(1.0, 2.0) * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);
    }

    #[test]
    fn distance_is_euclidean_and_symmetric() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn midpoint_and_finiteness() {
        let m = Point::new(10.0, 20.0).midpoint(&Point::new(20.0, 40.0));
        assert_eq!(m, Point::new(15.0, 30.0));
        assert!(m.is_finite());
        assert!(!Point::new(f32::NAN, 0.0).is_finite());
    }

    #[test]
    fn shape_lookup() {
        let shape: Shape = (0..3).map(|i| Point::new(i as f32, 0.0)).collect();
        assert_eq!(shape.points.len(), 3);
        assert_eq!(shape.get(2), Some(Point::new(2.0, 0.0)));
        assert_eq!(shape.get(3), None);
    }
}
