/// Integer pixel coordinate.
///
/// Also used for Hough accumulator cells, where `x` is theta in degrees and `y`
/// is the offset distance index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Chebyshev neighbors (including diagonals) are at distance 1.
    pub fn is_adjacent8(self, other: Self) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }
}

impl From<(usize, usize)> for Point2i {
    fn from((x, y): (usize, usize)) -> Self {
        Self {
            x: x as i32,
            y: y as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment {
    pub a: Point2i,
    pub b: Point2i,
}

impl LineSegment {
    pub const fn new(a: Point2i, b: Point2i) -> Self {
        Self { a, b }
    }

    /// Straight-line Euclidean distance between the endpoints.
    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::{LineSegment, Point2i};

    #[test]
    fn distance_and_length() {
        let a = Point2i::new(1, 2);
        let b = Point2i::new(4, 6);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert!((LineSegment::new(a, b).length() - 5.0).abs() < 1e-6);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn adjacency_is_eight_connected() {
        let p = Point2i::new(5, 5);
        assert!(p.is_adjacent8(Point2i::new(6, 6)));
        assert!(p.is_adjacent8(Point2i::new(5, 4)));
        assert!(!p.is_adjacent8(p));
        assert!(!p.is_adjacent8(Point2i::new(7, 5)));
        assert_eq!(Point2i::from((3usize, 9usize)), Point2i::new(3, 9));
    }
}
