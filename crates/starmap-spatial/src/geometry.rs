//! Plane geometry shared by the tessellation, viewport and picker.
//!
//! World coordinates are the galaxy's integer star positions widened to
//! `f64`. Screen coordinates are pixels relative to the canvas' top-left.

use starmap_types::Star;

/// A point in world or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (down is positive).
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// A point at `(x, y)`.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// A star's world position.
    pub fn of_star(star: &Star) -> Self {
        Self::new(f64::from(star.x), f64::from(star.y))
    }

    /// Component-wise sum.
    pub const fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    pub const fn minus(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Both components multiplied by `k`.
    pub const fn scaled(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    /// Dot product.
    pub const fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean distance.
    pub const fn distance_sq(self, other: Self) -> f64 {
        let d = self.minus(other);
        d.dot(d)
    }

    /// Euclidean distance.
    pub fn distance(self, other: Self) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Whether both coordinates agree to within `f64::EPSILON`.
    pub fn coincides(self, other: Self) -> bool {
        (self.x - other.x).abs() < f64::EPSILON && (self.y - other.y).abs() < f64::EPSILON
    }

    /// Nearest integer coordinates, saturating at the `i32` range.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded(self) -> (i32, i32) {
        let round = |v: f64| v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
        (round(self.x), round(self.y))
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Bounds {
    /// Smallest rectangle containing every point, or `None` for no points.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Self>, p| {
            Some(match acc {
                None => Self {
                    min_x: p.x,
                    min_y: p.y,
                    max_x: p.x,
                    max_y: p.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    min_y: b.min_y.min(p.y),
                    max_x: b.max_x.max(p.x),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    /// Bounding box of the stars' positions.
    pub fn of_stars(stars: &[Star]) -> Option<Self> {
        Self::enclosing(stars.iter().map(Point::of_star))
    }

    /// The rectangle grown by `margin` on every side.
    pub const fn expanded(self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Horizontal extent.
    pub const fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    pub const fn height(self) -> f64 {
        self.max_y - self.min_y
    }

    /// Top-left corner.
    pub const fn min(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Whether `p` lies inside or on the edge.
    pub fn contains(self, p: Point) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }

    /// Corners clockwise from the top-left (screen orientation).
    pub const fn corners(self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Distance from `p` to the segment `a`-`b`, measured to the closest point
/// on the segment (the projection is clamped to the endpoints). A
/// zero-length segment degenerates to the distance to `a`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.minus(a);
    let len_sq = ab.dot(ab);
    if len_sq <= 0.0 {
        return p.distance(a);
    }
    let t = (p.minus(a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a.plus(ab.scaled(t)))
}

/// Even-odd ray casting test. Points exactly on an edge may land on either
/// side; polygons with fewer than three vertices contain nothing.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut prev = polygon.last().copied().unwrap_or_default();
    for &cur in polygon {
        let crosses = (cur.y > p.y) != (prev.y > p.y);
        if crosses {
            let x_at = (prev.x - cur.x) * (p.y - cur.y) / (prev.y - cur.y) + cur.x;
            if p.x < x_at {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance_is_clamped_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Point::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Point::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Point::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn rounding_saturates() {
        assert_eq!(Point::new(12.5, -3.4).rounded(), (13, -3));
        assert_eq!(Point::new(1e12, -1e12).rounded(), (i32::MAX, i32::MIN));
    }

    #[test]
    fn polygon_containment() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(5.0, -1.0), &square));
        assert!(!point_in_polygon(Point::new(1.0, 1.0), &square[..2]));
    }

    #[test]
    fn bounds_of_stars() {
        let stars = [Star::at(-10, 5), Star::at(30, -20), Star::at(0, 0)];
        let b = Bounds::of_stars(&stars).unwrap().expanded(50.0);
        assert_eq!(b.min(), Point::new(-60.0, -70.0));
        assert_eq!(b.width(), 140.0);
        assert_eq!(b.height(), 125.0);
        assert!(Bounds::of_stars(&[]).is_none());
    }
}
