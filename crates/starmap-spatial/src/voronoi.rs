//! Bounded Voronoi tessellation over star positions.
//!
//! Each star's territory is the set of points closer to it than to any other
//! star, clipped to the stars' bounding box grown by a buffer. Cells are
//! built by cutting that box with the perpendicular bisector towards every
//! neighbour, nearest first, stopping once the remaining neighbours are too
//! far away to cut anything.
//!
//! Stars sharing a position share one cell: the lowest index owns it and
//! the others have none.

use starmap_types::Star;
use tracing::debug;

use crate::geometry::{Bounds, Point, point_in_polygon};

/// Territory polygons, one slot per star index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tessellation {
    bounds: Option<Bounds>,
    cells: Vec<Option<Vec<Point>>>,
}

impl Tessellation {
    /// Tessellate `sites`, bounded by their bounding box grown by `buffer`.
    pub fn build(sites: &[Point], buffer: f64) -> Self {
        let Some(bounds) = Bounds::enclosing(sites.iter().copied()).map(|b| b.expanded(buffer))
        else {
            return Self::default();
        };
        let cells: Vec<_> = (0..sites.len())
            .map(|i| cell_of(i, sites, bounds))
            .collect();
        debug!(
            sites = sites.len(),
            cells = cells.iter().filter(|c| c.is_some()).count(),
            "tessellation rebuilt"
        );
        Self {
            bounds: Some(bounds),
            cells,
        }
    }

    /// Tessellate the stars' positions.
    pub fn from_stars(stars: &[Star], buffer: f64) -> Self {
        let sites: Vec<Point> = stars.iter().map(Point::of_star).collect();
        Self::build(&sites, buffer)
    }

    /// The clipping rectangle, `None` when there are no stars.
    pub const fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Number of star slots (including stars without a cell).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether there are no stars.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The territory polygon of star `index`, or `None` for an unknown
    /// index or a star hidden behind an earlier one at the same position.
    pub fn cell_polygon(&self, index: usize) -> Option<&[Point]> {
        self.cells.get(index)?.as_deref()
    }

    /// Every existing cell with its star index.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &[Point])> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| Some((i, c.as_deref()?)))
    }

    /// The star whose territory contains `p`.
    pub fn cell_at(&self, p: Point) -> Option<usize> {
        if !self.bounds.is_some_and(|b| b.contains(p)) {
            return None;
        }
        self.cells()
            .find(|(_, poly)| point_in_polygon(p, poly))
            .map(|(i, _)| i)
    }
}

fn cell_of(index: usize, sites: &[Point], bounds: Bounds) -> Option<Vec<Point>> {
    let site = *sites.get(index)?;
    if sites.iter().take(index).any(|s| s.coincides(site)) {
        return None;
    }

    let mut neighbours: Vec<(f64, Point)> = sites
        .iter()
        .filter(|s| !s.coincides(site))
        .map(|s| (site.distance_sq(*s), *s))
        .collect();
    neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut polygon = bounds.corners().to_vec();
    for (dist_sq, other) in neighbours {
        let reach_sq = polygon
            .iter()
            .map(|v| site.distance_sq(*v))
            .fold(0.0_f64, f64::max);
        // The bisector lies at half the neighbour distance.
        if dist_sq > 4.0 * reach_sq {
            break;
        }
        polygon = clip_towards(&polygon, site, other);
        if polygon.len() < 3 {
            return None;
        }
    }
    Some(polygon)
}

/// Keep the part of `polygon` on `site`'s side of the bisector with `other`.
fn clip_towards(polygon: &[Point], site: Point, other: Point) -> Vec<Point> {
    let normal = other.minus(site);
    let mid = site.plus(other).scaled(0.5);
    let side = |q: Point| q.minus(mid).dot(normal);

    let mut out = Vec::with_capacity(polygon.len().saturating_add(1));
    let Some(&last) = polygon.last() else {
        return out;
    };
    let mut prev = last;
    let mut prev_side = side(prev);
    for &cur in polygon {
        let cur_side = side(cur);
        if cur_side <= 0.0 {
            if prev_side > 0.0 {
                out.push(crossing(prev, cur, prev_side, cur_side));
            }
            out.push(cur);
        } else if prev_side <= 0.0 {
            out.push(crossing(prev, cur, prev_side, cur_side));
        }
        prev = cur;
        prev_side = cur_side;
    }
    out
}

/// Where the edge `a`-`b` crosses the line, given the signed sides of its
/// endpoints (which differ in sign).
fn crossing(a: Point, b: Point, side_a: f64, side_b: f64) -> Point {
    let t = side_a / (side_a - side_b);
    a.plus(b.minus(a).scaled(t))
}
