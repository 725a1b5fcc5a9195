//! Hit-testing: which star, lane, body or territory is under the pointer.
//!
//! Stars win over lanes. Among candidates within tolerance the nearest is
//! chosen, and equal distances go to the lower index.

use starmap_types::{Galaxy, GalaxyTarget, Hyperlane, Star};

use crate::geometry::{Point, distance_to_segment};
use crate::orbit::{body_position, orbit_radius};
use crate::viewport::Viewport;
use crate::voronoi::Tessellation;

/// Result of a galaxy-view pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// A star index.
    Star(usize),
    /// A hyperlane index.
    Lane(usize),
    /// Nothing within tolerance.
    Empty,
}

impl Pick {
    /// The picked entity as a galaxy selection target.
    pub const fn target(self) -> Option<GalaxyTarget> {
        match self {
            Self::Star(i) => Some(GalaxyTarget::Star(i)),
            Self::Lane(i) => Some(GalaxyTarget::Lane(i)),
            Self::Empty => None,
        }
    }
}

/// Hit-tests against one galaxy's stars and lanes.
#[derive(Debug, Clone, Copy)]
pub struct Picker<'a> {
    stars: &'a [Star],
    lanes: &'a [Hyperlane],
}

impl<'a> Picker<'a> {
    /// A picker over `galaxy`.
    pub fn new(galaxy: &'a Galaxy) -> Self {
        Self {
            stars: &galaxy.stars,
            lanes: &galaxy.hyperlanes,
        }
    }

    /// Nearest star within `tolerance` world units of `world`.
    pub fn nearest_star(&self, world: Point, tolerance: f64) -> Option<usize> {
        nearest(
            self.stars
                .iter()
                .map(|s| world.distance(Point::of_star(s))),
            tolerance,
        )
    }

    /// Nearest lane within `tolerance` world units of `world`. Lanes with a
    /// dangling endpoint are skipped.
    pub fn nearest_lane(&self, world: Point, tolerance: f64) -> Option<usize> {
        nearest(
            self.lanes.iter().map(|lane| {
                match (self.stars.get(lane.a), self.stars.get(lane.b)) {
                    (Some(a), Some(b)) => {
                        distance_to_segment(world, Point::of_star(a), Point::of_star(b))
                    }
                    _ => f64::INFINITY,
                }
            }),
            tolerance,
        )
    }

    /// Star, else lane, else nothing at world point `world`.
    pub fn pick(&self, world: Point, tolerance: f64) -> Pick {
        if let Some(star) = self.nearest_star(world, tolerance) {
            return Pick::Star(star);
        }
        self.nearest_lane(world, tolerance)
            .map_or(Pick::Empty, Pick::Lane)
    }

    /// Pick at a screen point through the viewport's transform and
    /// pixel tolerance.
    pub fn pick_screen(&self, viewport: &Viewport, screen: Point) -> Pick {
        self.pick(viewport.to_world(screen), viewport.pick_tolerance())
    }
}

/// Nearest body of `star` at `world` (relative to the star) within
/// `tolerance`. Belts are hit anywhere along their ring.
pub fn pick_body(star: &Star, world: Point, tolerance: f64) -> Option<usize> {
    let count = star.bodies.len();
    nearest(
        star.bodies.iter().enumerate().map(|(i, body)| {
            if body.is_belt() {
                (world.distance(Point::ZERO) - orbit_radius(body)).abs()
            } else {
                world.distance(body_position(i, count, body.distance_au))
            }
        }),
        tolerance,
    )
}

/// Territory under world point `world`.
pub fn pick_region(tessellation: &Tessellation, world: Point) -> Option<usize> {
    tessellation.cell_at(world)
}

fn nearest(distances: impl Iterator<Item = f64>, tolerance: f64) -> Option<usize> {
    distances
        .enumerate()
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use starmap_core::config::ViewportConfig;
    use starmap_types::CelestialBody;

    use super::*;
    use crate::viewport::ScreenSize;

    fn pair() -> Galaxy {
        Galaxy {
            width: 200,
            height: 200,
            stars: vec![Star::at(0, 0), Star::at(100, 0)],
            hyperlanes: vec![Hyperlane { a: 0, b: 1 }],
            resources: Vec::new(),
        }
    }

    #[test]
    fn click_near_a_star_picks_it_not_the_lane() {
        let g = pair();
        let picker = Picker::new(&g);
        assert_eq!(picker.pick(Point::new(3.0, 1.0), 12.0), Pick::Star(0));
        assert_eq!(picker.pick(Point::new(50.0, 4.0), 12.0), Pick::Lane(0));
        assert_eq!(picker.pick(Point::new(50.0, 40.0), 12.0), Pick::Empty);
    }

    #[test]
    fn screen_pick_goes_through_the_viewport() {
        let g = pair();
        let mut vp = Viewport::new(
            ScreenSize::new(800.0, 600.0).unwrap(),
            ViewportConfig::default(),
        );
        vp.fit_galaxy(&g.stars);
        let on_screen = vp.to_screen(Point::new(1.0, -1.0));
        assert_eq!(Picker::new(&g).pick_screen(&vp, on_screen), Pick::Star(0));
    }

    #[test]
    fn nearest_star_wins_over_iteration_order() {
        let g = Galaxy {
            stars: vec![Star::at(0, 0), Star::at(6, 0)],
            ..pair()
        };
        let picker = Picker::new(&g);
        assert_eq!(picker.pick(Point::new(4.0, 0.0), 12.0), Pick::Star(1));
        assert_eq!(picker.pick(Point::new(3.0, 0.0), 12.0), Pick::Star(0));
    }

    #[test]
    fn dangling_lanes_are_not_picked() {
        let g = Galaxy {
            hyperlanes: vec![Hyperlane { a: 0, b: 9 }],
            ..pair()
        };
        assert_eq!(Picker::new(&g).pick(Point::new(50.0, 0.0), 12.0), Pick::Empty);
    }

    #[test]
    fn bodies_are_picked_where_they_are_drawn() {
        let body = |kind: &str, distance_au| CelestialBody {
            name: String::new(),
            kind: kind.to_owned(),
            distance_au,
            angle_deg: 0.0,
            radius_km: 1000.0,
            color: None,
        };
        let star = Star {
            bodies: vec![body("terrestrial", 1.0), body("asteroid_belt", 2.0)],
            ..Star::at(0, 0)
        };
        assert_eq!(pick_body(&star, Point::new(232.0, 1.0), 5.0), Some(0));
        // second of two bodies sits at 180 degrees, but belts are rings
        assert_eq!(pick_body(&star, Point::new(0.0, 461.0), 5.0), Some(1));
        assert_eq!(pick_body(&star, Point::new(0.0, 300.0), 5.0), None);
    }

    #[test]
    fn regions_come_from_the_tessellation() {
        let g = pair();
        let t = Tessellation::from_stars(&g.stars, 100.0);
        assert_eq!(pick_region(&t, Point::new(80.0, 50.0)), Some(1));
    }
}
