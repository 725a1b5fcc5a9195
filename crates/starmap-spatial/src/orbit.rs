//! Where bodies sit in the system view.
//!
//! Bodies are laid out on evenly spaced angles around the star at
//! [`ORBIT_SCALE`] world units per AU; their stored `angle_deg` is not used
//! for layout. Asteroid belts are drawn as a ring of dots whose jitter is a
//! pure function of the star and body indices, so every redraw matches.

use starmap_types::CelestialBody;

use crate::geometry::Point;

/// World units per AU in the system view.
pub const ORBIT_SCALE: f64 = 230.0;

/// Dots drawn per asteroid belt.
pub const BELT_DOTS: u32 = 50;

/// Radial jitter of belt dots, in AU either side of the orbit.
const BELT_SPREAD_AU: f64 = 0.05;

/// Widen an index for angle arithmetic.
pub(crate) fn index_f64(i: usize) -> f64 {
    u32::try_from(i).map_or(f64::from(u32::MAX), f64::from)
}

/// Orbit radius of `body` in world units.
pub fn orbit_radius(body: &CelestialBody) -> f64 {
    body.distance_au * ORBIT_SCALE
}

/// Position of body `index` of `count`, relative to the star.
pub fn body_position(index: usize, count: usize, distance_au: f64) -> Point {
    let angle = if count == 0 {
        0.0
    } else {
        index_f64(index) / index_f64(count) * std::f64::consts::TAU
    };
    let r = distance_au * ORBIT_SCALE;
    Point::new(angle.cos() * r, angle.sin() * r)
}

/// One dot of an asteroid belt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeltDot {
    /// Position relative to the star.
    pub at: Point,
    /// Dot radius in world units.
    pub size: f64,
}

/// The dots of belt `body_index` around star `star_index`.
pub fn belt_dots(star_index: usize, body_index: usize, distance_au: f64) -> Vec<BeltDot> {
    let star = u32::try_from(star_index).unwrap_or(u32::MAX);
    let body = u32::try_from(body_index).unwrap_or(u32::MAX);
    let base = star
        .saturating_mul(10_000)
        .saturating_add(body.saturating_mul(100));
    let radius = distance_au * ORBIT_SCALE;

    (0..BELT_DOTS)
        .map(|i| {
            let seed = f64::from(base.saturating_add(i));
            let angle = seeded(seed + 1.0) * std::f64::consts::TAU;
            let r = radius + (seeded(seed + 2.0) - 0.5) * 2.0 * BELT_SPREAD_AU * ORBIT_SCALE;
            BeltDot {
                at: Point::new(angle.cos() * r, angle.sin() * r),
                size: seeded(seed + 3.0) * 1.5 + 0.5,
            }
        })
        .collect()
}

/// Deterministic value in `[0, 1)` for `seed`.
fn seeded(seed: f64) -> f64 {
    let x = seed.sin() * 10_000.0;
    x - x.floor()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn bodies_are_evenly_spaced() {
        let first = body_position(0, 4, 1.0);
        assert!(first.distance(Point::new(230.0, 0.0)) < 1e-9);
        let second = body_position(1, 4, 2.0);
        assert!(second.distance(Point::new(0.0, 460.0)) < 1e-9);
    }

    #[test]
    fn belts_are_stable_and_near_their_orbit() {
        let a = belt_dots(3, 1, 2.0);
        let b = belt_dots(3, 1, 2.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        for dot in &a {
            let r = dot.at.distance(Point::ZERO);
            assert!((r - 460.0).abs() <= 11.5 + 1e-9);
            assert!((0.5..=2.0).contains(&dot.size));
        }
        assert_ne!(belt_dots(4, 1, 2.0), a);
    }
}
