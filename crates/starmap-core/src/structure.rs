//! Structural edits to the galaxy: adding and removing stars and lanes.
//!
//! Stars and lanes are identified by index, so removing star `k` renumbers
//! every reference above it. [`IndexRemap`] describes that renumbering so
//! callers can apply it to whatever indices they hold (selection, paint
//! focus, dirty-entity keys) in the same step.

use starmap_types::{Galaxy, Hyperlane, Star};
use tracing::debug;

use crate::error::CoreError;

/// The renumbering produced by removing one star.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRemap {
    removed: usize,
}

impl IndexRemap {
    /// Renumbering for the removal of `removed`.
    pub const fn new(removed: usize) -> Self {
        Self { removed }
    }

    /// The removed index.
    pub const fn removed(self) -> usize {
        self.removed
    }

    /// Where `idx` now lives: unchanged below the removed index, shifted
    /// down by one above it, gone if it was the removed index.
    pub const fn apply(self, idx: usize) -> Option<usize> {
        if idx < self.removed {
            Some(idx)
        } else if idx == self.removed {
            None
        } else {
            idx.checked_sub(1)
        }
    }
}

/// Remove star `index`, dropping lanes that touch it and renumbering the
/// rest. Resource region membership is renumbered the same way.
///
/// # Errors
///
/// Returns [`CoreError::StarNotFound`] if `index` is out of range; the
/// galaxy is left unchanged.
pub fn remove_star(galaxy: &mut Galaxy, index: usize) -> Result<(Star, IndexRemap), CoreError> {
    if index >= galaxy.stars.len() {
        return Err(CoreError::StarNotFound { index });
    }
    let star = galaxy.stars.remove(index);
    let remap = IndexRemap::new(index);

    let before = galaxy.hyperlanes.len();
    galaxy.hyperlanes = galaxy
        .hyperlanes
        .iter()
        .filter_map(|lane| {
            Some(Hyperlane {
                a: remap.apply(lane.a)?,
                b: remap.apply(lane.b)?,
            })
        })
        .collect();
    for region in &mut galaxy.resources {
        region.systems = region
            .systems
            .iter()
            .filter_map(|s| remap.apply(*s))
            .collect();
    }

    debug!(
        star = index,
        lanes_dropped = before.saturating_sub(galaxy.hyperlanes.len()),
        "star removed"
    );
    Ok((star, remap))
}

/// Width and height after growing to contain `(x, y)` plus `buffer`.
///
/// Coordinates are not shifted; a point left of or above the origin widens
/// the bounds by its distance from the origin.
pub fn grown_bounds(width: u32, height: u32, x: i32, y: i32, buffer: u32) -> (u32, u32) {
    (grow_axis(width, x, buffer), grow_axis(height, y, buffer))
}

fn grow_axis(extent: u32, coord: i32, buffer: u32) -> u32 {
    let extent_i = i64::from(extent);
    let coord = i64::from(coord);
    let buffer = i64::from(buffer);
    let needed = if coord < 0 {
        extent_i.saturating_add(coord.saturating_neg()).saturating_add(buffer)
    } else if coord >= extent_i {
        coord.saturating_add(buffer)
    } else {
        extent_i
    };
    u32::try_from(needed.max(extent_i)).unwrap_or(u32::MAX)
}

/// Append `star`, growing the galaxy bounds to contain it. Returns the new
/// star's index.
pub fn add_star(galaxy: &mut Galaxy, star: Star, growth_buffer: u32) -> usize {
    let (width, height) = grown_bounds(galaxy.width, galaxy.height, star.x, star.y, growth_buffer);
    galaxy.width = width;
    galaxy.height = height;
    let index = galaxy.stars.len();
    galaxy.stars.push(star);
    debug!(star = index, width, height, "star added");
    index
}

/// Check that a lane from `a` to `b` may be added.
///
/// # Errors
///
/// Returns [`CoreError::SelfLink`] for `a == b`,
/// [`CoreError::StarNotFound`] for an out-of-range endpoint, or
/// [`CoreError::DuplicateLane`] if the stars are already joined.
pub fn validate_lane(galaxy: &Galaxy, a: usize, b: usize) -> Result<(), CoreError> {
    if a == b {
        return Err(CoreError::SelfLink { star: a });
    }
    for index in [a, b] {
        if index >= galaxy.stars.len() {
            return Err(CoreError::StarNotFound { index });
        }
    }
    if galaxy.hyperlanes.iter().any(|lane| lane.joins(a, b)) {
        return Err(CoreError::DuplicateLane { a, b });
    }
    Ok(())
}

/// Append a lane from `a` to `b` and return its index.
///
/// # Errors
///
/// See [`validate_lane`].
pub fn add_hyperlane(galaxy: &mut Galaxy, a: usize, b: usize) -> Result<usize, CoreError> {
    validate_lane(galaxy, a, b)?;
    let index = galaxy.hyperlanes.len();
    galaxy.hyperlanes.push(Hyperlane { a, b });
    Ok(index)
}

/// Remove lane `index`.
///
/// # Errors
///
/// Returns [`CoreError::LaneNotFound`] if `index` is out of range.
pub fn remove_hyperlane(galaxy: &mut Galaxy, index: usize) -> Result<Hyperlane, CoreError> {
    if index >= galaxy.hyperlanes.len() {
        return Err(CoreError::LaneNotFound { index });
    }
    Ok(galaxy.hyperlanes.remove(index))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use starmap_types::ResourceRegion;

    use super::*;

    fn galaxy(stars: usize, lanes: &[(usize, usize)]) -> Galaxy {
        Galaxy {
            width: 1000,
            height: 800,
            stars: (0..stars)
                .map(|i| Star::at(i32::try_from(i).unwrap() * 10, 0))
                .collect(),
            hyperlanes: lanes.iter().map(|&(a, b)| Hyperlane { a, b }).collect(),
            resources: vec![ResourceRegion {
                id: 0,
                systems: (0..stars).collect(),
            }],
        }
    }

    #[test]
    fn deleting_a_star_renumbers_lanes() {
        let mut g = galaxy(6, &[(0, 1), (1, 3), (3, 5), (2, 4), (0, 5)]);
        let (removed, remap) = remove_star(&mut g, 3).unwrap();
        assert_eq!(removed.x, 30);
        assert_eq!(
            g.hyperlanes,
            vec![Hyperlane { a: 0, b: 1 }, Hyperlane { a: 2, b: 3 }, Hyperlane { a: 0, b: 4 }]
        );
        assert!(g.hyperlanes.iter().all(|l| l.a < g.stars.len() && l.b < g.stars.len()));
        assert_eq!(g.resources[0].systems, vec![0, 1, 2, 3, 4]);
        assert_eq!(remap.apply(2), Some(2));
        assert_eq!(remap.apply(3), None);
        assert_eq!(remap.apply(4), Some(3));
    }

    #[test]
    fn deleting_out_of_range_changes_nothing() {
        let mut g = galaxy(2, &[(0, 1)]);
        let before = g.clone();
        assert_eq!(remove_star(&mut g, 2).unwrap_err(), CoreError::StarNotFound { index: 2 });
        assert_eq!(g, before);
    }

    #[test]
    fn bounds_grow_around_new_stars() {
        assert_eq!(grown_bounds(1000, 800, 500, 400, 100), (1000, 800));
        assert_eq!(grown_bounds(1000, 800, 1200, 400, 100), (1300, 800));
        assert_eq!(grown_bounds(1000, 800, -50, 900, 100), (1150, 1000));

        let mut g = galaxy(1, &[]);
        let idx = add_star(&mut g, Star::at(1000, 10), 100);
        assert_eq!(idx, 1);
        assert_eq!(g.width, 1100);
    }

    #[test]
    fn lanes_are_validated() {
        let mut g = galaxy(3, &[(0, 1)]);
        assert_eq!(add_hyperlane(&mut g, 2, 2), Err(CoreError::SelfLink { star: 2 }));
        assert_eq!(add_hyperlane(&mut g, 1, 0), Err(CoreError::DuplicateLane { a: 1, b: 0 }));
        assert_eq!(add_hyperlane(&mut g, 0, 9), Err(CoreError::StarNotFound { index: 9 }));
        assert_eq!(add_hyperlane(&mut g, 1, 2), Ok(1));
        assert_eq!(remove_hyperlane(&mut g, 0), Ok(Hyperlane { a: 0, b: 1 }));
        assert_eq!(remove_hyperlane(&mut g, 5), Err(CoreError::LaneNotFound { index: 5 }));
    }
}
