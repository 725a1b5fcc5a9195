//! Merging a store snapshot into the session.
//!
//! Stars are addressed by index and indices shift when another editor
//! deletes a star, so identity across snapshots is recovered from the last
//! known position. Local edits the store has not confirmed are carried
//! over onto the incoming galaxy; everything else is taken from the store.
//! Nothing applied here is recorded for persisting.

use std::collections::BTreeMap;
use std::sync::Arc;

use starmap_core::DivisionRegistry;
use starmap_core::admin::editable;
use starmap_core::timeline::ensure_baseline;
use starmap_types::{
    CountryDefinition, Galaxy, GalaxySnapshot, GalaxyTarget, PositionSignature, Rgb, Selection,
    ViewMode,
};
use tracing::{debug, info};

use crate::session::EditorSession;
use crate::status::{GALAXY_LOADED, SYSTEM_DELETED_MESSAGE, SYSTEM_DELETED_TITLE};
use crate::sync::EntityKey;

/// Index of the star last seen at `index` with position `signature`: the
/// same index while the position still matches, otherwise wherever that
/// position is now.
fn locate(galaxy: &Galaxy, index: usize, signature: PositionSignature) -> Option<usize> {
    if galaxy.stars.get(index).is_some_and(|s| signature.matches(s)) {
        Some(index)
    } else {
        galaxy.find_by_signature(signature)
    }
}

fn inherit(color: &mut Option<Rgb>, local: Option<Rgb>) {
    if color.is_none() {
        *color = local;
    }
}

/// Keep locally repaired colours for divisions the store sends without
/// one, so colours stay put across polls.
fn inherit_colors(incoming: &mut [CountryDefinition], local: &[CountryDefinition]) {
    for (country, known) in incoming.iter_mut().zip(local) {
        inherit(&mut country.color, known.color);
        for (sector, known) in country.sectors.iter_mut().zip(&known.sectors) {
            inherit(&mut sector.color, known.color);
            for (province, known) in sector.provinces.iter_mut().zip(&known.provinces) {
                inherit(&mut province.color, known.color);
                for (cluster, known) in province.clusters.iter_mut().zip(&known.clusters) {
                    inherit(&mut cluster.color, known.color);
                }
            }
        }
    }
}

fn positions(galaxy: &Galaxy) -> Vec<PositionSignature> {
    galaxy.stars.iter().map(|s| s.signature()).collect()
}

impl EditorSession {
    /// Merge `snapshot` into the session. A silent merge sets no status.
    pub(crate) fn apply_snapshot(&mut self, snapshot: GalaxySnapshot, silent: bool) {
        let GalaxySnapshot {
            mut galaxy,
            resources,
            mut countries,
        } = snapshot;
        for star in &mut galaxy.stars {
            star.timeline = ensure_baseline(&star.timeline);
        }

        self.tracker.settle_registry();
        if self.tracker.is_dirty(EntityKey::Registry) {
            debug!("registry has local edits, keeping them");
        } else {
            inherit_colors(&mut countries, self.registry.countries());
            self.registry = DivisionRegistry::repaired(countries, self.calendar, &mut self.rng);
            if let Some(political) = self.mode.political_mut() {
                political.retain_existing(&self.registry);
            }
        }

        // Unconfirmed local star edits move to wherever the star is now.
        let mut moves = BTreeMap::new();
        for (index, signature) in self.tracker.dirty_stars() {
            let to = locate(&galaxy, index, signature);
            let local = self.galaxy.stars.get(index);
            if let (Some(slot), Some(local)) = (to.and_then(|to| galaxy.stars.get_mut(to)), local) {
                slot.clone_from(local);
            }
            moves.insert(index, to);
        }
        self.tracker
            .relocate_stars(|index, _| moves.get(&index).copied().flatten());

        self.reselect(&galaxy, &moves);

        let stars = galaxy.stars.len();
        let lanes = galaxy.hyperlanes.len();
        self.galaxy_selection = self.galaxy_selection.filter(|t| match *t {
            GalaxyTarget::Star(i) => i < stars,
            GalaxyTarget::Lane(i) => i < lanes,
        });
        self.selection = self
            .selection
            .filter(|s| !matches!(*s, Selection::Lane { id } if id >= lanes));
        if let Some(geography) = self.mode.geography_mut() {
            geography.remap_lane_from(|i| (i < stars).then_some(i));
        }

        let moved = positions(&self.galaxy) != positions(&galaxy);
        if *self.galaxy != galaxy {
            self.galaxy = Arc::new(galaxy);
        }
        self.resources = resources;
        if moved {
            self.refresh_layout();
        }

        if silent {
            debug!(stars, lanes, "galaxy refreshed");
        } else {
            info!(stars, lanes, "galaxy loaded");
            self.feedback.set_status(GALAXY_LOADED);
        }
    }

    /// Find the selected star in `galaxy`, or let go of it when it is gone.
    fn reselect(&mut self, galaxy: &Galaxy, moves: &BTreeMap<usize, Option<usize>>) {
        let Some(selected) = self.selected_star() else {
            return;
        };
        let target = match (moves.get(&selected), self.signature) {
            (Some(to), _) => *to,
            (None, Some(signature)) => locate(galaxy, selected, signature),
            (None, None) => galaxy.stars.get(selected).map(|_| selected),
        };
        let in_system = self.viewport.mode() == ViewMode::System;

        let Some((to, star)) = target.and_then(|to| galaxy.stars.get(to).map(|s| (to, s))) else {
            info!(star = selected, "selected star no longer exists");
            if in_system {
                self.feedback
                    .raise(SYSTEM_DELETED_TITLE, SYSTEM_DELETED_MESSAGE);
            }
            if self.galaxy_selection == Some(GalaxyTarget::Star(selected)) {
                self.galaxy_selection = None;
            }
            self.deselect();
            return;
        };

        if to != selected {
            debug!(from = selected, to, "selected star renumbered");
        }
        self.selection = self.selection.map(|s| match s.with_star(to) {
            Selection::Body { body_idx, .. } if body_idx >= star.bodies.len() => {
                Selection::Star { id: to }
            }
            other => other,
        });
        if self.galaxy_selection == Some(GalaxyTarget::Star(selected)) {
            self.galaxy_selection = Some(GalaxyTarget::Star(to));
        }
        self.signature = Some(star.signature());
        if in_system && !self.tracker.is_dirty(EntityKey::Star(to)) {
            self.draft = Some(editable(star, self.year));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use starmap_types::{SectorDefinition, Star};

    use super::*;

    #[test]
    fn locate_prefers_the_same_index() {
        let galaxy = Galaxy {
            stars: vec![Star::at(1, 1), Star::at(2, 2), Star::at(1, 1)],
            ..Galaxy::default()
        };
        let sig = PositionSignature { x: 1, y: 1 };
        assert_eq!(locate(&galaxy, 2, sig), Some(2));
        assert_eq!(locate(&galaxy, 1, sig), Some(0));
        assert_eq!(locate(&galaxy, 1, PositionSignature { x: 9, y: 9 }), None);
    }

    #[test]
    fn missing_colors_come_from_the_local_registry() {
        let local = vec![CountryDefinition {
            color: Some([1, 2, 3]),
            sectors: vec![SectorDefinition {
                color: Some([4, 5, 6]),
                ..SectorDefinition::default()
            }],
            ..CountryDefinition::default()
        }];
        let mut incoming = vec![
            CountryDefinition {
                color: Some([9, 9, 9]),
                sectors: vec![SectorDefinition::default(), SectorDefinition::default()],
                ..CountryDefinition::default()
            },
            CountryDefinition::default(),
        ];
        inherit_colors(&mut incoming, &local);
        assert_eq!(incoming[0].color, Some([9, 9, 9]));
        assert_eq!(incoming[0].sectors[0].color, Some([4, 5, 6]));
        assert_eq!(incoming[0].sectors[1].color, None);
        assert_eq!(incoming[1].color, None);
    }
}
