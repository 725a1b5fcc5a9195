//! Per-entity sync state: debounce, at most one persist in flight, and the
//! snapshot a failed persist rolls back to.
//!
//! Each star and the division registry moves through
//! `Clean → DirtyPending → DirtyInflight → Clean`, or to `RolledBack` when
//! the store refuses the write. An entity is `Clean` when the tracker holds
//! no entry for it. Only user edits are recorded here; state received from
//! the store never is, so a poll cannot trigger a save of what it just
//! delivered.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use starmap_core::IndexRemap;
use starmap_core::config::SyncConfig;
use starmap_types::{CountryDefinition, PositionSignature, RequestId, Star};
use tokio::time::Instant;
use tracing::debug;

/// Where a state change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Direct operator input. Persisted after the debounce.
    User,
    /// Applied from a store snapshot. Never persisted.
    Reconcile,
}

/// An entity the tracker persists independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", content = "index", rename_all = "snake_case")]
pub enum EntityKey {
    /// The star at this index.
    Star(usize),
    /// The whole division registry.
    Registry,
}

/// Sync state of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Matches the store as far as the editor knows.
    #[default]
    Clean,
    /// Edited locally, waiting for the debounce to elapse.
    DirtyPending,
    /// A persist request is outstanding.
    DirtyInflight,
    /// The last persist failed and the local copy was reverted.
    RolledBack,
}

/// What to restore after a failed persist.
#[derive(Debug, Clone, PartialEq)]
pub enum Rollback {
    /// Put `star` back at `index`.
    Star {
        /// Current index of the star.
        index: usize,
        /// Last state the store accepted.
        star: Star,
    },
    /// Replace the registry.
    Registry(Vec<CountryDefinition>),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry<T> {
    state: SyncState,
    confirmed: T,
    deadline: Option<Instant>,
    inflight: Option<RequestId>,
}

impl<T> Entry<T> {
    /// Record an edit that becomes due at `deadline`. `before` is only
    /// taken when the entity was not already dirty.
    fn touch(slot: &mut Option<Self>, before: impl FnOnce() -> T, deadline: Instant) {
        match slot {
            Some(entry) if entry.is_dirty() => entry.deadline = Some(deadline),
            _ => {
                *slot = Some(Self {
                    state: SyncState::DirtyPending,
                    confirmed: before(),
                    deadline: Some(deadline),
                    inflight: None,
                });
            }
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        self.state == SyncState::DirtyPending && self.deadline.is_some_and(|d| d <= now)
    }

    const fn is_dirty(&self) -> bool {
        matches!(
            self.state,
            SyncState::DirtyPending | SyncState::DirtyInflight
        )
    }

    fn begin(&mut self, id: RequestId) {
        self.state = SyncState::DirtyInflight;
        self.inflight = Some(id);
        self.deadline = None;
    }

    /// Accept `persisted` as confirmed. Returns whether the entity is clean
    /// now, i.e. no edit arrived while the request was in flight.
    fn succeed(&mut self, persisted: T) -> bool {
        self.confirmed = persisted;
        self.inflight = None;
        if self.deadline.is_some() {
            self.state = SyncState::DirtyPending;
            false
        } else {
            self.state = SyncState::Clean;
            true
        }
    }

    fn fail(&mut self) {
        self.state = SyncState::RolledBack;
        self.inflight = None;
        self.deadline = None;
    }
}

/// Sync bookkeeping for every star and the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncTracker {
    star_debounce: Duration,
    registry_debounce: Duration,
    stars: BTreeMap<usize, Entry<Star>>,
    registry: Option<Entry<Vec<CountryDefinition>>>,
}

impl SyncTracker {
    /// A tracker using the debounce windows in `config`.
    pub const fn new(config: &SyncConfig) -> Self {
        Self {
            star_debounce: Duration::from_millis(config.autosave_debounce_ms),
            registry_debounce: Duration::from_millis(config.registry_debounce_ms),
            stars: BTreeMap::new(),
            registry: None,
        }
    }

    /// Record a user edit of star `index`. `before` is the star as it was
    /// before the edit; it becomes the rollback snapshot unless the star is
    /// already dirty.
    pub fn touch_star(&mut self, index: usize, before: &Star, now: Instant) {
        let deadline = now.checked_add(self.star_debounce).unwrap_or(now);
        let mut slot = self.stars.remove(&index);
        Entry::touch(&mut slot, || before.clone(), deadline);
        if let Some(entry) = slot {
            debug!(star = index, state = ?entry.state, "star edit recorded");
            self.stars.insert(index, entry);
        }
    }

    /// Record a user edit of the registry.
    pub fn touch_registry(&mut self, before: &[CountryDefinition], now: Instant) {
        let deadline = now.checked_add(self.registry_debounce).unwrap_or(now);
        Entry::touch(&mut self.registry, || before.to_vec(), deadline);
    }

    /// Entities whose debounce has elapsed and that have no request in
    /// flight.
    pub fn due(&self, now: Instant) -> Vec<EntityKey> {
        let stars = self
            .stars
            .iter()
            .filter(|(_, e)| e.is_due(now))
            .map(|(i, _)| EntityKey::Star(*i));
        let registry = self
            .registry
            .as_ref()
            .filter(|e| e.is_due(now))
            .map(|_| EntityKey::Registry);
        stars.chain(registry).collect()
    }

    /// The earliest pending deadline, including ones waiting behind an
    /// in-flight request.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.stars
            .values()
            .filter_map(|e| e.deadline)
            .chain(self.registry.as_ref().and_then(|e| e.deadline))
            .min()
    }

    /// Mark `key` as in flight under request `id`.
    pub fn begin(&mut self, key: EntityKey, id: RequestId) {
        match key {
            EntityKey::Star(index) => {
                if let Some(entry) = self.stars.get_mut(&index) {
                    entry.begin(id);
                }
            }
            EntityKey::Registry => {
                if let Some(entry) = &mut self.registry {
                    entry.begin(id);
                }
            }
        }
    }

    fn find_inflight(&self, id: RequestId) -> Option<EntityKey> {
        if self.registry.as_ref().is_some_and(|e| e.inflight == Some(id)) {
            return Some(EntityKey::Registry);
        }
        self.stars
            .iter()
            .find(|(_, e)| e.inflight == Some(id))
            .map(|(i, _)| EntityKey::Star(*i))
    }

    /// Request `id` for a star succeeded with `persisted`. Returns the
    /// star's current index, or `None` when the request is unknown (the
    /// star was deleted or relocated away meanwhile).
    pub fn star_succeeded(&mut self, id: RequestId, persisted: Star) -> Option<usize> {
        let Some(EntityKey::Star(index)) = self.find_inflight(id) else {
            return None;
        };
        let clean = self
            .stars
            .get_mut(&index)
            .is_some_and(|entry| entry.succeed(persisted));
        if clean {
            self.stars.remove(&index);
        }
        Some(index)
    }

    /// Request `id` for the registry succeeded with `persisted`. Returns
    /// whether the request was known.
    pub fn registry_succeeded(&mut self, id: RequestId, persisted: Vec<CountryDefinition>) -> bool {
        if self.find_inflight(id) != Some(EntityKey::Registry) {
            return false;
        }
        let clean = self
            .registry
            .as_mut()
            .is_some_and(|entry| entry.succeed(persisted));
        if clean {
            self.registry = None;
        }
        true
    }

    /// Request `id` failed. Returns the snapshot to restore. Any edit made
    /// while the request was in flight is dropped with it.
    pub fn failed(&mut self, id: RequestId) -> Option<Rollback> {
        match self.find_inflight(id)? {
            EntityKey::Star(index) => {
                let entry = self.stars.get_mut(&index)?;
                entry.fail();
                Some(Rollback::Star {
                    index,
                    star: entry.confirmed.clone(),
                })
            }
            EntityKey::Registry => {
                let entry = self.registry.as_mut()?;
                entry.fail();
                Some(Rollback::Registry(entry.confirmed.clone()))
            }
        }
    }

    /// Sync state of `key`.
    pub fn state(&self, key: EntityKey) -> SyncState {
        let state = match key {
            EntityKey::Star(index) => self.stars.get(&index).map(|e| e.state),
            EntityKey::Registry => self.registry.as_ref().map(|e| e.state),
        };
        state.unwrap_or_default()
    }

    /// Whether `key` holds local edits the store has not confirmed.
    pub fn is_dirty(&self, key: EntityKey) -> bool {
        match key {
            EntityKey::Star(index) => self.stars.get(&index).is_some_and(Entry::is_dirty),
            EntityKey::Registry => self.registry.as_ref().is_some_and(Entry::is_dirty),
        }
    }

    /// Indices of dirty stars with the position the store last confirmed
    /// for each.
    pub fn dirty_stars(&self) -> Vec<(usize, PositionSignature)> {
        self.stars
            .iter()
            .filter(|(_, e)| e.is_dirty())
            .map(|(i, e)| (*i, e.confirmed.signature()))
            .collect()
    }

    /// Move every star entry to the index `locate` returns for it, dropping
    /// entries it returns `None` for. `locate` receives the current index
    /// and the confirmed position. Rolled-back entries settle to clean.
    pub fn relocate_stars(
        &mut self,
        mut locate: impl FnMut(usize, PositionSignature) -> Option<usize>,
    ) {
        let old = std::mem::take(&mut self.stars);
        for (index, entry) in old {
            if entry.state == SyncState::RolledBack {
                continue;
            }
            match locate(index, entry.confirmed.signature()) {
                Some(to) => {
                    if to != index {
                        debug!(from = index, to, "dirty star relocated");
                    }
                    self.stars.insert(to, entry);
                }
                None => debug!(star = index, "dirty star vanished from the store"),
            }
        }
    }

    /// Apply the renumbering from a local star deletion.
    pub fn remap(&mut self, remap: IndexRemap) {
        self.relocate_stars(|index, _| remap.apply(index));
    }

    /// A rolled-back registry settles to clean once a fresh snapshot
    /// replaces it.
    pub fn settle_registry(&mut self) {
        if self
            .registry
            .as_ref()
            .is_some_and(|e| e.state == SyncState::RolledBack)
        {
            self.registry = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn tracker() -> SyncTracker {
        SyncTracker::new(&SyncConfig {
            poll_interval_ms: 100,
            autosave_debounce_ms: 1000,
            registry_debounce_ms: 0,
        })
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn edit_becomes_due_after_quiet_period() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.touch_star(2, &Star::at(1, 1), t0);
        assert_eq!(t.state(EntityKey::Star(2)), SyncState::DirtyPending);
        assert!(t.due(t0 + ms(999)).is_empty());

        t.touch_star(2, &Star::at(9, 9), t0 + ms(500));
        assert!(t.due(t0 + ms(1400)).is_empty());
        assert_eq!(t.due(t0 + ms(1500)), vec![EntityKey::Star(2)]);
        assert_eq!(t.next_deadline(), Some(t0 + ms(1500)));
    }

    #[test]
    fn edit_while_inflight_waits_for_the_response() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.touch_star(0, &Star::at(1, 1), t0);
        let id = RequestId::new();
        t.begin(EntityKey::Star(0), id);
        assert_eq!(t.state(EntityKey::Star(0)), SyncState::DirtyInflight);

        t.touch_star(0, &Star::at(5, 5), t0 + ms(10));
        assert!(t.due(t0 + ms(5000)).is_empty());

        assert_eq!(t.star_succeeded(id, Star::at(2, 2)), Some(0));
        assert_eq!(t.state(EntityKey::Star(0)), SyncState::DirtyPending);
        assert_eq!(t.due(t0 + ms(5000)), vec![EntityKey::Star(0)]);
    }

    #[test]
    fn success_without_new_edits_is_clean() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.touch_star(0, &Star::at(1, 1), t0);
        let id = RequestId::new();
        t.begin(EntityKey::Star(0), id);
        t.star_succeeded(id, Star::at(2, 2));
        assert_eq!(t.state(EntityKey::Star(0)), SyncState::Clean);
        assert!(!t.is_dirty(EntityKey::Star(0)));
        assert_eq!(t.star_succeeded(id, Star::at(2, 2)), None);
    }

    #[test]
    fn failure_restores_the_pre_edit_star() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.touch_star(4, &Star::at(1, 1), t0);
        t.touch_star(4, &Star::at(3, 3), t0 + ms(1));
        let id = RequestId::new();
        t.begin(EntityKey::Star(4), id);
        assert_eq!(
            t.failed(id),
            Some(Rollback::Star {
                index: 4,
                star: Star::at(1, 1)
            })
        );
        assert_eq!(t.state(EntityKey::Star(4)), SyncState::RolledBack);

        // a fresh edit after a rollback starts from the new state
        t.touch_star(4, &Star::at(7, 7), t0 + ms(2));
        let id = RequestId::new();
        t.begin(EntityKey::Star(4), id);
        assert!(matches!(t.failed(id), Some(Rollback::Star { star, .. }) if star == Star::at(7, 7)));
    }

    #[test]
    fn registry_with_zero_debounce_is_due_at_once() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.touch_registry(&[], t0);
        assert_eq!(t.due(t0), vec![EntityKey::Registry]);
        let id = RequestId::new();
        t.begin(EntityKey::Registry, id);
        assert!(t.registry_succeeded(id, Vec::new()));
        assert_eq!(t.state(EntityKey::Registry), SyncState::Clean);
    }

    #[test]
    fn local_delete_renumbers_entries() {
        let t0 = Instant::now();
        let mut t = tracker();
        for i in [1, 3, 5] {
            t.touch_star(i, &Star::at(i32::try_from(i).unwrap(), 0), t0);
        }
        t.remap(IndexRemap::new(3));
        assert_eq!(
            t.dirty_stars(),
            vec![
                (1, PositionSignature { x: 1, y: 0 }),
                (4, PositionSignature { x: 5, y: 0 })
            ]
        );
    }
}
