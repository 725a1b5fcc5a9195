//! Writing a star's admin assignment "as of year Y".
//!
//! Every write records an admin event at the query year and mirrors the new
//! levels into the star's legacy `admin_levels` field. Operations return
//! `None` when the resolved assignment would not change, so callers can skip
//! the persist entirely.

use starmap_types::{AdminLevels, Star, TimelineEventType};

use crate::error::CoreError;
use crate::registry::DivisionRegistry;
use crate::resolve::resolve_admin;
use crate::timeline::{ADMIN_LEVELS_KEY, admin_levels_of, admin_payload, ensure_baseline, upsert};

/// Assign `levels` to `star` as of `year`.
pub fn assign(star: &Star, year: i32, levels: AdminLevels) -> Option<Star> {
    if resolve_admin(star, year) == levels {
        return None;
    }
    Some(record(star, year, levels))
}

/// Set one slot of the star's assignment at `year`, clearing every deeper
/// slot.
///
/// # Errors
///
/// Returns [`CoreError::AdminLevels`] if the slot is out of range or an
/// ancestor slot is unassigned.
pub fn set_level(
    star: &Star,
    year: i32,
    slot: usize,
    value: Option<usize>,
) -> Result<Option<Star>, CoreError> {
    let next = resolve_admin(star, year).with_slot(slot, value)?;
    Ok(assign(star, year, next))
}

/// Paint `star` into division `target` under the drill-down `focus`.
///
/// The prefix comes from `focus`, the slot at `focus.len()` becomes
/// `target`, and deeper slots are cleared.
///
/// # Errors
///
/// Returns [`CoreError::AdminLevels`] when `focus` is already four levels
/// deep.
pub fn paint(
    star: &Star,
    year: i32,
    focus: &[usize],
    target: usize,
) -> Result<Option<Star>, CoreError> {
    let next = AdminLevels::from_path(focus).with_slot(focus.len(), Some(target))?;
    Ok(assign(star, year, next))
}

/// Clear every level of `star` as of `year`.
pub fn unassign(star: &Star, year: i32) -> Option<Star> {
    assign(star, year, AdminLevels::EMPTY)
}

/// The copy of `star` the detail panel edits: baseline guaranteed and the
/// legacy field showing the assignment at `year`.
pub fn editable(star: &Star, year: i32) -> Star {
    let timeline = ensure_baseline(&star.timeline);
    let mut draft = Star {
        timeline,
        ..star.clone()
    };
    draft.admin_levels = resolve_admin(&draft, year);
    draft
}

/// Turn an edited copy back into the record to persist.
///
/// `edited.admin_levels` holds the assignment chosen in the panel. If it
/// differs from what `current` resolves to at `year`, it is recorded as an
/// admin event at `year`.
pub fn commit_draft(current: &Star, edited: &Star, year: i32) -> Star {
    let levels = edited.admin_levels;
    let mut next = Star {
        timeline: ensure_baseline(&edited.timeline),
        ..edited.clone()
    };
    if resolve_admin(current, year) != levels {
        next = record(&next, year, levels);
    }
    next
}

/// Cut every recorded assignment of `star` back to the divisions
/// `registry` still has. `None` when nothing pointed past it.
pub fn prune_missing(star: &Star, registry: &DivisionRegistry) -> Option<Star> {
    let mut next = star.clone();
    let mut changed = false;
    for event in next
        .timeline
        .events
        .iter_mut()
        .filter(|e| e.kind == TimelineEventType::AdminDivisions)
    {
        if let Some(kept) = pruned(&admin_levels_of(event), registry) {
            event
                .data
                .insert(ADMIN_LEVELS_KEY.to_owned(), kept.to_value());
            changed = true;
        }
    }
    if let Some(kept) = pruned(&next.admin_levels, registry) {
        next.admin_levels = kept;
        changed = true;
    }
    changed.then_some(next)
}

fn pruned(levels: &AdminLevels, registry: &DivisionRegistry) -> Option<AdminLevels> {
    let path = levels.path();
    let depth = registry.existing_depth(&path);
    (depth < path.len()).then(|| AdminLevels::from_path(path.get(..depth).unwrap_or_default()))
}

fn record(star: &Star, year: i32, levels: AdminLevels) -> Star {
    let base = ensure_baseline(&star.timeline);
    Star {
        admin_levels: levels,
        timeline: upsert(
            &base,
            year,
            TimelineEventType::AdminDivisions,
            &admin_payload(&levels),
        ),
        ..star.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::timeline::baseline_timeline;

    fn star() -> Star {
        Star {
            timeline: baseline_timeline(),
            ..Star::at(5, 5)
        }
    }

    #[test]
    fn assignments_to_removed_divisions_are_cut_back() {
        let mut registry = DivisionRegistry::default();
        let c = registry.add_division(&[], "Aurora", [200, 0, 0], 2000).unwrap();
        registry.add_division(&[c], "Core", [0, 200, 0], 2000).unwrap();

        let s = assign(&star(), 2100, AdminLevels([Some(0), Some(0), None, None])).unwrap();
        let s = assign(&s, 2200, AdminLevels([Some(0), Some(3), Some(1), None])).unwrap();
        let s = assign(&s, 2300, AdminLevels([Some(4), None, None, None])).unwrap();

        let pruned = prune_missing(&s, &registry).unwrap();
        assert_eq!(
            resolve_admin(&pruned, 2100),
            AdminLevels([Some(0), Some(0), None, None])
        );
        assert_eq!(
            resolve_admin(&pruned, 2200),
            AdminLevels([Some(0), None, None, None])
        );
        assert_eq!(resolve_admin(&pruned, 2300), AdminLevels::EMPTY);
        assert_eq!(pruned.admin_levels, AdminLevels::EMPTY);
        assert!(prune_missing(&pruned, &registry).is_none());
    }

    #[test]
    fn setting_sector_clears_province_and_cluster() {
        let full = AdminLevels([Some(1), Some(2), Some(3), Some(4)]);
        let s = assign(&star(), 2100, full).unwrap();
        let demoted = set_level(&s, 2100, 1, Some(0)).unwrap().unwrap();
        assert_eq!(
            resolve_admin(&demoted, 2100),
            AdminLevels([Some(1), Some(0), None, None])
        );
        // the 2100 event was merged, not duplicated
        assert_eq!(demoted.timeline.events.len(), 2);
    }

    #[test]
    fn unchanged_assignment_is_a_no_op() {
        let lv = AdminLevels([Some(1), None, None, None]);
        let s = assign(&star(), 2100, lv).unwrap();
        assert!(assign(&s, 2150, lv).is_none());
        assert!(unassign(&star(), 2100).is_none());
    }

    #[test]
    fn paint_uses_focus_prefix() {
        let s = assign(&star(), 2100, AdminLevels([Some(7), Some(7), Some(7), None])).unwrap();
        let painted = paint(&s, 2100, &[2], 5).unwrap().unwrap();
        assert_eq!(
            painted.admin_levels,
            AdminLevels([Some(2), Some(5), None, None])
        );
        assert!(paint(&s, 2100, &[0, 0, 0, 0], 1).is_err());
    }

    #[test]
    fn later_edit_does_not_rewrite_history() {
        let s = assign(&star(), 2100, AdminLevels([Some(1), None, None, None])).unwrap();
        let s = assign(&s, 2200, AdminLevels([Some(2), None, None, None])).unwrap();
        assert_eq!(resolve_admin(&s, 2150).get(0), Some(1));
        assert_eq!(resolve_admin(&s, 2250).get(0), Some(2));
    }

    #[test]
    fn draft_commit_records_changed_levels_only() {
        let current = star();
        let mut draft = editable(&current, 2100);
        draft.name = "Renamed".to_owned();
        let saved = commit_draft(&current, &draft, 2100);
        assert_eq!(saved.timeline.events.len(), 1);
        assert_eq!(saved.name, "Renamed");

        draft.admin_levels = AdminLevels([Some(3), None, None, None]);
        let saved = commit_draft(&current, &draft, 2100);
        assert_eq!(saved.timeline.events.len(), 2);
        assert_eq!(resolve_admin(&saved, 2100).get(0), Some(3));
    }
}
