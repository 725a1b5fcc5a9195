//! Recording dated changes without duplicating or losing history.
//!
//! Timelines are stored unsorted. Writers go through [`upsert`], which keeps
//! at most one event per `(year, kind)` that it creates; readers go through
//! [`sorted_events`], which applies a stable sort so equal-year events keep
//! their stored order.

use serde_json::{Map, Value};
use starmap_types::{AdminLevels, Timeline, TimelineEvent, TimelineEventType};

/// Year of the synthetic "no division assigned" admin event.
pub const BASELINE_YEAR: i32 = 0;

/// Payload key of an admin event's levels.
pub const ADMIN_LEVELS_KEY: &str = "admin_levels";

/// Payload key of a profile event's name override.
pub const NAME_KEY: &str = "name";

/// Payload key of a profile event's colour override.
pub const COLOR_KEY: &str = "color";

/// Payload of an admin event carrying `levels`.
pub fn admin_payload(levels: &AdminLevels) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(ADMIN_LEVELS_KEY.to_owned(), levels.to_value());
    data
}

/// The levels carried by an admin event, normalised to four slots.
pub fn admin_levels_of(event: &TimelineEvent) -> AdminLevels {
    event
        .data
        .get(ADMIN_LEVELS_KEY)
        .map_or(AdminLevels::EMPTY, AdminLevels::from_value)
}

/// True for a year-0 admin event whose levels are all null.
pub fn is_baseline(event: &TimelineEvent) -> bool {
    event.kind == TimelineEventType::AdminDivisions
        && event.year == BASELINE_YEAR
        && admin_levels_of(event).is_empty()
}

/// Events of one kind in ascending year order. Ties keep stored order.
pub fn sorted_events(timeline: &Timeline, kind: TimelineEventType) -> Vec<&TimelineEvent> {
    let mut events: Vec<&TimelineEvent> =
        timeline.events.iter().filter(|e| e.kind == kind).collect();
    events.sort_by_key(|e| e.year);
    events
}

/// True when the only admin event is the baseline.
pub fn has_only_baseline(events: &[&TimelineEvent]) -> bool {
    matches!(events, [only] if is_baseline(only))
}

/// A timeline holding just the baseline event.
pub fn baseline_timeline() -> Timeline {
    Timeline {
        events: vec![baseline_event()],
    }
}

fn baseline_event() -> TimelineEvent {
    TimelineEvent::new(
        BASELINE_YEAR,
        TimelineEventType::AdminDivisions,
        admin_payload(&AdminLevels::EMPTY),
    )
}

/// Return `timeline` with a baseline event added if it has no admin event
/// at year 0. Never adds a second one.
pub fn ensure_baseline(timeline: &Timeline) -> Timeline {
    let mut next = timeline.clone();
    let has_year_zero = next
        .events
        .iter()
        .any(|e| e.kind == TimelineEventType::AdminDivisions && e.year == BASELINE_YEAR);
    if !has_year_zero {
        next.events.push(baseline_event());
    }
    next
}

/// Position of the event of `kind` at exactly `year`. With several (legacy
/// data), the last one is returned since it is the one resolution sees.
pub fn find_event(timeline: &Timeline, year: i32, kind: TimelineEventType) -> Option<usize> {
    timeline
        .events
        .iter()
        .rposition(|e| e.kind == kind && e.year == year)
}

/// Record `payload` for `kind` at `year`.
///
/// An existing event at that exact year has `payload` shallow-merged into
/// its data (keys absent from `payload` are kept); otherwise a new event is
/// appended. Applying the same upsert twice yields the same timeline as
/// applying it once.
pub fn upsert(
    timeline: &Timeline,
    year: i32,
    kind: TimelineEventType,
    payload: &Map<String, Value>,
) -> Timeline {
    let mut next = timeline.clone();
    match find_event(&next, year, kind).and_then(|idx| next.events.get_mut(idx)) {
        Some(existing) => {
            for (key, value) in payload {
                existing.data.insert(key.clone(), value.clone());
            }
        }
        None => next
            .events
            .push(TimelineEvent::new(year, kind, payload.clone())),
    }
    next
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: &Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn baseline_is_added_once() {
        let once = ensure_baseline(&Timeline::default());
        let twice = ensure_baseline(&once);
        assert_eq!(once, twice);
        assert_eq!(once.events.len(), 1);
        assert!(is_baseline(&once.events[0]));
    }

    #[test]
    fn existing_year_zero_event_suppresses_baseline() {
        let timeline = Timeline {
            events: vec![TimelineEvent::new(
                0,
                TimelineEventType::AdminDivisions,
                admin_payload(&AdminLevels([Some(1), None, None, None])),
            )],
        };
        assert_eq!(ensure_baseline(&timeline), timeline);
        assert!(!is_baseline(&timeline.events[0]));
    }

    #[test]
    fn upsert_appends_then_merges() {
        let kind = TimelineEventType::CountryProfile;
        let first = upsert(&Timeline::default(), 2100, kind, &payload(&json!({"name": "A", "color": [1, 2, 3]})));
        assert_eq!(first.events.len(), 1);

        let second = upsert(&first, 2100, kind, &payload(&json!({"name": "B"})));
        assert_eq!(second.events.len(), 1);
        assert_eq!(Value::Object(second.events[0].data.clone()), json!({"name": "B", "color": [1, 2, 3]}));
    }

    #[test]
    fn upsert_is_idempotent() {
        let kind = TimelineEventType::AdminDivisions;
        let data = admin_payload(&AdminLevels([Some(0), Some(2), None, None]));
        let base = baseline_timeline();
        let once = upsert(&base, 2150, kind, &data);
        let twice = upsert(&once, 2150, kind, &data);
        assert_eq!(once, twice);
    }

    #[test]
    fn upsert_never_mixes_kinds() {
        let t = upsert(&baseline_timeline(), 0, TimelineEventType::CountryProfile, &payload(&json!({"name": "X"})));
        assert_eq!(t.events.len(), 2);
        assert_eq!(find_event(&t, 0, TimelineEventType::AdminDivisions), Some(0));
        assert_eq!(find_event(&t, 0, TimelineEventType::CountryProfile), Some(1));
    }

    #[test]
    fn sort_is_stable_for_equal_years() {
        let kind = TimelineEventType::AdminDivisions;
        let a = TimelineEvent::new(2100, kind, admin_payload(&AdminLevels([Some(1), None, None, None])));
        let b = TimelineEvent::new(2050, kind, admin_payload(&AdminLevels::EMPTY));
        let c = TimelineEvent::new(2100, kind, admin_payload(&AdminLevels([Some(2), None, None, None])));
        let timeline = Timeline { events: vec![a.clone(), b.clone(), c.clone()] };
        let sorted = sorted_events(&timeline, kind);
        assert_eq!(sorted, vec![&b, &a, &c]);
    }
}
