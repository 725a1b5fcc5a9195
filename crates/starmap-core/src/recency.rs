//! Border recency: when each country last gained or lost a star.

use std::collections::BTreeMap;

use starmap_types::{Star, TimelineEventType};

use crate::timeline;

/// For each country index, the latest year at or before `year` in which a
/// star entered or left it.
///
/// Stars whose timeline holds nothing but the baseline count towards their
/// legacy country at `min_year`.
pub fn border_recency(stars: &[Star], year: i32, min_year: i32) -> BTreeMap<usize, i32> {
    let mut recency = BTreeMap::new();
    let mut touch = |country: usize, at: i32| {
        recency
            .entry(country)
            .and_modify(|latest: &mut i32| *latest = (*latest).max(at))
            .or_insert(at);
    };

    for star in stars {
        let events = timeline::sorted_events(&star.timeline, TimelineEventType::AdminDivisions);
        if events.is_empty() || timeline::has_only_baseline(&events) {
            if let Some(country) = star.admin_levels.get(0) {
                touch(country, min_year);
            }
            continue;
        }

        let mut previous: Option<usize> = None;
        for event in events.iter().take_while(|e| e.year <= year) {
            let country = timeline::admin_levels_of(event).get(0);
            if country != previous {
                if let Some(left) = previous {
                    touch(left, event.year);
                }
                if let Some(entered) = country {
                    touch(entered, event.year);
                }
                previous = country;
            }
        }
    }
    recency
}

/// Country indices ordered most-recently-changed first. Ties, and countries
/// that never changed, fall back to index order.
pub fn rank_by_recency(country_count: usize, recency: &BTreeMap<usize, i32>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..country_count).collect();
    order.sort_by(|a, b| {
        let ra = recency.get(a);
        let rb = recency.get(b);
        rb.cmp(&ra).then(a.cmp(b))
    });
    order
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use starmap_types::AdminLevels;

    use super::*;
    use crate::admin::assign;
    use crate::timeline::baseline_timeline;

    fn country(idx: usize) -> AdminLevels {
        AdminLevels([Some(idx), None, None, None])
    }

    #[test]
    fn legacy_stars_count_at_first_year() {
        let star = Star {
            admin_levels: country(2),
            timeline: baseline_timeline(),
            ..Star::at(0, 0)
        };
        let recency = border_recency(&[star], 2300, 2000);
        assert_eq!(recency.get(&2), Some(&2000));
    }

    #[test]
    fn transfers_touch_both_countries() {
        let base = Star {
            timeline: baseline_timeline(),
            ..Star::at(0, 0)
        };
        let s = assign(&base, 2100, country(0)).unwrap();
        let s = assign(&s, 2250, country(1)).unwrap();

        let at_2200 = border_recency(std::slice::from_ref(&s), 2200, 2000);
        assert_eq!(at_2200.get(&0), Some(&2100));
        assert_eq!(at_2200.get(&1), None);

        let at_2300 = border_recency(&[s], 2300, 2000);
        assert_eq!(at_2300.get(&0), Some(&2250));
        assert_eq!(at_2300.get(&1), Some(&2250));
    }

    #[test]
    fn ranking_puts_recent_first() {
        let recency = BTreeMap::from([(0, 2100), (2, 2300), (3, 2100)]);
        assert_eq!(rank_by_recency(4, &recency), vec![2, 0, 3, 1]);
    }
}
