//! Effective state "as of year Y".
//!
//! Both resolvers apply the same rule: sort the relevant events by year
//! (stably), drop those after the query year, and let the last survivor
//! win. They are pure and depend only on their inputs.

use serde_json::Value;
use starmap_types::{AdminLevels, CountryDefinition, CountryProfile, Rgb, Star, TimelineEventType};

use crate::timeline::{self, COLOR_KEY, NAME_KEY};

/// A star's admin assignment at `year`.
///
/// Falls back to the star's legacy `admin_levels` field when its timeline
/// has no admin events, holds only the baseline, or has no event at or
/// before `year`.
pub fn resolve_admin(star: &Star, year: i32) -> AdminLevels {
    let events = timeline::sorted_events(&star.timeline, TimelineEventType::AdminDivisions);
    if timeline::has_only_baseline(&events) {
        return star.admin_levels;
    }
    events
        .iter()
        .take_while(|e| e.year <= year)
        .last()
        .map_or(star.admin_levels, |e| timeline::admin_levels_of(e))
}

/// Admin assignments of every star at `year`, by star index.
pub fn resolve_all_admin(stars: &[Star], year: i32) -> Vec<AdminLevels> {
    stars.iter().map(|star| resolve_admin(star, year)).collect()
}

/// A country's display name and colour at `year`.
///
/// Starts from the base name and colour; each profile event at or before
/// `year` overrides whichever of the two it carries.
pub fn resolve_country_profile(country: &CountryDefinition, year: i32) -> CountryProfile {
    let mut profile = CountryProfile {
        name: country.name.clone(),
        color: country.color,
    };
    let events = timeline::sorted_events(&country.timeline, TimelineEventType::CountryProfile);
    for event in events.iter().take_while(|e| e.year <= year) {
        if let Some(name) = event.data.get(NAME_KEY).and_then(Value::as_str) {
            name.clone_into(&mut profile.name);
        }
        if let Some(color) = event.data.get(COLOR_KEY).and_then(rgb_from_value) {
            profile.color = Some(color);
        }
    }
    profile
}

/// Read an `[r, g, b]` array. Channels are clamped to `0..=255`; anything
/// else yields `None`.
pub fn rgb_from_value(value: &Value) -> Option<Rgb> {
    let channels = value.as_array()?;
    let mut rgb = [0_u8; 3];
    if channels.len() < rgb.len() {
        return None;
    }
    for (slot, channel) in rgb.iter_mut().zip(channels) {
        let raw = channel.as_f64()?;
        let clamped = raw.clamp(0.0, 255.0);
        *slot = u8::try_from(clamped_to_int(clamped)).ok()?;
    }
    Some(rgb)
}

#[allow(clippy::cast_possible_truncation)]
fn clamped_to_int(value: f64) -> i64 {
    value.floor() as i64
}
