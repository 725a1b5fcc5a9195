//! Building star systems: from a generator profile, as a plain fallback,
//! and adding bodies by hand.

use starmap_types::{AdminLevels, CelestialBody, GeneratedSystem, Star};

use crate::timeline::baseline_timeline;

/// Spectral class given to stars created without a generator profile.
pub const FALLBACK_STAR_TYPE: &str = "G";

/// Placeholder radius for new bodies.
pub const DEFAULT_BODY_RADIUS_KM: f64 = 1000.0;

/// Innermost orbit for a hand-added body.
pub const MIN_NEW_ORBIT_AU: f64 = 0.3;

/// Gap between the outermost body and a hand-added one.
pub const NEW_ORBIT_SPACING_AU: f64 = 0.5;

const BELT_SUFFIX: &str = " Belt";

/// 1-based positional name, e.g. `Star 4` for the fourth star.
fn ordinal_name(prefix: &str, zero_based: usize) -> String {
    format!("{prefix} {}", zero_based.saturating_add(1))
}

/// Build the star at `(x, y)` from a generator profile. `index` is the
/// position the star will take in the galaxy.
///
/// Blank names fall back to positional ones, and asteroid belts always end
/// in ` Belt`.
pub fn star_from_profile(profile: &GeneratedSystem, x: i32, y: i32, index: usize) -> Star {
    let name = profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| ordinal_name("Star", index), str::to_owned);

    let bodies = profile
        .bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            let mut name = body
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map_or_else(|| ordinal_name("Body", i), str::to_owned);
            let mut built = CelestialBody {
                name: String::new(),
                kind: body.kind.clone(),
                distance_au: body.dist_au,
                angle_deg: 0.0,
                radius_km: DEFAULT_BODY_RADIUS_KM,
                color: None,
            };
            if built.is_belt() && !name.ends_with(BELT_SUFFIX) {
                name.push_str(BELT_SUFFIX);
            }
            built.name = name;
            built
        })
        .collect();

    Star {
        x,
        y,
        name,
        description: format!("A {} type star", profile.classification),
        star_type: profile.classification.clone(),
        admin_levels: AdminLevels::EMPTY,
        bodies,
        timeline: baseline_timeline(),
    }
}

/// A bare star for when the generator is unavailable.
pub fn fallback_star(x: i32, y: i32, index: usize) -> Star {
    Star {
        x,
        y,
        name: ordinal_name("Star", index),
        description: String::new(),
        star_type: FALLBACK_STAR_TYPE.to_owned(),
        admin_levels: AdminLevels::EMPTY,
        bodies: Vec::new(),
        timeline: baseline_timeline(),
    }
}

/// A new body orbiting outside every existing one.
pub fn new_body(existing: &[CelestialBody], name: &str, kind: &str) -> CelestialBody {
    let name = name.trim();
    let name = if name.is_empty() {
        ordinal_name("Body", existing.len())
    } else {
        name.to_owned()
    };
    let farthest = existing
        .iter()
        .map(|b| b.distance_au)
        .fold(0.0_f64, f64::max);
    CelestialBody {
        name,
        kind: kind.to_owned(),
        distance_au: MIN_NEW_ORBIT_AU.max(farthest + NEW_ORBIT_SPACING_AU),
        angle_deg: 0.0,
        radius_km: DEFAULT_BODY_RADIUS_KM,
        color: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn profile_defaults_are_filled_in() {
        let profile: GeneratedSystem = serde_json::from_value(json!({
            "name": "  ",
            "classification": "K",
            "bodies": [
                { "name": "Kepler", "type": "terrestrial", "dist_au": 0.8 },
                { "type": "asteroid_belt", "dist_au": 2.5 },
                { "name": "Outer Belt", "type": "asteroid_belt", "dist_au": 4.0 },
            ],
        }))
        .unwrap();
        let star = star_from_profile(&profile, 10, -20, 4);
        assert_eq!(star.name, "Star 5");
        assert_eq!(star.description, "A K type star");
        assert_eq!(star.star_type, "K");
        assert_eq!(star.bodies[0].name, "Kepler");
        assert_eq!(star.bodies[1].name, "Body 2 Belt");
        assert_eq!(star.bodies[2].name, "Outer Belt");
        assert_eq!(star.bodies[1].radius_km, DEFAULT_BODY_RADIUS_KM);
        assert_eq!(star.timeline.events.len(), 1);
    }

    #[test]
    fn fallback_star_is_plain() {
        let star = fallback_star(1, 2, 0);
        assert_eq!(star.name, "Star 1");
        assert_eq!(star.star_type, "G");
        assert!(star.bodies.is_empty());
    }

    #[test]
    fn new_bodies_orbit_outside_existing_ones() {
        let first = new_body(&[], "", "terrestrial");
        assert_eq!(first.name, "Body 1");
        assert_eq!(first.distance_au, 0.5);

        let second = new_body(&[first.clone()], " Dust ", "gas_giant");
        assert_eq!(second.name, "Dust");
        assert_eq!(second.distance_au, 1.0);
    }
}
