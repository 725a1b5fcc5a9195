//! Galaxy entity structs: stars, bodies, hyperlanes, the division tree, and
//! the snapshot shape returned by the galaxy store.
//!
//! Field names follow the store's JSON exactly. Stored data predates several
//! fields, so list fields accept `null` and most fields default when absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::admin::AdminLevels;
use crate::color::Rgb;
use crate::enums::TimelineEventType;

/// Deserialize a field that may be `null`, treating `null` as the default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Timelines
// ---------------------------------------------------------------------------

/// One dated change to a star or country.
///
/// The payload is opaque at this layer; its shape depends on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimelineEvent {
    /// Calendar year the change takes effect.
    pub year: i32,
    /// What the payload describes.
    #[serde(rename = "type")]
    pub kind: TimelineEventType,
    /// Event payload, e.g. `{ "admin_levels": [...] }`.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Map<String, Value>>", optional = nullable)]
    pub data: Map<String, Value>,
}

impl TimelineEvent {
    /// Build an event from its parts.
    pub const fn new(year: i32, kind: TimelineEventType, data: Map<String, Value>) -> Self {
        Self { year, kind, data }
    }
}

/// An unordered bag of dated events. Resolution sorts on read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Timeline {
    /// Events in insertion order.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<TimelineEvent>>", optional = nullable)]
    pub events: Vec<TimelineEvent>,
}

// ---------------------------------------------------------------------------
// Stars
// ---------------------------------------------------------------------------

/// `type` value of an asteroid belt body.
pub const ASTEROID_BELT: &str = "asteroid_belt";

/// A planet, moon or belt orbiting a star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CelestialBody {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Body classification, e.g. `terrestrial` or `asteroid_belt`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Orbital distance from the star.
    #[serde(default)]
    pub distance_au: f64,
    /// Orbital angle in degrees.
    #[serde(default)]
    pub angle_deg: f64,
    /// Body radius.
    #[serde(default)]
    pub radius_km: f64,
    /// Optional display colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl CelestialBody {
    /// True for asteroid belts, which are drawn as scattered dots rather
    /// than an orbit plus a disc.
    pub fn is_belt(&self) -> bool {
        self.kind == ASTEROID_BELT
    }
}

/// A star system.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Star {
    /// World x coordinate.
    pub x: i32,
    /// World y coordinate.
    pub y: i32,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Spectral class, e.g. `G`.
    #[serde(default)]
    pub star_type: String,
    /// Legacy single assignment, used when the timeline carries nothing but
    /// the baseline. Kept in step with the latest write.
    #[serde(default)]
    pub admin_levels: AdminLevels,
    /// Orbiting bodies.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<CelestialBody>>", optional = nullable)]
    pub bodies: Vec<CelestialBody>,
    /// Dated admin assignments.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Timeline>", optional = nullable)]
    pub timeline: Timeline,
}

impl Star {
    /// A star at `(x, y)` with every other field empty.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// The star's position signature.
    pub const fn signature(&self) -> PositionSignature {
        PositionSignature {
            x: self.x,
            y: self.y,
        }
    }
}

/// A star's `(x, y)` captured when it was selected, used to find it again
/// after concurrent deletes shift indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PositionSignature {
    /// World x coordinate.
    pub x: i32,
    /// World y coordinate.
    pub y: i32,
}

impl PositionSignature {
    /// True when `star` sits exactly at this signature.
    pub const fn matches(self, star: &Star) -> bool {
        self.x == star.x && self.y == star.y
    }
}

/// An undirected connection between two stars, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Hyperlane {
    /// First endpoint.
    pub a: usize,
    /// Second endpoint.
    pub b: usize,
}

impl Hyperlane {
    /// True when the lane joins `x` and `y` in either direction.
    pub const fn joins(self, x: usize, y: usize) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// True when either endpoint is `idx`.
    pub const fn touches(self, idx: usize) -> bool {
        self.a == idx || self.b == idx
    }
}

// ---------------------------------------------------------------------------
// Galaxy
// ---------------------------------------------------------------------------

/// A group of stars sharing a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceRegion {
    /// Resource definition index.
    pub id: u32,
    /// Member star indices.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<usize>>", optional = nullable)]
    pub systems: Vec<usize>,
}

/// The positional star map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Galaxy {
    /// Bounding width.
    pub width: u32,
    /// Bounding height.
    pub height: u32,
    /// Stars; a star's identity is its index here.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<Star>>", optional = nullable)]
    pub stars: Vec<Star>,
    /// Lanes between stars.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<Hyperlane>>", optional = nullable)]
    pub hyperlanes: Vec<Hyperlane>,
    /// Resource regions. Carried through untouched.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<ResourceRegion>>", optional = nullable)]
    pub resources: Vec<ResourceRegion>,
}

impl Galaxy {
    /// Index of the first star at `signature`.
    pub fn find_by_signature(&self, signature: PositionSignature) -> Option<usize> {
        self.stars.iter().position(|star| signature.matches(star))
    }
}

/// A resource kind shown in overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceDefinition {
    /// Display name.
    pub name: String,
    /// Overlay colour.
    pub color: Rgb,
    /// How rare the resource is (0 to 1).
    #[serde(default = "default_rarity")]
    pub rarity: f64,
    /// Bias towards the galactic core (-1 to 1).
    #[serde(default)]
    pub centricity: f64,
}

const fn default_rarity() -> f64 {
    0.5
}

// ---------------------------------------------------------------------------
// Division tree
// ---------------------------------------------------------------------------

/// The innermost division.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusterDefinition {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Display colour; missing colours are repaired on load.
    #[serde(default)]
    pub color: Option<Rgb>,
}

/// A province and its clusters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProvinceDefinition {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Display colour.
    #[serde(default)]
    pub color: Option<Rgb>,
    /// Child clusters.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<ClusterDefinition>>", optional = nullable)]
    pub clusters: Vec<ClusterDefinition>,
}

/// A sector and its provinces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SectorDefinition {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Display colour.
    #[serde(default)]
    pub color: Option<Rgb>,
    /// Child provinces.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<ProvinceDefinition>>", optional = nullable)]
    pub provinces: Vec<ProvinceDefinition>,
}

/// A country, its sectors, and its dated profile overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountryDefinition {
    /// Base name, shown before any profile event applies.
    #[serde(default)]
    pub name: String,
    /// Base colour.
    #[serde(default)]
    pub color: Option<Rgb>,
    /// Child sectors.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<SectorDefinition>>", optional = nullable)]
    pub sectors: Vec<SectorDefinition>,
    /// `country_profile` events overriding name and colour.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Timeline>", optional = nullable)]
    pub timeline: Timeline,
}

/// Name and colour of a country as of some year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountryProfile {
    /// Effective name.
    pub name: String,
    /// Effective colour.
    pub color: Option<Rgb>,
}

// ---------------------------------------------------------------------------
// Store payloads
// ---------------------------------------------------------------------------

/// Everything the store returns from a full fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GalaxySnapshot {
    /// The star map.
    pub galaxy: Galaxy,
    /// Resource definitions.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<ResourceDefinition>>", optional = nullable)]
    pub resources: Vec<ResourceDefinition>,
    /// The division registry.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<CountryDefinition>>", optional = nullable)]
    pub countries: Vec<CountryDefinition>,
}

/// One body proposed by the system generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeneratedBody {
    /// Proposed name; may be absent or blank.
    #[serde(default)]
    pub name: Option<String>,
    /// Body classification.
    #[serde(rename = "type")]
    pub kind: String,
    /// Orbital distance.
    pub dist_au: f64,
}

/// A system profile proposed by the external generator for a new star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeneratedSystem {
    /// Proposed star name; may be absent or blank.
    #[serde(default)]
    pub name: Option<String>,
    /// Spectral class.
    pub classification: String,
    /// Proposed bodies.
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "Option<Vec<GeneratedBody>>", optional = nullable)]
    pub bodies: Vec<GeneratedBody>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn legacy_star_decodes_with_defaults() {
        let star: Star = serde_json::from_value(json!({
            "x": 120,
            "y": 45,
            "admin_levels": [1],
            "bodies": null,
        }))
        .unwrap();
        assert_eq!(star.signature(), PositionSignature { x: 120, y: 45 });
        assert_eq!(star.admin_levels, AdminLevels([Some(1), None, None, None]));
        assert!(star.bodies.is_empty());
        assert!(star.timeline.events.is_empty());
    }

    #[test]
    fn event_type_field_is_named_type() {
        let event = TimelineEvent::new(2100, TimelineEventType::AdminDivisions, Map::new());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!("admin_divisions"));
        assert_eq!(value["year"], json!(2100));
    }

    #[test]
    fn snapshot_tolerates_null_lists() {
        let snapshot: GalaxySnapshot = serde_json::from_value(json!({
            "galaxy": { "width": 10, "height": 10, "stars": [], "hyperlanes": [] },
            "resources": null,
            "countries": [{ "name": "Aurora", "sectors": null }],
        }))
        .unwrap();
        assert_eq!(snapshot.countries.len(), 1);
        assert_eq!(snapshot.countries[0].color, None);
        assert!(snapshot.countries[0].sectors.is_empty());
    }

    #[test]
    fn null_tolerant_fields_are_optional_in_bindings() {
        use ts_rs::TS;

        let galaxy = Galaxy::decl();
        assert!(galaxy.contains("stars?: Array<Star> | null"));
        assert!(galaxy.contains("hyperlanes?: Array<Hyperlane> | null"));
        assert!(galaxy.contains("width: number"));
        assert!(Star::decl().contains("timeline?: Timeline | null"));
        assert!(CountryDefinition::decl().contains("sectors?: Array<SectorDefinition> | null"));
    }

    #[test]
    fn lanes_join_in_either_direction() {
        let lane = Hyperlane { a: 2, b: 5 };
        assert!(lane.joins(5, 2));
        assert!(lane.touches(5));
        assert!(!lane.touches(3));
    }
}
