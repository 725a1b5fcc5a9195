//! Enumeration types shared by the editor and the store wire format.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The kind of a timeline event. Serialized as the event's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TimelineEventType {
    /// A star's admin-levels assignment (`{ admin_levels: [...] }`).
    AdminDivisions,
    /// A country's display profile override (`{ name?, color? }`).
    CountryProfile,
}

/// Which editing tools the pointer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EditMode {
    /// Read-only browsing; clicks select.
    #[default]
    View,
    /// Stars and hyperlanes can be created and removed.
    Geography,
    /// Stars are painted into divisions.
    Political,
}

/// Which scene the viewport is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ViewMode {
    /// The whole star map.
    #[default]
    Galaxy,
    /// One star system and its bodies.
    System,
}

/// A level of the political hierarchy. The discriminant is the admin slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DivisionLevel {
    /// Slot 0.
    Country,
    /// Slot 1.
    Sector,
    /// Slot 2.
    Province,
    /// Slot 3.
    Cluster,
}

impl DivisionLevel {
    /// All levels, outermost first.
    pub const ALL: [Self; 4] = [Self::Country, Self::Sector, Self::Province, Self::Cluster];

    /// The admin-levels slot this level occupies.
    pub const fn slot(self) -> usize {
        match self {
            Self::Country => 0,
            Self::Sector => 1,
            Self::Province => 2,
            Self::Cluster => 3,
        }
    }

    /// The level stored at `slot`, if any.
    pub const fn from_slot(slot: usize) -> Option<Self> {
        match slot {
            0 => Some(Self::Country),
            1 => Some(Self::Sector),
            2 => Some(Self::Province),
            3 => Some(Self::Cluster),
            _ => None,
        }
    }

    /// Human-readable label, e.g. for "Create new province?" prompts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::Sector => "Sector",
            Self::Province => "Province",
            Self::Cluster => "Cluster",
        }
    }
}

impl core::fmt::Display for DivisionLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
