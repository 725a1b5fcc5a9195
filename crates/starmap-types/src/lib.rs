//! Shared type definitions for the star-map political editor.
//!
//! This crate is the single source of truth for the galaxy data model used
//! across the workspace. Field names match the galaxy store's JSON, and the
//! types flow downstream to `TypeScript` via `ts-rs` for the web editor.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for sessions and persist requests
//! - [`enums`] -- Timeline event kinds, edit/view modes, division levels
//! - [`admin`] -- The four-slot admin-levels tuple
//! - [`structs`] -- Stars, bodies, hyperlanes, divisions, store payloads
//! - [`selection`] -- Index-based selections
//! - [`color`] -- RGB / packed / hex colour helpers

pub mod admin;
pub mod color;
pub mod enums;
pub mod ids;
pub mod selection;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use admin::{ADMIN_DEPTH, AdminLevels, AdminLevelsError};
pub use color::Rgb;
pub use enums::{DivisionLevel, EditMode, TimelineEventType, ViewMode};
pub use ids::{RequestId, SessionId};
pub use selection::{GalaxyTarget, Selection};
pub use structs::{
    ASTEROID_BELT, CelestialBody, ClusterDefinition, CountryDefinition, CountryProfile, Galaxy,
    GalaxySnapshot, GeneratedBody, GeneratedSystem, Hyperlane, PositionSignature,
    ProvinceDefinition, ResourceDefinition, ResourceRegion, SectorDefinition, Star, Timeline,
    TimelineEvent, null_as_default,
};
