//! Political model of the star-map editor.
//!
//! Everything here is synchronous and pure or `&mut`-local: no I/O besides
//! reading the config file, no clocks. The editor crate layers optimistic
//! persistence on top.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with defaults and env overrides
//! - [`calendar`] -- Year bounds and year-input parsing
//! - [`timeline`] -- Baseline synthesis and the upsert rule for dated events
//! - [`resolve`] -- Admin levels and country profile "as of year Y"
//! - [`admin`] -- Assigning, painting and clearing a star's divisions
//! - [`registry`] -- The country → sector → province → cluster tree
//! - [`recency`] -- When each country's borders last changed
//! - [`structure`] -- Adding/removing stars and lanes with renumbering
//! - [`system`] -- Building new star systems and bodies
//! - [`error`] -- Error types for the above

pub mod admin;
pub mod calendar;
pub mod config;
pub mod error;
pub mod recency;
pub mod registry;
pub mod resolve;
pub mod structure;
pub mod system;
pub mod timeline;

pub use calendar::Calendar;
pub use config::{ConfigError, EditorConfig};
pub use error::CoreError;
pub use registry::{DivisionRegistry, ProfileUpdate};
pub use resolve::{resolve_admin, resolve_country_profile};
pub use structure::IndexRemap;
