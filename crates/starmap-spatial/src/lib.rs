//! Spatial layer of the star-map editor: territories, the screen transform
//! and hit-testing.
//!
//! Everything works on the galaxy's positional star and lane indices, the
//! same indices selections and the sync tracker use.
//!
//! # Modules
//!
//! - [`geometry`] -- Points, bounds, segment distance, point-in-polygon
//! - [`voronoi`] -- Bounded Voronoi cells per star
//! - [`viewport`] -- Pan/zoom, fitting, system-view zoom
//! - [`orbit`] -- System-view layout of bodies and belts
//! - [`picker`] -- Star, lane, body and region picks
//! - [`error`] -- Error types for the above

pub mod error;
pub mod geometry;
pub mod orbit;
pub mod picker;
pub mod viewport;
pub mod voronoi;

pub use error::SpatialError;
pub use geometry::{Bounds, Point};
pub use picker::{Pick, Picker};
pub use viewport::{Drag, ScreenSize, Viewport};
pub use voronoi::Tessellation;
