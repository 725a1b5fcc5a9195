//! Error types for the `starmap-core` crate.
//!
//! Every fallible operation here is validated before anything is mutated, so
//! an `Err` always leaves the galaxy and registry untouched.

use starmap_types::{AdminLevelsError, DivisionLevel};

/// Errors raised by registry, timeline, and structural operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// An admin-levels tuple could not be updated.
    #[error(transparent)]
    AdminLevels(#[from] AdminLevelsError),

    /// No star exists at the index.
    #[error("star {index} not found")]
    StarNotFound {
        /// The missing index.
        index: usize,
    },

    /// No hyperlane exists at the index.
    #[error("hyperlane {index} not found")]
    LaneNotFound {
        /// The missing index.
        index: usize,
    },

    /// A hyperlane would connect a star to itself.
    #[error("hyperlane endpoints must be different (star {star})")]
    SelfLink {
        /// The star on both ends.
        star: usize,
    },

    /// A hyperlane between the two stars already exists.
    #[error("hyperlane between {a} and {b} already exists")]
    DuplicateLane {
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
    },

    /// A division path does not lead to an existing division.
    #[error("no division at path {path:?}")]
    DivisionNotFound {
        /// The path that failed to resolve.
        path: Vec<usize>,
    },

    /// A division would be created below the cluster level.
    #[error("divisions cannot nest below {deepest}")]
    TooDeep {
        /// The innermost level.
        deepest: DivisionLevel,
    },

    /// A division name is empty after trimming.
    #[error("division name must not be empty")]
    EmptyName,

    /// No timeline event exists at the index.
    #[error("country {country} has no profile event {event}")]
    ProfileEventNotFound {
        /// Country index.
        country: usize,
        /// Event index within the country's timeline.
        event: usize,
    },

    /// Another profile event of the country already sits at the year.
    #[error("country {country} already has a profile event in {year}")]
    YearOccupied {
        /// Country index.
        country: usize,
        /// The contested year.
        year: i32,
    },
}
