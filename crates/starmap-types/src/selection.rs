//! What the operator currently has selected, by index.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The entity shown in the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Selection {
    /// A star, by index.
    Star {
        /// Star index.
        id: usize,
    },
    /// A hyperlane, by index.
    Lane {
        /// Hyperlane index.
        id: usize,
    },
    /// A body of a star, by star index and body index.
    Body {
        /// Owning star index.
        #[serde(rename = "starId")]
        star_id: usize,
        /// Body index within the star.
        #[serde(rename = "bodyIdx")]
        body_idx: usize,
    },
}

impl Selection {
    /// The star this selection belongs to, if any.
    pub const fn star(self) -> Option<usize> {
        match self {
            Self::Star { id } => Some(id),
            Self::Body { star_id, .. } => Some(star_id),
            Self::Lane { .. } => None,
        }
    }

    /// The same selection pointed at a different star index. Lane
    /// selections are returned unchanged.
    #[must_use]
    pub const fn with_star(self, star: usize) -> Self {
        match self {
            Self::Star { .. } => Self::Star { id: star },
            Self::Body { body_idx, .. } => Self::Body {
                star_id: star,
                body_idx,
            },
            Self::Lane { .. } => self,
        }
    }
}

/// What the galaxy view has highlighted (and the Delete key removes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GalaxyTarget {
    /// A star, by index.
    Star(usize),
    /// A hyperlane, by index.
    Lane(usize),
}
