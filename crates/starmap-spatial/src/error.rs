//! Error types for the `starmap-spatial` crate.

/// Errors raised when setting up spatial structures.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SpatialError {
    /// The screen area has a non-positive or non-finite side.
    #[error("screen size {width}x{height} is not drawable")]
    DegenerateScreen {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
}
