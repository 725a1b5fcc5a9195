//! Error types for the headless editor binary.

/// Top-level error for `starmap-cli`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: starmap_core::ConfigError,
    },

    /// The store could not be reached or refused the initial load.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: starmap_store::StoreError,
    },

    /// The virtual screen size is unusable.
    #[error("viewport error: {source}")]
    Viewport {
        /// The underlying spatial error.
        #[from]
        source: starmap_spatial::SpatialError,
    },

    /// The poll task ended abnormally.
    #[error("poller error: {message}")]
    Poller {
        /// Description of the failure.
        message: String,
    },
}
