//! Error types for the galaxy store.
//!
//! The editor collapses every variant into a single "persist failed"
//! outcome; the split exists for logs.

/// Errors returned by [`GalaxyStore`](crate::GalaxyStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("{operation}: request failed: {message}")]
    Transport {
        /// The store operation, e.g. `update star`.
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// The store answered with a non-success status.
    #[error("{operation}: store returned {status}: {body}")]
    Rejected {
        /// The store operation.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder if it could not be read.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("{operation}: unexpected response: {message}")]
    Decode {
        /// The store operation.
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// The operation that failed.
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Transport { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Decode { operation, .. } => operation,
        }
    }
}
