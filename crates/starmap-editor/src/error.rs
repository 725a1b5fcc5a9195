//! Error types for the editing session.
//!
//! Store failures never surface here: the session turns them into a
//! rollback plus a status line. These errors are for requests the session
//! refuses before touching anything.

use starmap_core::CoreError;
use starmap_types::EditMode;

/// Errors returned by [`EditorSession`](crate::EditorSession) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// A registry, timeline or structural rule was violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The operation needs a selected star.
    #[error("no star is selected")]
    NoStarSelected,

    /// The operation needs a body selection on the selected star.
    #[error("body {index} does not exist on the selected star")]
    BodyNotFound {
        /// The requested body index.
        index: usize,
    },

    /// The operation is only available in another edit mode.
    #[error("operation requires {required:?} mode")]
    WrongMode {
        /// The mode the operation needs.
        required: EditMode,
    },
}
