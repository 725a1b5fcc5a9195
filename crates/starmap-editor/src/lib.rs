//! The editing session of the star-map editor.
//!
//! An [`EditorSession`] holds one operator's view of the galaxy: the
//! selection, the open star's draft, the active edit mode, pan and zoom.
//! Edits apply locally at once. Star and registry edits are persisted after
//! a debounce and rolled back if the store refuses them; structural edits
//! are sent straight away. Background polls are merged without disturbing
//! unconfirmed local edits.
//!
//! # Modules
//!
//! - [`session`] -- The session and every operator action
//! - [`mode`] -- Edit modes as click and context-menu handlers
//! - [`sync`] -- Per-entity debounce, in-flight and rollback state
//! - [`persist`] -- Turning due edits into store requests
//! - [`reconcile`] -- Merging store snapshots
//! - [`poller`] -- Background polling gated on window presence
//! - [`scene`] -- What to draw for the galaxy and system views
//! - [`status`] -- Status line, modal and loading indicator
//! - [`error`] -- Editor errors

pub mod error;
pub mod mode;
pub mod persist;
pub mod poller;
pub mod reconcile;
pub mod scene;
pub mod session;
pub mod status;
pub mod sync;

pub use error::EditorError;
pub use mode::{Click, ContextAction, Intent, Mode, ModeHandler};
pub use persist::{PersistJob, PersistOutcome, PersistPayload};
pub use poller::{PollResult, PollTicket, Poller, Presence};
pub use scene::{Scene, Shape};
pub use session::{CountryChange, CountryChangeOutcome, DivisionOutcome, EditorSession};
pub use status::{Feedback, Modal, Status};
pub use sync::{EntityKey, Origin, SyncState, SyncTracker};
