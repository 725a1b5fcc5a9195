//! Status line, blocking modal, and loading indicator.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status after a star persist succeeds.
pub const STAR_SAVED: &str = "Star saved successfully.";
/// Status after a star persist fails.
pub const STAR_SAVE_FAILED: &str = "Failed to save star.";
/// Status after a star is created.
pub const STAR_ADDED: &str = "Star added successfully.";
/// Status after star creation fails.
pub const STAR_ADD_FAILED: &str = "Failed to add star.";
/// Status after a star is deleted.
pub const STAR_REMOVED: &str = "Star removed successfully.";
/// Status after star deletion fails.
pub const STAR_REMOVE_FAILED: &str = "Failed to remove star.";
/// Status after a lane is created.
pub const LANE_ADDED: &str = "Hyperlane added successfully.";
/// Status after lane creation fails.
pub const LANE_ADD_FAILED: &str = "Failed to add hyperlane.";
/// Status after a lane is deleted.
pub const LANE_REMOVED: &str = "Hyperlane removed successfully.";
/// Status after lane deletion fails.
pub const LANE_REMOVE_FAILED: &str = "Failed to remove hyperlane.";
/// Status after the registry fails to save.
pub const COUNTRIES_SAVE_FAILED: &str = "Failed to save countries.";
/// Status after a foreground load.
pub const GALAXY_LOADED: &str = "Galaxy loaded successfully.";
/// Status after a foreground load fails.
pub const GALAXY_LOAD_FAILED: &str = "Failed to load galaxy.";

/// Modal title when the viewed system disappears.
pub const SYSTEM_DELETED_TITLE: &str = "System deleted";
/// Modal body when the viewed system disappears.
pub const SYSTEM_DELETED_MESSAGE: &str = "The system you were viewing was removed by another editor.";

/// A status line message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Text shown to the user.
    pub message: String,
    /// When it was set.
    pub at: DateTime<Utc>,
}

/// A message the user must dismiss before continuing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modal {
    /// Heading.
    pub title: String,
    /// Body text.
    pub message: String,
    /// When it was raised.
    pub at: DateTime<Utc>,
}

/// User-facing feedback owned by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    status: Option<Status>,
    modal: Option<Modal>,
    loading: u32,
}

impl Feedback {
    /// Replace the status line.
    pub fn set_status(&mut self, message: &str) {
        self.status = Some(Status {
            message: message.to_owned(),
            at: Utc::now(),
        });
    }

    /// The current status line.
    pub const fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Raise a modal, replacing any open one.
    pub fn raise(&mut self, title: &str, message: &str) {
        self.modal = Some(Modal {
            title: title.to_owned(),
            message: message.to_owned(),
            at: Utc::now(),
        });
    }

    /// The open modal.
    pub const fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Close the open modal, returning it.
    pub const fn dismiss(&mut self) -> Option<Modal> {
        self.modal.take()
    }

    /// A foreground operation started.
    pub const fn begin_loading(&mut self) {
        self.loading = self.loading.saturating_add(1);
    }

    /// A foreground operation finished.
    pub const fn end_loading(&mut self) {
        self.loading = self.loading.saturating_sub(1);
    }

    /// Whether any foreground operation is running.
    pub const fn is_loading(&self) -> bool {
        self.loading > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn loading_counter_never_underflows() {
        let mut feedback = Feedback::default();
        feedback.end_loading();
        assert!(!feedback.is_loading());
        feedback.begin_loading();
        feedback.begin_loading();
        feedback.end_loading();
        assert!(feedback.is_loading());
        feedback.end_loading();
        assert!(!feedback.is_loading());
    }

    #[test]
    fn dismissing_closes_the_modal() {
        let mut feedback = Feedback::default();
        feedback.raise(SYSTEM_DELETED_TITLE, SYSTEM_DELETED_MESSAGE);
        let modal = feedback.dismiss().unwrap();
        assert_eq!(modal.title, SYSTEM_DELETED_TITLE);
        assert!(feedback.modal().is_none());
    }

    #[test]
    fn status_serializes_with_a_timestamp() {
        let mut feedback = Feedback::default();
        feedback.set_status(STAR_SAVED);
        let json = serde_json::to_value(feedback.status().unwrap()).unwrap();
        assert_eq!(json["message"], STAR_SAVED);
        assert!(json["at"].is_string());
    }
}
