//! Debounced persisting of star and registry edits.
//!
//! [`EditorSession::begin_persists`] takes every entity whose debounce has
//! elapsed and turns it into a [`PersistJob`]. Jobs borrow nothing from the
//! session, so the host can run them concurrently with further edits and
//! hand the outcomes back to [`EditorSession::complete`].

use starmap_core::DivisionRegistry;
use starmap_core::admin::editable;
use starmap_store::{GalaxyStore, StoreError};
use starmap_types::{CountryDefinition, RequestId, Star};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::session::EditorSession;
use crate::status::{COUNTRIES_SAVE_FAILED, STAR_SAVE_FAILED, STAR_SAVED};
use crate::sync::{EntityKey, Origin, Rollback};

/// What a persist request writes.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistPayload {
    /// One star, at its index when the request was issued.
    Star {
        /// Star index.
        index: usize,
        /// Full star content.
        star: Star,
    },
    /// The whole registry.
    Registry(Vec<CountryDefinition>),
}

/// A persist request ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistJob {
    /// Correlates the outcome with the tracker entry.
    pub id: RequestId,
    /// What to write.
    pub payload: PersistPayload,
}

/// The store's answer to a [`PersistJob`].
#[derive(Debug, Clone, PartialEq)]
pub struct PersistOutcome {
    /// Request id.
    pub id: RequestId,
    /// What was written.
    pub payload: PersistPayload,
    /// The store's answer.
    pub result: Result<(), StoreError>,
}

impl PersistJob {
    /// Send the job to `store`.
    pub async fn run<S: GalaxyStore>(self, store: &S) -> PersistOutcome {
        let result = match &self.payload {
            PersistPayload::Star { index, star } => store.update_star(*index, star).await,
            PersistPayload::Registry(countries) => store.put_countries(countries).await,
        };
        PersistOutcome {
            id: self.id,
            payload: self.payload,
            result,
        }
    }
}

impl EditorSession {
    /// Start a persist for every entity whose debounce has elapsed.
    pub fn begin_persists(&mut self) -> Vec<PersistJob> {
        let now = Instant::now();
        let mut jobs = Vec::new();
        for key in self.tracker.due(now) {
            let payload = match key {
                EntityKey::Star(index) => {
                    let Some(star) = self.galaxy.stars.get(index) else {
                        continue;
                    };
                    PersistPayload::Star {
                        index,
                        star: star.clone(),
                    }
                }
                EntityKey::Registry => {
                    PersistPayload::Registry(self.registry.countries().to_vec())
                }
            };
            let id = RequestId::new();
            self.tracker.begin(key, id);
            self.feedback.begin_loading();
            debug!(request = %id, ?key, "persist started");
            jobs.push(PersistJob { id, payload });
        }
        jobs
    }

    /// Apply the outcome of a persist request.
    pub fn complete(&mut self, outcome: PersistOutcome) {
        self.feedback.end_loading();
        let PersistOutcome {
            id,
            payload,
            result,
        } = outcome;
        match (result, payload) {
            (Ok(()), PersistPayload::Star { star, .. }) => {
                if let Some(index) = self.tracker.star_succeeded(id, star) {
                    info!(request = %id, star = index, "star saved");
                    self.feedback.set_status(STAR_SAVED);
                }
            }
            (Ok(()), PersistPayload::Registry(countries)) => {
                if self.tracker.registry_succeeded(id, countries) {
                    info!(request = %id, "countries saved");
                }
            }
            (Err(e), _) => {
                warn!(request = %id, error = %e, "persist failed, rolling back");
                match self.tracker.failed(id) {
                    Some(Rollback::Star { index, star }) => self.roll_back_star(index, star),
                    Some(Rollback::Registry(countries)) => {
                        self.registry = DivisionRegistry::new(countries);
                        self.drop_missing_divisions();
                        self.feedback.set_status(COUNTRIES_SAVE_FAILED);
                    }
                    None => debug!(request = %id, "failed request no longer tracked"),
                }
            }
        }
    }

    fn roll_back_star(&mut self, index: usize, star: Star) {
        if self.selected_star() == Some(index) {
            self.signature = Some(star.signature());
            if self.draft.is_some() {
                self.draft = Some(editable(&star, self.year));
            }
        }
        self.apply_star(index, star, Origin::Reconcile);
        self.feedback.set_status(STAR_SAVE_FAILED);
    }

    /// Persist everything due and wait for the answers.
    pub async fn sync<S: GalaxyStore>(&mut self, store: &S) {
        let jobs = self.begin_persists();
        if jobs.is_empty() {
            return;
        }
        let outcomes = futures::future::join_all(jobs.into_iter().map(|job| job.run(store))).await;
        for outcome in outcomes {
            self.complete(outcome);
        }
    }
}
