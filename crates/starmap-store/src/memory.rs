//! An authoritative store held in process.
//!
//! Behaves like the HTTP store (positional renumbering on delete, lane
//! validation, idempotent lane creation, bounds that only grow) and adds
//! hooks for tests: failure injection, a request log, and direct access to
//! the stored snapshot to simulate another editor.

use std::collections::VecDeque;

use starmap_core::CoreError;
use starmap_core::structure;
use starmap_types::{CountryDefinition, Galaxy, GalaxySnapshot, GeneratedSystem, Star};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::store::GalaxyStore;

/// A request as seen by the [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    /// Full fetch.
    Fetch,
    /// Star replacement.
    UpdateStar {
        /// Target index.
        index: usize,
    },
    /// Star creation.
    AddStar,
    /// Star deletion.
    DeleteStar {
        /// Target index.
        index: usize,
    },
    /// Lane creation.
    AddHyperlane {
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
    },
    /// Lane deletion.
    DeleteHyperlane {
        /// Target index.
        index: usize,
    },
    /// Registry replacement.
    PutCountries,
    /// Generator call.
    GenerateSystem {
        /// Star the profile is for.
        star_index: usize,
    },
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: GalaxySnapshot,
    failures: VecDeque<StoreError>,
    requests: Vec<StoreRequest>,
    profile: Option<GeneratedSystem>,
}

impl Inner {
    /// Log `request` and consume an injected failure if one is queued.
    fn begin(&mut self, request: StoreRequest) -> Result<(), StoreError> {
        debug!(?request, "in-memory store request");
        self.requests.push(request);
        self.failures.pop_front().map_or(Ok(()), Err)
    }
}

/// Galaxy store backed by a snapshot in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

fn not_found(operation: &'static str, error: &CoreError) -> StoreError {
    StoreError::Rejected {
        operation,
        status: 404,
        body: error.to_string(),
    }
}

impl InMemoryStore {
    /// A store holding `snapshot`.
    pub fn new(snapshot: GalaxySnapshot) -> Self {
        Self {
            inner: RwLock::new(Inner {
                snapshot,
                ..Inner::default()
            }),
        }
    }

    /// Make the next request fail with `status`.
    pub async fn reject_next(&self, status: u16) {
        self.inner.write().await.failures.push_back(StoreError::Rejected {
            operation: "injected",
            status,
            body: "injected rejection".to_owned(),
        });
    }

    /// Make the next request fail as if the network were down.
    pub async fn fail_transport_next(&self) {
        self.inner.write().await.failures.push_back(StoreError::Transport {
            operation: "injected",
            message: "connection refused".to_owned(),
        });
    }

    /// Profile returned by the generator. Without one, generation is
    /// rejected with 503.
    pub async fn set_generated_profile(&self, profile: Option<GeneratedSystem>) {
        self.inner.write().await.profile = profile;
    }

    /// A copy of the stored snapshot.
    pub async fn snapshot(&self) -> GalaxySnapshot {
        self.inner.read().await.snapshot.clone()
    }

    /// Change the stored snapshot directly, as another editor would.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut GalaxySnapshot) -> R + Send) -> R {
        f(&mut self.inner.write().await.snapshot)
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<StoreRequest> {
        self.inner.read().await.requests.clone()
    }

    /// Requests received so far, clearing the log.
    pub async fn take_requests(&self) -> Vec<StoreRequest> {
        std::mem::take(&mut self.inner.write().await.requests)
    }
}

impl GalaxyStore for InMemoryStore {
    async fn fetch(&self) -> Result<GalaxySnapshot, StoreError> {
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::Fetch)?;
        Ok(inner.snapshot.clone())
    }

    async fn update_star(&self, index: usize, star: &Star) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::UpdateStar { index })?;
        let slot = inner
            .snapshot
            .galaxy
            .stars
            .get_mut(index)
            .ok_or_else(|| not_found("update star", &CoreError::StarNotFound { index }))?;
        *slot = star.clone();
        Ok(())
    }

    async fn add_star(&self, star: &Star, width: u32, height: u32) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::AddStar)?;
        let galaxy = &mut inner.snapshot.galaxy;
        galaxy.width = galaxy.width.max(width);
        galaxy.height = galaxy.height.max(height);
        galaxy.stars.push(star.clone());
        Ok(galaxy.stars.len().saturating_sub(1))
    }

    async fn delete_star(&self, index: usize) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::DeleteStar { index })?;
        structure::remove_star(&mut inner.snapshot.galaxy, index)
            .map(drop)
            .map_err(|e| not_found("delete star", &e))
    }

    async fn add_hyperlane(&self, a: usize, b: usize) -> Result<usize, StoreError> {
        let op = "add hyperlane";
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::AddHyperlane { a, b })?;
        let galaxy = &mut inner.snapshot.galaxy;
        if a == b {
            return Err(StoreError::Rejected {
                operation: op,
                status: 400,
                body: "Hyperlane endpoints must be different".to_owned(),
            });
        }
        if a >= galaxy.stars.len() || b >= galaxy.stars.len() {
            return Err(StoreError::Rejected {
                operation: op,
                status: 404,
                body: "Star index out of range".to_owned(),
            });
        }
        if let Some(existing) = galaxy.hyperlanes.iter().position(|l| l.joins(a, b)) {
            return Ok(existing);
        }
        structure::add_hyperlane(galaxy, a, b).map_err(|e| StoreError::Rejected {
            operation: op,
            status: 400,
            body: e.to_string(),
        })
    }

    async fn delete_hyperlane(&self, index: usize) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::DeleteHyperlane { index })?;
        structure::remove_hyperlane(&mut inner.snapshot.galaxy, index)
            .map(drop)
            .map_err(|e| not_found("delete hyperlane", &e))
    }

    async fn put_countries(&self, countries: &[CountryDefinition]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::PutCountries)?;
        inner.snapshot.countries = countries.to_vec();
        Ok(())
    }

    async fn generate_system(
        &self,
        galaxy: &Galaxy,
        star_index: usize,
    ) -> Result<GeneratedSystem, StoreError> {
        let op = "generate system";
        let mut inner = self.inner.write().await;
        inner.begin(StoreRequest::GenerateSystem { star_index })?;
        if star_index >= galaxy.stars.len() {
            return Err(StoreError::Rejected {
                operation: op,
                status: 400,
                body: format!("Invalid star index {star_index} or coordinates"),
            });
        }
        inner.profile.clone().ok_or_else(|| StoreError::Rejected {
            operation: op,
            status: 503,
            body: "generator unavailable".to_owned(),
        })
    }
}
