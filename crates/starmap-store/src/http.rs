//! [`GalaxyStore`] over the galaxy HTTP API.
//!
//! Routes live under `{base_url}/galaxy`. Any non-2xx status is a
//! [`StoreError::Rejected`]; bodies of successful mutations other than the
//! created index are ignored.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use starmap_core::config::StoreConfig;
use starmap_types::{CountryDefinition, Galaxy, GalaxySnapshot, GeneratedSystem, Star};
use tracing::debug;

use crate::error::StoreError;
use crate::store::GalaxyStore;
use crate::wire::{
    AddStarBody, CountriesBody, GenerateSystemBody, HyperlaneBody, IndexResponse, UpdateStarBody,
};

/// HTTP client for the galaxy API.
#[derive(Debug, Clone)]
pub struct HttpGalaxyStore {
    client: Client,
    base_url: String,
}

impl HttpGalaxyStore {
    /// Create a client for the store at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if config.request_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(config.request_timeout_ms));
        }
        let client = builder.build().map_err(|e| StoreError::Transport {
            operation: "build client",
            message: e.to_string(),
        })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}/galaxy{path}", self.base_url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|e| StoreError::Transport {
            operation,
            message: e.to_string(),
        })?;

        let status = response.status();
        debug!(operation, status = status.as_u16(), "store responded");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(StoreError::Rejected {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, StoreError> {
        response.json().await.map_err(|e| StoreError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

impl GalaxyStore for HttpGalaxyStore {
    async fn fetch(&self) -> Result<GalaxySnapshot, StoreError> {
        let op = "fetch galaxy";
        let response = self.send(op, self.client.get(self.url(""))).await?;
        Self::decode(op, response).await
    }

    async fn update_star(&self, index: usize, star: &Star) -> Result<(), StoreError> {
        let request = self
            .client
            .patch(self.url(&format!("/star/{index}")))
            .json(&UpdateStarBody { star });
        self.send("update star", request).await.map(drop)
    }

    async fn add_star(&self, star: &Star, width: u32, height: u32) -> Result<usize, StoreError> {
        let op = "add star";
        let request = self.client.post(self.url("/star")).json(&AddStarBody {
            star,
            width,
            height,
        });
        let response = self.send(op, request).await?;
        Self::decode::<IndexResponse>(op, response)
            .await
            .map(|r| r.index)
    }

    async fn delete_star(&self, index: usize) -> Result<(), StoreError> {
        let request = self.client.delete(self.url(&format!("/star/{index}")));
        self.send("delete star", request).await.map(drop)
    }

    async fn add_hyperlane(&self, a: usize, b: usize) -> Result<usize, StoreError> {
        let op = "add hyperlane";
        let request = self
            .client
            .post(self.url("/hyperlane"))
            .json(&HyperlaneBody { a, b });
        let response = self.send(op, request).await?;
        Self::decode::<IndexResponse>(op, response)
            .await
            .map(|r| r.index)
    }

    async fn delete_hyperlane(&self, index: usize) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.url(&format!("/hyperlane/{index}")));
        self.send("delete hyperlane", request).await.map(drop)
    }

    async fn put_countries(&self, countries: &[CountryDefinition]) -> Result<(), StoreError> {
        let request = self
            .client
            .put(self.url("/countries"))
            .json(&CountriesBody { countries });
        self.send("save countries", request).await.map(drop)
    }

    async fn generate_system(
        &self,
        galaxy: &Galaxy,
        star_index: usize,
    ) -> Result<GeneratedSystem, StoreError> {
        let op = "generate system";
        let request = self
            .client
            .post(self.url("/generate-system"))
            .json(&GenerateSystemBody { galaxy, star_index });
        let response = self.send(op, request).await?;
        Self::decode(op, response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn urls_hang_off_the_galaxy_route() {
        let store = HttpGalaxyStore::new(&StoreConfig {
            base_url: "http://localhost:8000/".to_owned(),
            request_timeout_ms: 500,
        })
        .unwrap();
        assert_eq!(store.url(""), "http://localhost:8000/galaxy");
        assert_eq!(store.url("/star/4"), "http://localhost:8000/galaxy/star/4");
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let store = HttpGalaxyStore::new(&StoreConfig {
            base_url: "http://127.0.0.1:9".to_owned(),
            request_timeout_ms: 200,
        })
        .unwrap();
        let err = store.delete_star(0).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Transport {
                operation: "delete star",
                ..
            }
        ));
    }
}
