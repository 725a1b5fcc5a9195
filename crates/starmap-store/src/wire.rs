//! Request and response bodies of the galaxy HTTP API.

use serde::{Deserialize, Serialize};
use starmap_types::{CountryDefinition, Galaxy, Star};

/// `PATCH /galaxy/star/{index}`.
#[derive(Debug, Serialize)]
pub struct UpdateStarBody<'a> {
    /// The full replacement record.
    pub star: &'a Star,
}

/// `POST /galaxy/star`. The store keeps the larger of its own and the
/// given bounds.
#[derive(Debug, Serialize)]
pub struct AddStarBody<'a> {
    /// The new star.
    pub star: &'a Star,
    /// Galaxy width including the new star.
    pub width: u32,
    /// Galaxy height including the new star.
    pub height: u32,
}

/// `POST /galaxy/hyperlane`.
#[derive(Debug, Serialize)]
pub struct HyperlaneBody {
    /// First endpoint.
    pub a: usize,
    /// Second endpoint.
    pub b: usize,
}

/// `PUT /galaxy/countries`.
#[derive(Debug, Serialize)]
pub struct CountriesBody<'a> {
    /// The whole registry.
    pub countries: &'a [CountryDefinition],
}

/// `POST /galaxy/generate-system`.
#[derive(Debug, Serialize)]
pub struct GenerateSystemBody<'a> {
    /// The galaxy the new star lives in.
    pub galaxy: &'a Galaxy,
    /// Index of the new star in `galaxy`.
    pub star_index: usize,
}

/// Response carrying the index of something just created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IndexResponse {
    /// The new entity's index.
    pub index: usize,
}
