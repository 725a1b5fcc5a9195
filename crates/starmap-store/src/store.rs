//! The [`GalaxyStore`] contract the editor persists through.

use std::future::Future;

use starmap_types::{CountryDefinition, Galaxy, GalaxySnapshot, GeneratedSystem, Star};

use crate::error::StoreError;

/// The authoritative galaxy store.
///
/// Stars and lanes are addressed by position, exactly as the store keeps
/// them: deleting star `k` renumbers everything above it on the store side
/// too. Every call either succeeds or fails as a whole.
pub trait GalaxyStore: Send + Sync {
    /// Fetch the full galaxy, resource definitions and registry.
    fn fetch(&self) -> impl Future<Output = Result<GalaxySnapshot, StoreError>> + Send;

    /// Replace star `index` with `star`.
    fn update_star(
        &self,
        index: usize,
        star: &Star,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Append `star`, growing the galaxy to at least `width` x `height`.
    /// Returns the index the store gave it.
    fn add_star(
        &self,
        star: &Star,
        width: u32,
        height: u32,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Remove star `index` and every lane touching it.
    fn delete_star(&self, index: usize) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Join stars `a` and `b`. Returns the lane's index; joining two stars
    /// that are already joined returns the existing lane.
    fn add_hyperlane(
        &self,
        a: usize,
        b: usize,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Remove lane `index`.
    fn delete_hyperlane(&self, index: usize)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replace the whole division registry.
    fn put_countries(
        &self,
        countries: &[CountryDefinition],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Ask the system generator for a profile for star `star_index` of
    /// `galaxy`.
    fn generate_system(
        &self,
        galaxy: &Galaxy,
        star_index: usize,
    ) -> impl Future<Output = Result<GeneratedSystem, StoreError>> + Send;
}
