//! Persistence for the star-map editor.
//!
//! The editor talks to the authoritative galaxy store through the
//! [`GalaxyStore`] trait. [`HttpGalaxyStore`] is the production client;
//! [`InMemoryStore`] keeps the same semantics in process for tests and
//! offline sessions.
//!
//! # Modules
//!
//! - [`store`] -- The `GalaxyStore` contract
//! - [`http`] -- reqwest client for the galaxy API
//! - [`memory`] -- In-process store with failure injection
//! - [`wire`] -- HTTP request/response bodies
//! - [`error`] -- Store errors

pub mod error;
pub mod http;
pub mod memory;
pub mod store;
pub mod wire;

pub use error::StoreError;
pub use http::HttpGalaxyStore;
pub use memory::{InMemoryStore, StoreRequest};
pub use store::GalaxyStore;
