//! Business-directory REST API client and the location resolver built on it.
//!
//! [`DirectoryClient`] is the production transport. Everything above it
//! talks to the [`DirectoryApi`] trait so the pipeline can be exercised
//! against in-memory doubles.

pub mod api;
pub mod client;
pub mod error;
pub mod locations;
pub mod posts;
pub mod types;

mod media;

pub use api::{account_resource, DirectoryApi};
pub use client::DirectoryClient;
pub use error::DirectoryError;
pub use locations::{
    build_location_map, resolve_location, LocationMap, LOCATION_PAGE_SIZE, MAX_LOCATION_PAGES,
};
pub use posts::{build_local_post, PostOptions};
pub use types::{
    Account, CallToAction, CreateMediaRequest, LocalPost, LocalPostMedia, LocalPostRequest,
    Location, LocationAssociation, LocationsPage, MediaItem, Money,
};
