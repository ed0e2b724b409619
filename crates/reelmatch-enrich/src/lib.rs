//! reelmatch-enrich
//!
//! Optional lookups against a TMDB-compatible HTTP API: overview, poster and
//! the service's own recommendation list for an external id. Failures stay
//! inside this crate as [`EnrichError`]; callers use
//! [`EnrichmentProvider::lookup_by_external_id`], which maps them to `None`.
pub mod error;
pub mod provider;
pub mod static_provider;
pub mod tmdb;

pub use error::EnrichError;
pub use provider::{lookup_many, EnrichmentProvider, ExternalDetails, ExternalRef};
pub use static_provider::StaticProvider;
pub use tmdb::TmdbProvider;
