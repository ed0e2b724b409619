//! Similarity strategies, ranking and the artifact cache.
//!
//! Both strategies score with the same postings kernel (`postings`), so a
//! corpus can switch between them without changing any result.
pub mod cache;
pub mod full_matrix;
pub mod on_demand;
pub mod postings;
pub mod rank;
pub mod strategy;

pub use cache::{ArtifactKey, ArtifactSet, ArtifactStore};
pub use full_matrix::{FullMatrixIndex, SimilarityMatrix};
pub use on_demand::OnDemandIndex;
pub use rank::{rank, rank_with_threshold};
pub use strategy::{build_index, choose_strategy};
