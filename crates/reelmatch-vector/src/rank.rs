//! Top-k selection over one row of similarity scores.
use std::cmp::Ordering;

use reelmatch_core::error::{Error, Result};
use reelmatch_core::types::{Neighbor, Position};

/// Descending score, then ascending position.
pub fn neighbor_order(a: &Neighbor, b: &Neighbor) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.position.cmp(&b.position))
}

/// Best `k` neighbors of `query`, never including `query` itself.
///
/// Every other score is a candidate, whatever its value; NaN sorts above
/// all numbers under [`f64::total_cmp`]. Kernels in this crate clamp to `[0, 1]`.
pub fn rank(scores: &[f64], query: Position, k: usize) -> Result<Vec<Neighbor>> {
    rank_with_threshold(scores, query, k, 0.0)
}

/// Like [`rank`], dropping candidates scoring below `min_score` first.
/// A `min_score` of zero or less keeps every candidate.
pub fn rank_with_threshold(
    scores: &[f64],
    query: Position,
    k: usize,
    min_score: f64,
) -> Result<Vec<Neighbor>> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be at least 1".into()));
    }
    if query >= scores.len() {
        return Err(Error::InvalidPosition { position: query, len: scores.len() });
    }
    let mut candidates: Vec<Neighbor> = scores
        .iter()
        .enumerate()
        .filter(|&(position, &score)| position != query && (min_score <= 0.0 || score >= min_score))
        .map(|(position, &score)| Neighbor { position, score })
        .collect();
    if candidates.len() > k {
        candidates.select_nth_unstable_by(k - 1, neighbor_order);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(neighbor_order);
    Ok(candidates)
}
