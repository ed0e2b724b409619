//! Precomputed N x N similarity matrix for small corpora.
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use reelmatch_core::error::{Error, Result};
use reelmatch_core::traits::SimilarityIndex;
use reelmatch_core::types::{Position, StrategyKind, VectorSpace};

use crate::postings::Postings;

/// Dense row-major similarity matrix. Row `i` holds `score(i, j)` for every `j`.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Bytes a matrix over `n` items needs.
    pub fn bytes_for(n: usize) -> u64 {
        (n as u64).saturating_mul(n as u64).saturating_mul(8)
    }

    /// Compute every row in parallel. Uses the same row kernel as
    /// [`crate::on_demand::OnDemandIndex`], so both strategies agree exactly.
    pub fn build(space: &VectorSpace, show_progress: bool) -> Result<Self> {
        let start = Instant::now();
        let n = space.n_rows();
        let postings = Postings::build(space)?;

        let pb = if show_progress {
            let pb = ProgressBar::new(n as u64);
            let template = concat!(
                "{spinner:.green} [{elapsed_precise}] ",
                "[{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%)"
            );
            if let Ok(style) = ProgressStyle::default_bar().template(template) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        // One N x N allocation; each worker writes its row in place.
        let mut scores = vec![0.0f64; n * n];
        if n > 0 {
            scores.par_chunks_mut(n).enumerate().try_for_each(|(p, row)| {
                postings.score_row_into(space, p, row)?;
                pb.inc(1);
                Ok::<(), Error>(())
            })?;
        }
        pb.finish_and_clear();

        info!(
            items = n,
            bytes = Self::bytes_for(n),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built similarity matrix"
        );
        Ok(Self { n, scores })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn row(&self, position: Position) -> Result<&[f64]> {
        if position >= self.n {
            return Err(Error::InvalidPosition { position, len: self.n });
        }
        Ok(&self.scores[position * self.n..(position + 1) * self.n])
    }

    pub fn get(&self, a: Position, b: Position) -> Result<f64> {
        let row = self.row(a)?;
        row.get(b).copied().ok_or(Error::InvalidPosition { position: b, len: self.n })
    }
}

/// [`SimilarityIndex`] over a [`SimilarityMatrix`]; queries are slice copies.
#[derive(Debug, Clone)]
pub struct FullMatrixIndex {
    matrix: Arc<SimilarityMatrix>,
}

impl FullMatrixIndex {
    pub fn build(space: &VectorSpace, show_progress: bool) -> Result<Self> {
        Ok(Self { matrix: Arc::new(SimilarityMatrix::build(space, show_progress)?) })
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }
}

impl SimilarityIndex for FullMatrixIndex {
    fn len(&self) -> usize {
        self.matrix.len()
    }

    fn scores(&self, position: Position) -> Result<Vec<f64>> {
        Ok(self.matrix.row(position)?.to_vec())
    }

    fn strategy(&self) -> StrategyKind {
        StrategyKind::FullMatrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> VectorSpace {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        VectorSpace::from_rows(
            vec!["action".into(), "comedy".into(), "heist".into()],
            vec![1.0, 1.0, 1.0],
            vec![vec![(0, s), (2, s)], vec![(0, 1.0)], vec![(1, 1.0)], vec![]],
        )
        .expect("space")
    }

    #[test]
    fn rows_are_written_into_one_n_by_n_buffer() {
        let space = space();
        let matrix = SimilarityMatrix::build(&space, false).expect("matrix");
        assert_eq!(matrix.scores.len(), 16);
        assert_eq!(matrix.scores.capacity(), 16);

        let postings = Postings::build(&space).expect("postings");
        for p in 0..4 {
            assert_eq!(matrix.row(p).expect("row"), postings.score_row(&space, p).expect("scores"));
        }
        assert_eq!(matrix.get(3, 3).expect("empty row"), 0.0);
    }

    #[test]
    fn empty_space_builds_an_empty_matrix() {
        let space = VectorSpace::from_rows(vec!["a".into()], vec![1.0], vec![]).expect("space");
        let matrix = SimilarityMatrix::build(&space, false).expect("matrix");
        assert!(matrix.is_empty());
        assert!(matches!(matrix.row(0), Err(Error::InvalidPosition { position: 0, len: 0 })));
    }
}
