//! Row-at-a-time similarity for corpora too large for a full matrix.
use std::sync::Arc;

use reelmatch_core::error::Result;
use reelmatch_core::traits::SimilarityIndex;
use reelmatch_core::types::{Position, StrategyKind, VectorSpace};

use crate::postings::Postings;

/// Keeps the vector space plus its inverted index; each query costs
/// the sum of the posting list lengths of the query row's terms.
#[derive(Debug, Clone)]
pub struct OnDemandIndex {
    space: Arc<VectorSpace>,
    postings: Arc<Postings>,
}

impl OnDemandIndex {
    pub fn new(space: Arc<VectorSpace>) -> Result<Self> {
        let postings = Arc::new(Postings::build(&space)?);
        Ok(Self { space, postings })
    }

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }
}

impl SimilarityIndex for OnDemandIndex {
    fn len(&self) -> usize {
        self.space.n_rows()
    }

    fn scores(&self, position: Position) -> Result<Vec<f64>> {
        self.postings.score_row(&self.space, position)
    }

    fn strategy(&self) -> StrategyKind {
        StrategyKind::OnDemand
    }
}
