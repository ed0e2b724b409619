use std::sync::Arc;

use tracing::{debug, info};

use reelmatch_core::config::{SimilarityConfig, SimilarityStrategy};
use reelmatch_core::error::Result;
use reelmatch_core::traits::SimilarityIndex;
use reelmatch_core::types::{StrategyKind, VectorSpace};

use crate::full_matrix::{FullMatrixIndex, SimilarityMatrix};
use crate::on_demand::OnDemandIndex;

/// Resolve `auto` against the memory budget; explicit choices pass through.
pub fn choose_strategy(n_items: usize, config: &SimilarityConfig) -> StrategyKind {
    match config.strategy {
        SimilarityStrategy::FullMatrix => StrategyKind::FullMatrix,
        SimilarityStrategy::OnDemand => StrategyKind::OnDemand,
        SimilarityStrategy::Auto => {
            let needed = SimilarityMatrix::bytes_for(n_items);
            let kind = if needed <= config.max_matrix_bytes {
                StrategyKind::FullMatrix
            } else {
                StrategyKind::OnDemand
            };
            debug!(
                items = n_items,
                needed,
                budget = config.max_matrix_bytes,
                strategy = %kind,
                "auto strategy"
            );
            kind
        }
    }
}

pub fn build_index(
    space: Arc<VectorSpace>,
    config: &SimilarityConfig,
) -> Result<Arc<dyn SimilarityIndex>> {
    let kind = choose_strategy(space.n_rows(), config);
    info!(strategy = %kind, items = space.n_rows(), "building similarity index");
    let index: Arc<dyn SimilarityIndex> = match kind {
        StrategyKind::FullMatrix => Arc::new(FullMatrixIndex::build(&space, config.show_progress)?),
        StrategyKind::OnDemand => Arc::new(OnDemandIndex::new(space)?),
    };
    Ok(index)
}
