use crate::error::Result;
use crate::types::{Corpus, Position, StrategyKind, Table, VectorSpace};

/// Anything that can produce a raw table of rows.
pub trait TableSource: Send + Sync {
    /// Human readable origin, used in logs and error messages.
    fn describe(&self) -> String;
    fn read(&self) -> Result<Table>;
}

pub trait Vectorizer: Send + Sync {
    fn fit(&self, corpus: &Corpus) -> Result<VectorSpace>;
    /// Stable description of every setting that influences `fit`.
    fn fingerprint(&self) -> String;
}

/// Query-to-corpus similarity over a fitted vector space.
///
/// `scores(p)` returns one score per corpus position, including `p` itself.
pub trait SimilarityIndex: Send + Sync {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn scores(&self, position: Position) -> Result<Vec<f64>>;
    fn strategy(&self) -> StrategyKind;
}
