//! Content-addressed artifact cache.
//!
//! An [`ArtifactSet`] (corpus, vector space, similarity index) is keyed by a
//! blake3 hash of the corpus content, the vectorizer fingerprint and the
//! resolved similarity strategy. The store holds at most one set and replaces
//! it with a single pointer swap, so readers holding an `Arc` to the old set
//! keep a consistent view.
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use tracing::{debug, info};

use reelmatch_core::config::SimilarityConfig;
use reelmatch_core::error::{Error, Result};
use reelmatch_core::traits::{SimilarityIndex, Vectorizer};
use reelmatch_core::types::{Corpus, StrategyKind, VectorSpace};

use crate::strategy::{build_index, choose_strategy};

const KEY_VERSION: &str = "reelmatch-artifacts-v1";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    pub fn compute(corpus: &Corpus, vectorizer_fingerprint: &str, strategy: StrategyKind) -> Self {
        let mut hasher = blake3::Hasher::new();
        let mut field = |bytes: &[u8]| {
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        };
        field(KEY_VERSION.as_bytes());
        field(vectorizer_fingerprint.as_bytes());
        field(strategy.to_string().as_bytes());
        field(&(corpus.len() as u64).to_le_bytes());
        for item in corpus.items() {
            field(item.id.as_bytes());
            field(item.title.as_bytes());
            field(&(item.text_fields.len() as u64).to_le_bytes());
            for text in &item.text_fields {
                field(text.as_bytes());
            }
            for (name, value) in &item.metadata {
                field(name.as_bytes());
                field(value.to_string().as_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for logs.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a query needs, aligned by position.
pub struct ArtifactSet {
    key: ArtifactKey,
    corpus: Arc<Corpus>,
    space: Arc<VectorSpace>,
    index: Arc<dyn SimilarityIndex>,
}

impl ArtifactSet {
    /// Fails with `Schema` unless the space and index both have one row per item.
    pub fn assemble(
        key: ArtifactKey,
        corpus: Arc<Corpus>,
        space: Arc<VectorSpace>,
        index: Arc<dyn SimilarityIndex>,
    ) -> Result<Self> {
        if space.n_rows() != corpus.len() {
            return Err(Error::Schema(format!(
                "vector space has {} rows but corpus has {} items",
                space.n_rows(),
                corpus.len()
            )));
        }
        if index.len() != corpus.len() {
            return Err(Error::Schema(format!(
                "similarity index has {} rows but corpus has {} items",
                index.len(),
                corpus.len()
            )));
        }
        Ok(Self { key, corpus, space, index })
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    pub fn index(&self) -> &dyn SimilarityIndex {
        self.index.as_ref()
    }

    pub fn strategy(&self) -> StrategyKind {
        self.index.strategy()
    }
}

impl fmt::Debug for ArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactSet")
            .field("key", &self.key.short())
            .field("items", &self.corpus.len())
            .field("terms", &self.space.n_terms())
            .field("strategy", &self.index.strategy())
            .finish()
    }
}

pub struct ArtifactStore {
    vectorizer: Arc<dyn Vectorizer>,
    similarity: SimilarityConfig,
    current: RwLock<Option<Arc<ArtifactSet>>>,
    build_lock: Mutex<()>,
}

impl ArtifactStore {
    pub fn new(vectorizer: Arc<dyn Vectorizer>, similarity: SimilarityConfig) -> Self {
        Self { vectorizer, similarity, current: RwLock::new(None), build_lock: Mutex::new(()) }
    }

    pub fn similarity_config(&self) -> &SimilarityConfig {
        &self.similarity
    }

    pub fn key_for(&self, corpus: &Corpus) -> ArtifactKey {
        let strategy = choose_strategy(corpus.len(), &self.similarity);
        ArtifactKey::compute(corpus, &self.vectorizer.fingerprint(), strategy)
    }

    /// The published set, if any.
    pub fn current(&self) -> Option<Arc<ArtifactSet>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Return the published set when its key matches `corpus`, otherwise fit,
    /// build, publish and return a new one. Concurrent callers with the same
    /// corpus build once.
    pub fn current_or_build(&self, corpus: Corpus) -> Result<Arc<ArtifactSet>> {
        let key = self.key_for(&corpus);
        if let Some(set) = self.current().filter(|s| s.key == key) {
            debug!(key = set.key.short(), "artifact cache hit");
            return Ok(set);
        }

        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(set) = self.current().filter(|s| s.key == key) {
            debug!(key = set.key.short(), "artifact built by a concurrent caller");
            return Ok(set);
        }

        debug!(key = key.short(), "artifact cache miss");
        let set = Arc::new(self.build(corpus, key)?);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&set));
        Ok(set)
    }

    /// Build a set without publishing it.
    pub fn build(&self, corpus: Corpus, key: ArtifactKey) -> Result<ArtifactSet> {
        let start = Instant::now();
        let corpus = Arc::new(corpus);
        let space = Arc::new(self.vectorizer.fit(&corpus)?);
        let index = build_index(Arc::clone(&space), &self.similarity)?;
        let set = ArtifactSet::assemble(key, corpus, space, index)?;
        info!(
            key = set.key.short(),
            items = set.corpus.len(),
            terms = set.space.n_terms(),
            strategy = %set.strategy(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built artifact set"
        );
        Ok(set)
    }

    /// Drop the published set; the next query rebuilds.
    pub fn invalidate(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
