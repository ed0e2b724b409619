//! The query facade: resolve a title or id, score it against the corpus,
//! rank, and optionally decorate the results with external details.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reelmatch_core::config::{RankingConfig, Settings, SimilarityConfig};
use reelmatch_core::error::{Error, Result};
use reelmatch_core::traits::Vectorizer;
use reelmatch_core::types::{Corpus, Meta, Neighbor, Position, Recommendation};
use reelmatch_enrich::{lookup_many, EnrichmentProvider, ExternalDetails};
use reelmatch_text::TfidfVectorizer;
use reelmatch_vector::{rank_with_threshold, ArtifactSet, ArtifactStore};

/// A content-based recommendation plus whatever the external service knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub details: Option<ExternalDetails>,
}

/// An entry of the external service's recommendation list, matched back to
/// the corpus when its id is known locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecommendation {
    pub id: String,
    pub title: String,
    pub position: Option<Position>,
    pub metadata: Meta,
}

pub struct Recommender {
    store: ArtifactStore,
    ranking: RankingConfig,
    enricher: Option<Arc<dyn EnrichmentProvider>>,
    enrich_concurrency: usize,
}

impl Recommender {
    pub fn new(
        vectorizer: Arc<dyn Vectorizer>,
        similarity: SimilarityConfig,
        ranking: RankingConfig,
    ) -> Self {
        Self {
            store: ArtifactStore::new(vectorizer, similarity),
            ranking,
            enricher: None,
            enrich_concurrency: 1,
        }
    }

    /// TF-IDF recommender configured from `settings`; no enrichment attached.
    pub fn from_settings(settings: &Settings) -> Self {
        let vectorizer = Arc::new(TfidfVectorizer::new(settings.vectorizer.clone()));
        let mut recommender =
            Self::new(vectorizer, settings.similarity.clone(), settings.ranking.clone());
        recommender.enrich_concurrency = settings.enrich.concurrency.max(1);
        recommender
    }

    pub fn with_enricher(mut self, provider: Arc<dyn EnrichmentProvider>) -> Self {
        self.enricher = Some(provider);
        self
    }

    pub fn with_enrich_concurrency(mut self, concurrency: usize) -> Self {
        self.enrich_concurrency = concurrency.max(1);
        self
    }

    pub fn ranking(&self) -> &RankingConfig {
        &self.ranking
    }

    pub fn has_enricher(&self) -> bool {
        self.enricher.is_some()
    }

    /// Fit and publish artifacts for `corpus`, reusing them when its content
    /// is unchanged.
    pub fn load(&self, corpus: Corpus) -> Result<Arc<ArtifactSet>> {
        self.store.current_or_build(corpus)
    }

    pub fn artifacts(&self) -> Result<Arc<ArtifactSet>> {
        self.store
            .current()
            .ok_or_else(|| Error::DataSource("no corpus has been loaded".into()))
    }

    /// Ranked neighbors of the item at `position`.
    pub fn neighbors(&self, position: Position, k: usize) -> Result<Vec<Neighbor>> {
        let set = self.artifacts()?;
        neighbors_in(&set, position, k, self.ranking.min_score)
    }

    pub fn recommend(&self, title_or_id: &str, k: usize) -> Result<Vec<Recommendation>> {
        let set = self.artifacts()?;
        let position = set.corpus().resolve(title_or_id)?;
        let neighbors = neighbors_in(&set, position, k, self.ranking.min_score)?;
        let recommendations = neighbors
            .iter()
            .map(|n| {
                let item = set.corpus().item(n.position)?;
                Ok(Recommendation::from_item(item, n.score))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            query = title_or_id,
            position,
            k,
            results = recommendations.len(),
            strategy = %set.strategy(),
            "recommend"
        );
        Ok(recommendations)
    }

    /// [`recommend`](Self::recommend) with the configured default `k`.
    pub fn recommend_default(&self, title_or_id: &str) -> Result<Vec<Recommendation>> {
        self.recommend(title_or_id, self.ranking.default_k)
    }

    /// Content recommendations, each looked up on the external service.
    /// Lookups run after ranking; any failure leaves that entry's details empty.
    pub async fn recommend_enriched(
        &self,
        title_or_id: &str,
        k: usize,
    ) -> Result<Vec<EnrichedRecommendation>> {
        let recommendations = self.recommend(title_or_id, k)?;
        let details = match &self.enricher {
            Some(provider) => {
                let ids: Vec<String> = recommendations.iter().map(|r| r.id.clone()).collect();
                lookup_many(provider.as_ref(), &ids, self.enrich_concurrency).await
            }
            None => vec![None; recommendations.len()],
        };
        Ok(recommendations
            .into_iter()
            .zip(details)
            .map(|(recommendation, details)| EnrichedRecommendation { recommendation, details })
            .collect())
    }

    /// The external service's own recommendations for a corpus item.
    /// Resolution errors surface; provider failures yield an empty list.
    pub async fn recommend_external(
        &self,
        title_or_id: &str,
        k: usize,
    ) -> Result<Vec<ExternalRecommendation>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".into()));
        }
        let set = self.artifacts()?;
        let item = set.corpus().item(set.corpus().resolve(title_or_id)?)?;
        let Some(provider) = &self.enricher else {
            warn!(query = title_or_id, "no enrichment provider configured");
            return Ok(Vec::new());
        };
        let Some(details) = provider.lookup_by_external_id(&item.id).await else {
            return Ok(Vec::new());
        };

        let corpus = set.corpus();
        let results: Vec<ExternalRecommendation> = details
            .recommendations
            .into_iter()
            .filter(|r| r.id != item.id)
            .take(k)
            .map(|r| match corpus.position_of_id(&r.id).and_then(|p| corpus.get(p)) {
                Some(local) => ExternalRecommendation {
                    id: local.id.clone(),
                    title: local.title.clone(),
                    position: Some(local.position),
                    metadata: local.metadata.clone(),
                },
                None => ExternalRecommendation {
                    id: r.id,
                    title: r.title,
                    position: None,
                    metadata: Meta::new(),
                },
            })
            .collect();
        info!(
            query = title_or_id,
            provider = provider.name(),
            results = results.len(),
            in_corpus = results.iter().filter(|r| r.position.is_some()).count(),
            "external recommendations"
        );
        Ok(results)
    }
}

fn neighbors_in(
    set: &ArtifactSet,
    position: Position,
    k: usize,
    min_score: f64,
) -> Result<Vec<Neighbor>> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be at least 1".into()));
    }
    let scores = set.index().scores(position)?;
    rank_with_threshold(&scores, position, k, min_score)
}
