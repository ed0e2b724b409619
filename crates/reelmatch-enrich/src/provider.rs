use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EnrichResult;

/// A title as referenced by the external service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDetails {
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    /// The service's own recommendations, best first.
    pub recommendations: Vec<ExternalRef>,
}

/// Source of extra display data keyed by external id.
#[async_trait::async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn fetch(&self, external_id: &str) -> EnrichResult<ExternalDetails>;

    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// [`fetch`](Self::fetch) with every failure logged and mapped to `None`.
    async fn lookup_by_external_id(&self, external_id: &str) -> Option<ExternalDetails> {
        match self.fetch(external_id).await {
            Ok(details) => {
                debug!(
                    provider = self.name(),
                    id = external_id,
                    recommendations = details.recommendations.len(),
                    "enrichment lookup"
                );
                Some(details)
            }
            Err(e) => {
                warn!(
                    provider = self.name(),
                    id = external_id,
                    error = %e,
                    "enrichment lookup failed"
                );
                None
            }
        }
    }
}

/// Look up several ids with at most `concurrency` requests in flight.
/// Results keep the order of `ids`.
pub async fn lookup_many(
    provider: &dyn EnrichmentProvider,
    ids: &[String],
    concurrency: usize,
) -> Vec<Option<ExternalDetails>> {
    stream::iter(ids)
        .map(|id| provider.lookup_by_external_id(id))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
