use std::collections::HashMap;

use crate::error::{EnrichError, EnrichResult};
use crate::provider::{EnrichmentProvider, ExternalDetails};

/// In-memory provider for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    entries: HashMap<String, ExternalDetails>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, external_id: impl Into<String>, details: ExternalDetails) -> Self {
        self.entries.insert(external_id.into(), details);
        self
    }
}

#[async_trait::async_trait]
impl EnrichmentProvider for StaticProvider {
    async fn fetch(&self, external_id: &str) -> EnrichResult<ExternalDetails> {
        self.entries
            .get(external_id)
            .cloned()
            .ok_or_else(|| EnrichError::NotFound(external_id.to_string()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
