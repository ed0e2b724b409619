//! TMDB-compatible provider.
//!
//! `GET {base}/{media}/{id}` supplies overview and poster path;
//! `GET {base}/{media}/{id}/recommendations` supplies the neighbor list.
//! A failed recommendations call leaves the list empty rather than
//! discarding the details.
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use reelmatch_core::config::EnrichConfig;

use crate::error::{EnrichError, EnrichResult};
use crate::provider::{EnrichmentProvider, ExternalDetails, ExternalRef};

#[derive(Debug, Deserialize)]
struct ApiDetails {
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    results: Vec<ApiResult>,
}

/// Movies carry `title`, shows carry `name`.
#[derive(Debug, Deserialize)]
struct ApiResult {
    id: serde_json::Value,
    title: Option<String>,
    name: Option<String>,
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    image_base_url: String,
    media_type: String,
}

impl TmdbProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> EnrichResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            image_base_url: EnrichConfig::default().image_base_url,
            media_type: "movie".to_string(),
        })
    }

    pub fn from_config(config: &EnrichConfig) -> EnrichResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EnrichError::InvalidConfig("enrich.api_key is not set".into()))?;
        if !matches!(config.media_type.as_str(), "movie" | "tv") {
            return Err(EnrichError::InvalidConfig(format!(
                "media_type must be movie or tv, got '{}'",
                config.media_type
            )));
        }
        Ok(Self::new(api_key, config.base_url.clone(), Duration::from_millis(config.timeout_ms))?
            .with_image_base_url(config.image_base_url.clone())
            .with_media_type(config.media_type.clone()))
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    fn poster_url(&self, poster_path: Option<String>) -> Option<String> {
        poster_path
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("{}/{}", self.image_base_url, p.trim_start_matches('/')))
    }

    async fn get_json<T: DeserializeOwned>(&self, external_id: &str, url: &str) -> EnrichResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(EnrichError::NotFound(external_id.to_string()));
        }
        if !status.is_success() {
            return Err(EnrichError::Status { status: status.as_u16(), url: url.to_string() });
        }
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| EnrichError::Malformed { url: url.to_string(), reason: e.to_string() })
    }
}

#[async_trait::async_trait]
impl EnrichmentProvider for TmdbProvider {
    async fn fetch(&self, external_id: &str) -> EnrichResult<ExternalDetails> {
        let id = external_id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(EnrichError::NotFound(external_id.to_string()));
        }

        let details_url = format!("{}/{}/{}", self.base_url, self.media_type, id);
        let details: ApiDetails = self.get_json(id, &details_url).await?;

        let recs_url = format!("{details_url}/recommendations");
        let recommendations = match self.get_json::<ApiPage>(id, &recs_url).await {
            Ok(page) => page
                .results
                .into_iter()
                .filter_map(|r| {
                    let id = match r.id {
                        serde_json::Value::Number(n) => n.to_string(),
                        serde_json::Value::String(s) => s,
                        _ => return None,
                    };
                    let title = r.title.or(r.name).unwrap_or_default();
                    Some(ExternalRef { id, title })
                })
                .collect(),
            Err(e) => {
                warn!(id, error = %e, "recommendations unavailable");
                Vec::new()
            }
        };

        debug!(id, recommendations = recommendations.len(), provider = "tmdb", "details fetched");
        Ok(ExternalDetails {
            overview: details.overview.filter(|o| !o.trim().is_empty()),
            poster_url: self.poster_url(details.poster_path),
            recommendations,
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_key_and_known_media_type() {
        let mut config = EnrichConfig::default();
        assert!(matches!(TmdbProvider::from_config(&config), Err(EnrichError::InvalidConfig(_))));
        config.api_key = Some("k".into());
        config.media_type = "anime".into();
        assert!(matches!(TmdbProvider::from_config(&config), Err(EnrichError::InvalidConfig(_))));
        config.media_type = "tv".into();
        assert!(TmdbProvider::from_config(&config).is_ok());
    }

    #[test]
    fn poster_url_joins_image_base() {
        let provider = TmdbProvider::new("k", "http://localhost/3/", Duration::from_secs(1))
            .expect("client")
            .with_image_base_url("http://img/w500/");
        let poster = provider.poster_url(Some("/abc.jpg".into()));
        assert_eq!(poster.as_deref(), Some("http://img/w500/abc.jpg"));
        assert_eq!(provider.poster_url(Some(" ".into())), None);
        assert_eq!(provider.base_url, "http://localhost/3");
    }
}
