use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("no external record for id '{0}'")]
    NotFound(String),

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("invalid enrichment configuration: {0}")]
    InvalidConfig(String),
}

pub type EnrichResult<T> = std::result::Result<T, EnrichError>;
