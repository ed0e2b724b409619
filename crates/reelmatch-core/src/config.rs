//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `reelmatch.toml` + `reelmatch.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_VECTORIZER__MIN_DOCUMENT_FREQUENCY=2`).
//! Every setting has a default, so an empty figment yields a usable
//! [`Settings`]. Relative paths resolve against the directory of the config
//! file that was loaded.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
    env_name: String,
}

impl Config {
    /// Load `reelmatch.toml` (and the env overlay) from the working directory.
    pub fn load() -> Result<Self> {
        let base_dir = env::current_dir()
            .map_err(|e| Error::InvalidConfig(format!("cannot read working directory: {e}")))?;
        Self::load_in(&base_dir, "reelmatch.toml")
    }

    /// Load an explicit config file; its directory becomes the base for relative paths.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InvalidConfig(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidConfig(format!("bad config path {}", path.display())))?;
        Self::load_in(&base_dir, file_name)
    }

    fn load_in(base_dir: &Path, file_name: &str) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let stem = file_name.strip_suffix(".toml").unwrap_or(file_name);

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join(file_name)));
        let overlay = match env_name.as_str() {
            "dev" | "development" => Some("dev"),
            "prod" | "production" => Some("prod"),
            "test" | "testing" => Some("test"),
            _ => None,
        };
        if let Some(suffix) = overlay {
            figment = figment.merge(Toml::file(base_dir.join(format!("{stem}.{suffix}.toml"))));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment, base_dir: base_dir.to_path_buf(), env_name })
    }

    /// Wrap an already assembled figment, mostly for tests and embedding.
    pub fn from_figment(figment: Figment, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment),
            base_dir: base_dir.into(),
            env_name: "dev".to_string(),
        }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Extract and validate the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// `data.source` resolved against the config directory, if configured.
    pub fn data_source_path(&self) -> Result<Option<PathBuf>> {
        Ok(self.settings()?.data.source.map(|s| resolve_with_base(&self.base_dir, s)))
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Replace the environment name read from `RUST_ENV`.
    pub fn with_env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = env_name.into();
        self
    }

    pub fn is_production(&self) -> bool {
        matches!(self.env_name.as_str(), "prod" | "production")
    }

    /// Production needs a real catalogue. `source` is the path chosen after
    /// any command line override; `None` means the built-in sample.
    pub fn check_data_source(&self, source: Option<&Path>) -> Result<()> {
        if self.is_production() && source.is_none() {
            return Err(Error::InvalidConfig(
                "production requires a data source; the sample catalogue is for development".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataConfig,
    pub filter: FilterConfig,
    pub vectorizer: VectorizerConfig,
    pub similarity: SimilarityConfig,
    pub ranking: RankingConfig,
    pub enrich: EnrichConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.data.columns.text.is_empty() {
            return Err(Error::InvalidConfig(
                "data.columns.text must name at least one descriptive column".into(),
            ));
        }
        if self.vectorizer.min_document_frequency == 0 {
            return Err(Error::InvalidConfig(
                "vectorizer.min_document_frequency must be >= 1".into(),
            ));
        }
        if self.vectorizer.max_vocabulary_size == Some(0) {
            return Err(Error::InvalidConfig(
                "vectorizer.max_vocabulary_size must be >= 1 when set".into(),
            ));
        }
        if self.ranking.default_k == 0 {
            return Err(Error::InvalidConfig("ranking.default_k must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.ranking.min_score) {
            return Err(Error::InvalidConfig(format!(
                "ranking.min_score {} is outside [0, 1]",
                self.ranking.min_score
            )));
        }
        if let (Some(lo), Some(hi)) = (self.filter.year_min, self.filter.year_max) {
            if lo > hi {
                return Err(Error::InvalidConfig(format!(
                    "filter.year_min {lo} is after filter.year_max {hi}"
                )));
            }
        }
        if self.enrich.enabled && self.enrich.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::InvalidConfig(
                "enrich.enabled requires enrich.api_key (or APP_ENRICH__API_KEY)".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Pick by file extension: `.jsonl`/`.ndjson` are line-delimited.
    #[default]
    Auto,
    Json,
    JsonLines,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// File or directory to read; `None` falls back to the built-in sample.
    pub source: Option<String>,
    pub format: SourceFormat,
    pub columns: ColumnMapping,
}

/// Which source columns feed which item fields.
///
/// `text` order is the canonical-text concatenation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id: Option<String>,
    pub title: String,
    pub text: Vec<String>,
    pub metadata: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: Some("id".to_string()),
            title: "title".to_string(),
            text: vec!["genres".to_string(), "overview".to_string()],
            metadata: vec![
                "vote_average".to_string(),
                "vote_count".to_string(),
                "year".to_string(),
                "type".to_string(),
            ],
        }
    }
}

/// Row filters applied before positions are assigned. Unset means no filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_vote_count: Option<f64>,
    pub vote_count_column: String,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub year_column: String,
    /// Allowed content types, case-insensitive; empty allows all.
    pub kinds: Vec<String>,
    pub kind_column: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_vote_count: None,
            vote_count_column: "vote_count".to_string(),
            year_min: None,
            year_max: None,
            year_column: "year".to_string(),
            kinds: Vec::new(),
            kind_column: "type".to_string(),
        }
    }
}

impl FilterConfig {
    pub fn is_active(&self) -> bool {
        self.min_vote_count.is_some()
            || self.year_min.is_some()
            || self.year_max.is_some()
            || !self.kinds.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopWords {
    #[default]
    English,
    None,
    Custom(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub stop_words: StopWords,
    /// Minimum number of items a term must occur in.
    pub min_document_frequency: usize,
    /// Keep only the most frequent terms when set.
    pub max_vocabulary_size: Option<usize>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            stop_words: StopWords::English,
            min_document_frequency: 1,
            max_vocabulary_size: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityStrategy {
    /// Full matrix when it fits `max_matrix_bytes`, otherwise on demand.
    #[default]
    Auto,
    FullMatrix,
    OnDemand,
}

impl std::str::FromStr for SimilarityStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(Self::Auto),
            "full_matrix" | "full" => Ok(Self::FullMatrix),
            "on_demand" | "ondemand" => Ok(Self::OnDemand),
            other => Err(Error::InvalidConfig(format!("unknown similarity strategy '{other}'"))),
        }
    }
}

pub const DEFAULT_MAX_MATRIX_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub strategy: SimilarityStrategy,
    pub max_matrix_bytes: u64,
    /// Draw a progress bar while building the full matrix.
    pub show_progress: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            strategy: SimilarityStrategy::Auto,
            max_matrix_bytes: DEFAULT_MAX_MATRIX_BYTES,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub default_k: usize,
    /// Candidates scoring below this are dropped; 0.0 keeps everything.
    pub min_score: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { default_k: 10, min_score: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub enabled: bool,
    pub base_url: String,
    pub image_base_url: String,
    pub api_key: Option<String>,
    /// `movie` or `tv`, the path segment of the lookup endpoint.
    pub media_type: String,
    pub timeout_ms: u64,
    /// Upper bound on concurrent lookups per request.
    pub concurrency: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            api_key: None,
            media_type: "movie".to_string(),
            timeout_ms: 5_000,
            concurrency: 8,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
