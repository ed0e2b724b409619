use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Empty vocabulary: {0}")]
    EmptyVocabulary(String),

    #[error("Invalid position {position}: corpus has {len} items")]
    InvalidPosition { position: usize, len: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification used by callers to tell bad data from bad queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input corpus is unusable; cached artifacts for it cannot be built.
    Data,
    /// The caller asked for something invalid; artifacts remain valid.
    Query,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DataSource(_) | Error::Schema(_) | Error::EmptyVocabulary(_) => ErrorKind::Data,
            Error::InvalidPosition { .. } | Error::InvalidArgument(_) | Error::NotFound(_) => {
                ErrorKind::Query
            }
            Error::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    pub fn is_caller_error(&self) -> bool {
        self.kind() == ErrorKind::Query
    }
}

pub type Result<T> = std::result::Result<T, Error>;
