//! reelmatch-text
//!
//! Text analysis and TF-IDF fitting. `analyzer` wraps a tantivy token
//! pipeline; `vectorizer` turns a corpus into a sparse vector space.
pub mod analyzer;
pub mod vectorizer;

pub use analyzer::{build_analyzer, tokenize, ENGLISH_STOP_WORDS};
pub use vectorizer::TfidfVectorizer;
