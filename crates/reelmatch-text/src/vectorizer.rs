//! TF-IDF fitting over the canonical text of a corpus.
//!
//! Weights follow the smoothed formulation: raw term count times
//! `ln((1 + N) / (1 + df)) + 1`, rows L2-normalized. Vocabulary columns are
//! sorted by term, so fitting the same corpus twice yields identical spaces.
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tantivy::tokenizer::TextAnalyzer;
use tracing::{debug, info};

use reelmatch_core::config::{StopWords, VectorizerConfig};
use reelmatch_core::error::{Error, Result};
use reelmatch_core::traits::Vectorizer;
use reelmatch_core::types::{Corpus, VectorSpace};

use crate::analyzer::{build_analyzer, stop_word_list, tokenize};

#[derive(Clone)]
pub struct TfidfVectorizer {
	config: VectorizerConfig,
	analyzer: TextAnalyzer,
}

impl TfidfVectorizer {
	pub fn new(config: VectorizerConfig) -> Self {
		let analyzer = build_analyzer(&config.stop_words);
		Self { config, analyzer }
	}

	pub fn config(&self) -> &VectorizerConfig {
		&self.config
	}

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		let mut analyzer = self.analyzer.clone();
		tokenize(&mut analyzer, text)
	}

	fn term_counts(analyzer: &mut TextAnalyzer, text: &str) -> BTreeMap<String, u32> {
		let mut counts = BTreeMap::new();
		for token in tokenize(analyzer, text) {
			*counts.entry(token).or_insert(0) += 1;
		}
		counts
	}

	/// Terms that survive `min_document_frequency` and `max_vocabulary_size`, sorted.
	fn select_vocabulary<'a>(
		&self,
		df: &BTreeMap<&'a str, usize>,
		total: &BTreeMap<&'a str, u64>,
	) -> Vec<&'a str> {
		let mut kept: Vec<&str> = df
			.iter()
			.filter(|(_, &d)| d >= self.config.min_document_frequency)
			.map(|(t, _)| *t)
			.collect();
		if let Some(max) = self.config.max_vocabulary_size {
			if kept.len() > max {
				let freq = |t: &str| total.get(t).copied().unwrap_or(0);
				kept.sort_by(|a, b| freq(b).cmp(&freq(a)).then_with(|| a.cmp(b)));
				kept.truncate(max);
				kept.sort_unstable();
			}
		}
		kept
	}
}

impl Default for TfidfVectorizer {
	fn default() -> Self {
		Self::new(VectorizerConfig::default())
	}
}

impl Vectorizer for TfidfVectorizer {
	fn fit(&self, corpus: &Corpus) -> Result<VectorSpace> {
		let start = Instant::now();
		let mut analyzer = self.analyzer.clone();
		let docs: Vec<BTreeMap<String, u32>> = corpus
			.items()
			.iter()
			.map(|item| Self::term_counts(&mut analyzer, &item.canonical_text()))
			.collect();

		let mut df: BTreeMap<&str, usize> = BTreeMap::new();
		let mut total: BTreeMap<&str, u64> = BTreeMap::new();
		for doc in &docs {
			for (term, &count) in doc {
				*df.entry(term.as_str()).or_insert(0) += 1;
				*total.entry(term.as_str()).or_insert(0) += u64::from(count);
			}
		}

		let vocabulary = self.select_vocabulary(&df, &total);
		if vocabulary.is_empty() {
			return Err(Error::EmptyVocabulary(format!(
				"{} items produced no terms ({} distinct before pruning, min_df={})",
				corpus.len(),
				df.len(),
				self.config.min_document_frequency
			)));
		}

		let n = corpus.len() as f64;
		let mut column: HashMap<&str, u32> = HashMap::with_capacity(vocabulary.len());
		let mut idf = Vec::with_capacity(vocabulary.len());
		for (i, term) in vocabulary.iter().enumerate() {
			let index = u32::try_from(i)
				.map_err(|_| Error::Schema(format!("vocabulary exceeds {} terms", u32::MAX)))?;
			column.insert(*term, index);
			let d = df.get(term).copied().unwrap_or(0) as f64;
			idf.push(((1.0 + n) / (1.0 + d)).ln() + 1.0);
		}

		let mut empty_rows = 0usize;
		let rows: Vec<Vec<(u32, f64)>> = docs
			.iter()
			.map(|doc| {
				// BTreeMap order matches vocabulary order, so indices come out ascending.
				let mut row: Vec<(u32, f64)> = doc
					.iter()
					.filter_map(|(term, &count)| {
						let &i = column.get(term.as_str())?;
						Some((i, f64::from(count) * idf[i as usize]))
					})
					.collect();
				let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
				if norm > 0.0 {
					for (_, w) in &mut row {
						*w /= norm;
					}
				} else {
					empty_rows += 1;
				}
				row
			})
			.collect();

		let vocabulary: Vec<String> = vocabulary.into_iter().map(str::to_string).collect();
		let space = VectorSpace::from_rows(vocabulary, idf, rows)?;
		if empty_rows > 0 {
			debug!(items = empty_rows, "items without any vocabulary term");
		}
		info!(
			items = space.n_rows(),
			terms = space.n_terms(),
			nnz = space.nnz(),
			elapsed_ms = start.elapsed().as_millis() as u64,
			"fitted tf-idf vector space"
		);
		Ok(space)
	}

	fn fingerprint(&self) -> String {
		let stop = match &self.config.stop_words {
			StopWords::English => "english".to_string(),
			StopWords::None => "none".to_string(),
			custom @ StopWords::Custom(_) => {
				format!("custom[{}]", stop_word_list(custom).join(","))
			}
		};
		format!(
			"tfidf-v1;stop={stop};min_df={};max_vocab={}",
			self.config.min_document_frequency,
			self.config.max_vocabulary_size.map_or_else(|| "none".to_string(), |m| m.to_string())
		)
	}
}
