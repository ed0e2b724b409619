use proptest::prelude::*;
use serde_json::{json, Value};

use reelmatch_core::config::{ColumnMapping, FilterConfig, StopWords, VectorizerConfig};
use reelmatch_core::loader::CorpusLoader;
use reelmatch_core::source::MemorySource;
use reelmatch_core::traits::Vectorizer;
use reelmatch_core::types::{Corpus, VectorSpace};
use reelmatch_core::Error;
use reelmatch_text::TfidfVectorizer;

fn corpus(rows: Vec<Value>) -> Corpus {
    let columns = ColumnMapping {
        text: vec!["genres".into(), "overview".into()],
        ..ColumnMapping::default()
    };
    let source = MemorySource::from_values("test", rows).expect("source");
    CorpusLoader::new(columns, FilterConfig::default()).load(&source).expect("corpus")
}

fn vectorizer(configure: impl FnOnce(&mut VectorizerConfig)) -> TfidfVectorizer {
    let mut config = VectorizerConfig::default();
    configure(&mut config);
    TfidfVectorizer::new(config)
}

fn dot(space: &VectorSpace, a: usize, b: usize) -> f64 {
    let (ra, rb) = (space.row(a).expect("row a"), space.row(b).expect("row b"));
    ra.iter()
        .filter_map(|(t, w)| rb.indices.binary_search(&t).ok().map(|j| w * rb.values[j]))
        .sum()
}

#[test]
fn shared_genre_gives_identical_rows_and_disjoint_rows_are_orthogonal() {
    let corpus = corpus(vec![
        json!({"id": 1, "title": "A", "genres": "Action"}),
        json!({"id": 2, "title": "B", "genres": "Action"}),
        json!({"id": 3, "title": "C", "genres": "Comedy"}),
    ]);
    let space = TfidfVectorizer::default().fit(&corpus).expect("fit");

    assert_eq!(space.vocabulary(), &["action".to_string(), "comedy".to_string()]);
    assert_eq!(space.n_rows(), 3);
    assert!((dot(&space, 0, 1) - 1.0).abs() < 1e-12);
    assert_eq!(dot(&space, 0, 2), 0.0);
    for p in 0..3 {
        assert!((space.row(p).expect("row").norm() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn idf_uses_smoothed_document_frequency() {
    let corpus = corpus(vec![
        json!({"id": 1, "title": "A", "genres": "Action Drama", "overview": ""}),
        json!({"id": 2, "title": "B", "genres": "Action", "overview": ""}),
        json!({"id": 3, "title": "C", "genres": "Comedy", "overview": ""}),
    ]);
    let space = TfidfVectorizer::default().fit(&corpus).expect("fit");
    let action = space.term_index("action").expect("action") as usize;
    let drama = space.term_index("drama").expect("drama") as usize;
    assert!((space.idf()[action] - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    assert!((space.idf()[drama] - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);

    // Rarer term weighs more within the same row.
    let row = space.row(0).expect("row");
    let weight = |t: usize| {
        row.iter().find(|(i, _)| *i as usize == t).map(|(_, w)| w).expect("term present")
    };
    assert!(weight(drama) > weight(action));
}

#[test]
fn stop_words_and_empty_text_yield_zero_rows_not_errors() {
    let corpus = corpus(vec![
        json!({"id": 1, "title": "A", "genres": "Thriller", "overview": "the and of"}),
        json!({"id": 2, "title": "B", "genres": null, "overview": null}),
    ]);
    let space = TfidfVectorizer::default().fit(&corpus).expect("fit");
    assert_eq!(space.vocabulary(), &["thriller".to_string()]);
    assert_eq!(space.row(1).expect("row").nnz(), 0);
    assert!(matches!(space.row(2), Err(Error::InvalidPosition { position: 2, len: 2 })));
}

#[test]
fn all_empty_text_is_an_empty_vocabulary_error() {
    let corpus = corpus(vec![
        json!({"id": 1, "title": "A", "genres": "", "overview": null}),
        json!({"id": 2, "title": "B", "genres": null, "overview": "   "}),
    ]);
    let err = TfidfVectorizer::default().fit(&corpus).expect_err("nothing to index");
    assert!(matches!(err, Error::EmptyVocabulary(_)), "{err}");
}

#[test]
fn min_document_frequency_and_max_vocabulary_prune_terms() {
    let corpus = corpus(vec![
        json!({"id": 1, "title": "A", "genres": "Action Crime", "overview": "heist heist"}),
        json!({"id": 2, "title": "B", "genres": "Action Drama", "overview": "heist"}),
        json!({"id": 3, "title": "C", "genres": "Comedy Drama", "overview": ""}),
    ]);

    let pruned = vectorizer(|c| c.min_document_frequency = 2).fit(&corpus).expect("fit");
    let expected = ["action".to_string(), "drama".to_string(), "heist".to_string()];
    assert_eq!(pruned.vocabulary(), &expected);

    let capped = vectorizer(|c| c.max_vocabulary_size = Some(2)).fit(&corpus).expect("fit");
    // heist (3 occurrences) then action/drama tie at 2, broken alphabetically.
    assert_eq!(capped.vocabulary(), &["action".to_string(), "heist".to_string()]);

    let strict = vectorizer(|c| c.min_document_frequency = 4);
    assert!(matches!(strict.fit(&corpus), Err(Error::EmptyVocabulary(_))));
}

#[test]
fn fingerprint_tracks_every_setting() {
    let base = TfidfVectorizer::default().fingerprint();
    assert_eq!(base, TfidfVectorizer::new(VectorizerConfig::default()).fingerprint());
    let no_stop = vectorizer(|c| c.stop_words = StopWords::None);
    let min_df = vectorizer(|c| c.min_document_frequency = 3);
    assert_ne!(base, no_stop.fingerprint());
    assert_ne!(base, min_df.fingerprint());
    assert_ne!(no_stop.fingerprint(), min_df.fingerprint());
}

proptest! {
    #[test]
    fn fitting_is_deterministic_and_rows_are_unit_or_empty(
        docs in prop::collection::vec("[a-e]{2,4}( [a-e]{2,4}){0,5}", 1..12)
    ) {
        let rows = docs
            .iter()
            .enumerate()
            .map(|(i, d)| json!({"id": i, "title": format!("t{i}"), "genres": d, "overview": ""}))
            .collect();
        let corpus = corpus(rows);
        let tfidf = vectorizer(|c| c.stop_words = StopWords::None);
        let first = tfidf.fit(&corpus).expect("fit");
        let second = tfidf.fit(&corpus).expect("refit");
        prop_assert_eq!(&first, &second);
        for p in 0..first.n_rows() {
            let row = first.row(p).expect("row");
            prop_assert!(row.nnz() == 0 || (row.norm() - 1.0).abs() < 1e-9);
            prop_assert!(row.values.iter().all(|w| *w > 0.0));
        }
    }
}
