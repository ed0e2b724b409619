use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use serde_json::{json, Value};

use reelmatch_core::config::{
    ColumnMapping, FilterConfig, SimilarityConfig, SimilarityStrategy, StopWords, VectorizerConfig,
};
use reelmatch_core::loader::CorpusLoader;
use reelmatch_core::source::MemorySource;
use reelmatch_core::traits::{SimilarityIndex, Vectorizer};
use reelmatch_core::types::{Corpus, StrategyKind, VectorSpace};
use reelmatch_core::Error;
use reelmatch_text::TfidfVectorizer;
use reelmatch_vector::{
    build_index, rank, ArtifactSet, ArtifactStore, FullMatrixIndex, OnDemandIndex,
};

fn corpus(rows: Vec<Value>) -> Corpus {
    let source = MemorySource::from_values("test", rows).expect("source");
    CorpusLoader::new(ColumnMapping::default(), FilterConfig::default())
        .load(&source)
        .expect("corpus")
}

fn abc() -> Corpus {
    corpus(vec![
        json!({"id": 1, "title": "A", "genres": "Action"}),
        json!({"id": 2, "title": "B", "genres": "Action"}),
        json!({"id": 3, "title": "C", "genres": "Comedy"}),
    ])
}

fn fit(corpus: &Corpus) -> Arc<VectorSpace> {
    let config = VectorizerConfig { stop_words: StopWords::None, ..VectorizerConfig::default() };
    Arc::new(TfidfVectorizer::new(config).fit(corpus).expect("fit"))
}

fn store(strategy: SimilarityStrategy) -> ArtifactStore {
    let similarity = SimilarityConfig { strategy, ..SimilarityConfig::default() };
    ArtifactStore::new(Arc::new(TfidfVectorizer::default()), similarity)
}

#[test]
fn shared_genre_ranks_first_and_unrelated_item_scores_zero() {
    let corpus = abc();
    let space = fit(&corpus);
    for index in [
        Arc::new(FullMatrixIndex::build(&space, false).expect("full")) as Arc<dyn SimilarityIndex>,
        Arc::new(OnDemandIndex::new(Arc::clone(&space)).expect("on demand")),
    ] {
        let scores = index.scores(0).expect("scores");
        let ranked = rank(&scores, 0, 2).expect("rank");
        let positions: Vec<usize> = ranked.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 2], "{}", index.strategy());
        assert!((ranked[0].score - 1.0).abs() < 1e-12);
        assert_eq!(ranked[1].score, 0.0);
    }
}

#[test]
fn out_of_range_positions_are_rejected_by_both_strategies() {
    let corpus = abc();
    let space = fit(&corpus);
    let full = FullMatrixIndex::build(&space, false).expect("full");
    let lazy = OnDemandIndex::new(space).expect("lazy");
    assert!(matches!(full.scores(3), Err(Error::InvalidPosition { position: 3, len: 3 })));
    assert!(matches!(lazy.scores(7), Err(Error::InvalidPosition { position: 7, len: 3 })));
}

#[test]
fn auto_strategy_falls_back_to_on_demand_over_budget() {
    let space = fit(&abc());
    let small = SimilarityConfig { max_matrix_bytes: 3 * 3 * 8, ..SimilarityConfig::default() };
    let index = build_index(Arc::clone(&space), &small).expect("index");
    assert_eq!(index.strategy(), StrategyKind::FullMatrix);
    let tight = SimilarityConfig { max_matrix_bytes: 3 * 3 * 8 - 1, ..SimilarityConfig::default() };
    assert_eq!(build_index(space, &tight).expect("index").strategy(), StrategyKind::OnDemand);
}

#[test]
fn assembling_misaligned_artifacts_is_a_schema_error() {
    let corpus = abc();
    let space = fit(&corpus);
    let other = corpus_of(4);
    let other_space = fit(&other);
    let index = build_index(Arc::clone(&other_space), &SimilarityConfig::default()).expect("index");
    let key = store(SimilarityStrategy::Auto).key_for(&corpus);

    let err = ArtifactSet::assemble(
        key.clone(),
        Arc::new(corpus.clone()),
        other_space,
        Arc::clone(&index),
    )
    .expect_err("rows differ");
    assert!(matches!(err, Error::Schema(_)), "{err}");
    let err =
        ArtifactSet::assemble(key, Arc::new(corpus), space, index).expect_err("index rows differ");
    assert!(matches!(err, Error::Schema(_)), "{err}");
}

fn corpus_of(n: usize) -> Corpus {
    let genres = ["Action", "Drama", "Comedy", "Horror"];
    corpus(
        (0..n)
            .map(|i| {
                json!({
                    "id": i,
                    "title": format!("t{i}"),
                    "genres": genres[i % genres.len()],
                    "overview": format!("story{}", i % 3)
                })
            })
            .collect(),
    )
}

#[test]
fn store_reuses_matching_artifacts_and_swaps_on_change() {
    let store = store(SimilarityStrategy::Auto);
    assert!(store.current().is_none());

    let first = store.current_or_build(corpus_of(6)).expect("build");
    let again = store.current_or_build(corpus_of(6)).expect("hit");
    assert!(Arc::ptr_eq(&first, &again), "same content reuses the published set");

    let changed = store.current_or_build(corpus_of(7)).expect("rebuild");
    assert_ne!(first.key(), changed.key());
    assert_eq!(first.corpus().len(), 6, "old readers keep their set");
    assert!(Arc::ptr_eq(&store.current().expect("published"), &changed));

    store.invalidate();
    assert!(store.current().is_none());
}

#[test]
fn key_depends_on_strategy_and_vectorizer_settings() {
    let corpus = corpus_of(5);
    let full = store(SimilarityStrategy::FullMatrix).key_for(&corpus);
    let lazy = store(SimilarityStrategy::OnDemand).key_for(&corpus);
    assert_ne!(full, lazy);

    let pruned = ArtifactStore::new(
        Arc::new(TfidfVectorizer::new(VectorizerConfig {
            min_document_frequency: 2,
            ..VectorizerConfig::default()
        })),
        SimilarityConfig {
            strategy: SimilarityStrategy::FullMatrix,
            ..SimilarityConfig::default()
        },
    );
    assert_ne!(full, pruned.key_for(&corpus));
    assert_eq!(full, store(SimilarityStrategy::FullMatrix).key_for(&corpus_of(5)));
    assert_eq!(full.as_str().len(), 64);
}

#[test]
fn concurrent_callers_share_one_build() {
    let store = Arc::new(store(SimilarityStrategy::Auto));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.current_or_build(corpus_of(8)).expect("build"))
        })
        .collect();
    let sets: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();
    for set in &sets[1..] {
        assert!(Arc::ptr_eq(&sets[0], set));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn strategies_agree_and_scores_are_symmetric(
        docs in prop::collection::vec("[a-f]{2,3}( [a-f]{2,3}){0,4}", 2..16),
        k in 1usize..20,
    ) {
        let rows = docs
            .iter()
            .enumerate()
            .map(|(i, d)| json!({"id": i, "title": format!("t{i}"), "genres": d, "overview": ""}))
            .collect();
        let corpus = corpus(rows);
        let space = fit(&corpus);
        let full = FullMatrixIndex::build(&space, false).expect("full");
        let lazy = OnDemandIndex::new(Arc::clone(&space)).expect("lazy");
        let n = corpus.len();

        for q in 0..n {
            let a = full.scores(q).expect("full row");
            let b = lazy.scores(q).expect("lazy row");
            for (x, y) in a.iter().zip(&b) {
                prop_assert!((x - y).abs() <= 1e-9);
                prop_assert!((0.0..=1.0).contains(x));
            }
            for j in 0..n {
                let qj = full.matrix().get(q, j).expect("qj");
                let jq = full.matrix().get(j, q).expect("jq");
                prop_assert!((qj - jq).abs() <= 1e-12);
            }

            let top_full = rank(&a, q, k).expect("rank full");
            let top_lazy = rank(&b, q, k).expect("rank lazy");
            prop_assert_eq!(top_full.len(), k.min(n - 1));
            prop_assert!(top_full.iter().all(|nb| nb.position != q));
            let pf: Vec<usize> = top_full.iter().map(|nb| nb.position).collect();
            let pl: Vec<usize> = top_lazy.iter().map(|nb| nb.position).collect();
            prop_assert_eq!(pf, pl);
        }
    }
}
