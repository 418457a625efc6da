//! Tests for the HybridSearchEngine.

use super::*;
use crate::search::types::{Record, RecordId, SearchMethod};
use crate::storage::{DistanceMetric, InMemoryRecordStore};
use crate::test_utils::{
    three_message_store, ConceptEmbedder, CountingEmbedder, CountingStore, FailingStore,
    FixedEmbedder, SlowEmbedder, SlowStore,
};
use std::collections::HashSet;

type TestEngine = HybridSearchEngine<dyn RecordStore, ConceptEmbedder>;

fn engine() -> TestEngine {
    let store: Arc<dyn RecordStore> = three_message_store();
    HybridSearchEngine::new(store, Arc::new(ConceptEmbedder)).with_tie_break(TieBreak::ById)
}

fn ids(results: &[ScoredResult]) -> Vec<u64> {
    results.iter().map(|r| r.id.as_u64()).collect()
}

fn id_set(results: &[ScoredResult]) -> HashSet<u64> {
    results.iter().map(|r| r.id.as_u64()).collect()
}

#[tokio::test]
async fn test_lexical_ranks_matches_above_non_matches() {
    let results = engine().lexical_search("free prize", 3).await.unwrap();
    assert_eq!(id_set(&results), HashSet::from([1, 3]));
    assert!(results.iter().all(|r| r.method == SearchMethod::Lexical));
}

#[tokio::test]
async fn test_vector_ranks_semantic_matches_first() {
    let results = engine()
        .vector_search("you have won a reward", 3)
        .await
        .unwrap();
    assert_eq!(ids(&results), vec![1, 3, 2]);
}

#[tokio::test]
async fn test_hybrid_returns_both_prize_messages() {
    let params = HybridParams {
        top_k: 2,
        prefetch_k: 10,
        ..HybridParams::default()
    };
    let results = engine().hybrid_search("free prize", &params).await.unwrap();

    assert_eq!(id_set(&results), HashSet::from([1, 3]));
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.method, SearchMethod::Fused);
        assert_eq!(result.rank, i + 1);
        assert!(result.score.is_some());
    }
}

#[tokio::test]
async fn test_hybrid_fused_size_is_min_of_top_k_and_union() {
    let params = HybridParams {
        top_k: 10,
        prefetch_k: 10,
        ..HybridParams::default()
    };
    // Lexical finds {1, 3}, vector ranks all three.
    let results = engine().hybrid_search("free prize", &params).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[2].id.as_u64(), 2);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_hybrid_falls_back_to_vector_when_no_lexical_match() {
    let engine = engine();
    let params = HybridParams {
        top_k: 2,
        prefetch_k: 10,
        ..HybridParams::default()
    };

    // Neither word occurs in the corpus.
    let query = "won reward";
    assert!(engine.lexical_search(query, 10).await.unwrap().is_empty());

    let vector = engine.vector_search(query, 10).await.unwrap();
    let hybrid = engine.hybrid_search(query, &params).await.unwrap();

    assert_eq!(hybrid.len(), 2);
    for (fused, plain) in hybrid.iter().zip(vector.iter()) {
        assert_eq!(fused.method, SearchMethod::Fused);
        assert_eq!(fused.id, plain.id);
        assert_eq!(fused.rank, plain.rank);
        assert_eq!(fused.text, plain.text);
        assert!(fused.score.is_none());
    }
}

#[tokio::test]
async fn test_invalid_params_perform_no_io() {
    let store = Arc::new(CountingStore::new(three_message_store()));
    let embedder = Arc::new(CountingEmbedder::new(ConceptEmbedder));
    let engine = HybridSearchEngine::new(store.clone(), embedder.clone());

    let invalid = [
        HybridParams {
            top_k: 0,
            ..HybridParams::default()
        },
        HybridParams {
            top_k: 10,
            prefetch_k: 5,
            ..HybridParams::default()
        },
        HybridParams {
            rank_constant: 0,
            ..HybridParams::default()
        },
    ];
    for params in &invalid {
        assert!(matches!(
            engine.hybrid_search("free prize", params).await,
            Err(SearchError::InvalidArgument(_))
        ));
    }
    assert!(matches!(
        engine.lexical_search("free prize", 0).await,
        Err(SearchError::InvalidArgument(_))
    ));
    assert!(matches!(
        engine.vector_search("free prize", 0).await,
        Err(SearchError::InvalidArgument(_))
    ));

    assert_eq!(store.calls(), 0);
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_prefetch_equal_to_top_k_is_accepted() {
    let params = HybridParams {
        top_k: 3,
        prefetch_k: 3,
        ..HybridParams::default()
    };
    assert!(engine().hybrid_search("free prize", &params).await.is_ok());
}

#[tokio::test]
async fn test_store_failure_fails_hybrid_call() {
    let engine = HybridSearchEngine::new(Arc::new(FailingStore::new(3)), Arc::new(ConceptEmbedder));
    let params = HybridParams::with_top_k(2);
    assert!(matches!(
        engine.hybrid_search("free prize", &params).await,
        Err(SearchError::StoreUnavailable(_))
    ));
}

#[tokio::test]
async fn test_embedding_failure_fails_hybrid_call() {
    let params = HybridParams::with_top_k(2);
    assert!(matches!(
        engine().hybrid_search("?!", &params).await,
        Err(SearchError::Embedding(_))
    ));
}

#[tokio::test]
async fn test_dimension_mismatch_fails_hybrid_call() {
    // Index built for 4 dimensions, embedder produces 3.
    let engine = HybridSearchEngine::new(Arc::new(FailingStore::new(4)), Arc::new(ConceptEmbedder));
    let result = engine.vector_search("free prize", 2).await;
    assert!(matches!(
        result,
        Err(SearchError::DimensionMismatch {
            expected: 4,
            actual: 3
        })
    ));
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let slow = SlowStore::new(
        three_message_store(),
        Duration::from_secs(5),
        Duration::ZERO,
    );
    let engine = HybridSearchEngine::new(Arc::new(slow), Arc::new(ConceptEmbedder))
        .with_timeout(Some(Duration::from_millis(20)));

    let result = engine
        .hybrid_search("free prize", &HybridParams::with_top_k(2))
        .await;
    assert!(matches!(
        result,
        Err(SearchError::Timeout {
            operation: "lexical query",
            ..
        })
    ));
}

#[tokio::test]
async fn test_per_call_deadline_overrides_engine_default() {
    let slow = SlowStore::new(
        three_message_store(),
        Duration::ZERO,
        Duration::from_secs(5),
    );
    let engine = HybridSearchEngine::new(Arc::new(slow), Arc::new(ConceptEmbedder));

    let params = HybridParams {
        deadline: Some(Duration::from_millis(20)),
        ..HybridParams::with_top_k(2)
    };
    assert!(matches!(
        engine.hybrid_search("free prize", &params).await,
        Err(SearchError::Timeout {
            operation: "vector query",
            ..
        })
    ));
}

#[tokio::test]
async fn test_slow_embedding_times_out() {
    let embedder = SlowEmbedder::new(ConceptEmbedder, Duration::from_secs(5));
    let engine = HybridSearchEngine::new(three_message_store(), Arc::new(embedder))
        .with_timeout(Some(Duration::from_millis(20)));

    assert!(matches!(
        engine.vector_search("free prize", 2).await,
        Err(SearchError::Timeout {
            operation: "query embedding",
            ..
        })
    ));
    assert!(matches!(
        engine
            .hybrid_search("free prize", &HybridParams::with_top_k(2))
            .await,
        Err(SearchError::Timeout {
            operation: "query embedding",
            ..
        })
    ));
}

/// Record 1 points the same way as the query but is far away; record 2 is
/// close but at an angle. Cosine prefers 1, Euclidean prefers 2.
async fn vector_ids_under(metric: DistanceMetric) -> Vec<u64> {
    let records = vec![
        Record {
            id: RecordId::from_u64(1),
            text: "far but aligned".to_string(),
            embedding: vec![10.0, 0.0],
        },
        Record {
            id: RecordId::from_u64(2),
            text: "near but angled".to_string(),
            embedding: vec![0.9, 0.3],
        },
    ];
    let store = InMemoryRecordStore::from_records(2, metric, "fixed-test", records).unwrap();
    let engine = HybridSearchEngine::new(
        Arc::new(store),
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
    );
    ids(&engine.vector_search("anything", 2).await.unwrap())
}

#[tokio::test]
async fn test_vector_search_uses_manifest_metric() {
    assert_eq!(vector_ids_under(DistanceMetric::Cosine).await, vec![1, 2]);
    assert_eq!(vector_ids_under(DistanceMetric::Euclidean).await, vec![2, 1]);
}

#[tokio::test]
async fn test_sub_searches_run_concurrently() {
    let delay = Duration::from_millis(200);
    let slow = SlowStore::new(three_message_store(), delay, delay);
    let engine = HybridSearchEngine::new(Arc::new(slow), Arc::new(ConceptEmbedder));

    let start = std::time::Instant::now();
    engine
        .hybrid_search("free prize", &HybridParams::with_top_k(2))
        .await
        .unwrap();
    // Sequential execution would take at least 2 * delay.
    assert!(start.elapsed() < delay * 2);
}

#[tokio::test]
async fn test_random_tie_break_keeps_result_set() {
    let store: Arc<dyn RecordStore> = three_message_store();
    let engine = HybridSearchEngine::new(store, Arc::new(ConceptEmbedder));
    let params = HybridParams {
        top_k: 2,
        prefetch_k: 10,
        ..HybridParams::default()
    };
    for _ in 0..10 {
        let results = engine.hybrid_search("free prize", &params).await.unwrap();
        assert_eq!(id_set(&results), HashSet::from([1, 3]));
    }
}

#[tokio::test]
async fn test_search_dispatches_strategy_and_format() {
    let engine = engine();

    let options = SearchOptions {
        strategy: SearchStrategy::Lexical,
        params: HybridParams::with_top_k(5),
        format: OutputFormat::Table,
    };
    let formatted = engine.search("later", &options).await.unwrap();
    match formatted {
        FormattedResults::Table(table) => {
            assert_eq!(table.id.len(), 1);
            assert_eq!(table.id[0].as_u64(), 2);
            assert_eq!(table.search_method, vec![SearchMethod::Lexical]);
        }
        other => panic!("expected table, got {other:?}"),
    }

    let options = SearchOptions {
        strategy: SearchStrategy::Vector,
        params: HybridParams::with_top_k(1),
        format: OutputFormat::Rows,
    };
    let rows = engine.search("call me", &options).await.unwrap().into_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].search_method, SearchMethod::Vector);
    assert!(rows[0].score.is_none());
}

#[test]
fn test_strategy_parsing() {
    assert_eq!(
        "BM25".parse::<SearchStrategy>().unwrap(),
        SearchStrategy::Lexical
    );
    assert_eq!(
        "semantic".parse::<SearchStrategy>().unwrap(),
        SearchStrategy::Vector
    );
    assert_eq!(
        "hybrid".parse::<SearchStrategy>().unwrap(),
        SearchStrategy::Hybrid
    );
    assert!(matches!(
        "fuzzy".parse::<SearchStrategy>(),
        Err(SearchError::InvalidArgument(_))
    ));
}

#[test]
fn test_default_params_are_valid() {
    let params = HybridParams::default();
    assert_eq!(params.top_k, 10);
    assert_eq!(params.prefetch_k, 500);
    assert_eq!(params.rank_constant, 60);
    assert!(params.validate().is_ok());
}
