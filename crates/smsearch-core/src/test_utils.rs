//! Test utilities for smsearch-core.
//!
//! Fake embedders and record stores shared by the unit tests. Only compiled
//! when running tests.

use crate::embedding::Embedder;
use crate::error::EmbeddingError;
use crate::search::types::{Record, RecordId};
use crate::storage::{
    DistanceMetric, InMemoryRecordStore, IndexManifest, RecordStore, StoreError, StoreHit,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const REWARD_WORDS: &[&str] = &["win", "won", "winner", "prize", "reward", "free", "claim"];
const CONTACT_WORDS: &[&str] = &["call", "me", "later", "phone", "text"];

/// Three-axis embedder: reward words, contact words, everything else.
///
/// Word counts per axis, L2-normalized. Gives the tests a "semantic" space
/// where "won" and "prize" are close without sharing any characters.
pub struct ConceptEmbedder;

impl ConceptEmbedder {
    pub fn vector(text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; 3];
        let mut words = 0;
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let axis = if REWARD_WORDS.contains(&word.as_str()) {
                0
            } else if CONTACT_WORDS.contains(&word.as_str()) {
                1
            } else {
                2
            };
            vector[axis] += 1.0;
            words += 1;
        }
        if words == 0 {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        Ok(vector.into_iter().map(|x| x / norm).collect())
    }
}

#[async_trait::async_trait(?Send)]
impl Embedder for ConceptEmbedder {
    fn model_id(&self) -> &str {
        "concept-test"
    }

    fn embedding_dim(&self) -> usize {
        3
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Self::vector(text)
    }
}

/// Embedder wrapper counting `embed` calls.
pub struct CountingEmbedder<E> {
    inner: E,
    calls: AtomicUsize,
}

impl<E: Embedder> CountingEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait(?Send)]
impl<E: Embedder> Embedder for CountingEmbedder<E> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn embedding_dim(&self) -> usize {
        self.inner.embedding_dim()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }
}

/// Embedder sleeping before every `embed` call.
pub struct SlowEmbedder<E> {
    inner: E,
    delay: Duration,
}

impl<E: Embedder> SlowEmbedder<E> {
    pub fn new(inner: E, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait::async_trait(?Send)]
impl<E: Embedder> Embedder for SlowEmbedder<E> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn embedding_dim(&self) -> usize {
        self.inner.embedding_dim()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        tokio::time::sleep(self.delay).await;
        self.inner.embed(text).await
    }
}

/// Embedder returning the same vector for any text.
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait::async_trait(?Send)]
impl Embedder for FixedEmbedder {
    fn model_id(&self) -> &str {
        "fixed-test"
    }

    fn embedding_dim(&self) -> usize {
        self.vector.len()
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vector.clone())
    }
}

/// Builds a record, embedding its text with [`ConceptEmbedder`].
pub fn concept_record(id: u64, text: &str) -> Record {
    Record {
        id: RecordId::from_u64(id),
        text: text.to_string(),
        embedding: ConceptEmbedder::vector(text).unwrap(),
    }
}

/// `{1: "win a free prize now", 2: "call me later", 3: "claim your free prize"}`
pub fn three_message_store() -> Arc<InMemoryRecordStore> {
    let records = vec![
        concept_record(1, "win a free prize now"),
        concept_record(2, "call me later"),
        concept_record(3, "claim your free prize"),
    ];
    Arc::new(
        InMemoryRecordStore::from_records(3, DistanceMetric::Cosine, "concept-test", records)
            .unwrap(),
    )
}

/// Store whose queries always fail.
pub struct FailingStore {
    manifest: IndexManifest,
}

impl FailingStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            manifest: IndexManifest::new(dimension, DistanceMetric::Cosine, "concept-test"),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl RecordStore for FailingStore {
    fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    async fn lexical_top_k(&self, _query: &str, _limit: usize) -> Result<Vec<StoreHit>, StoreError> {
        Err(StoreError::DatabaseError("connection refused".to_string()))
    }

    async fn vector_top_k(
        &self,
        _embedding: &[f32],
        _metric: DistanceMetric,
        _limit: usize,
    ) -> Result<Vec<StoreHit>, StoreError> {
        Err(StoreError::DatabaseError("connection refused".to_string()))
    }

    async fn get_record(&self, _id: RecordId) -> Result<Option<Record>, StoreError> {
        Err(StoreError::DatabaseError("connection refused".to_string()))
    }

    async fn record_count(&self) -> Result<usize, StoreError> {
        Err(StoreError::DatabaseError("connection refused".to_string()))
    }
}

/// Store delaying one kind of query before delegating.
pub struct SlowStore {
    inner: Arc<dyn RecordStore>,
    lexical_delay: Duration,
    vector_delay: Duration,
}

impl SlowStore {
    pub fn new(inner: Arc<dyn RecordStore>, lexical_delay: Duration, vector_delay: Duration) -> Self {
        Self {
            inner,
            lexical_delay,
            vector_delay,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl RecordStore for SlowStore {
    fn manifest(&self) -> &IndexManifest {
        self.inner.manifest()
    }

    async fn lexical_top_k(&self, query: &str, limit: usize) -> Result<Vec<StoreHit>, StoreError> {
        tokio::time::sleep(self.lexical_delay).await;
        self.inner.lexical_top_k(query, limit).await
    }

    async fn vector_top_k(
        &self,
        embedding: &[f32],
        metric: DistanceMetric,
        limit: usize,
    ) -> Result<Vec<StoreHit>, StoreError> {
        tokio::time::sleep(self.vector_delay).await;
        self.inner.vector_top_k(embedding, metric, limit).await
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        self.inner.get_record(id).await
    }

    async fn record_count(&self) -> Result<usize, StoreError> {
        self.inner.record_count().await
    }
}

/// Store counting every query it receives.
pub struct CountingStore {
    inner: Arc<dyn RecordStore>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total lexical, vector and lookup queries so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait(?Send)]
impl RecordStore for CountingStore {
    fn manifest(&self) -> &IndexManifest {
        self.inner.manifest()
    }

    async fn lexical_top_k(&self, query: &str, limit: usize) -> Result<Vec<StoreHit>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.lexical_top_k(query, limit).await
    }

    async fn vector_top_k(
        &self,
        embedding: &[f32],
        metric: DistanceMetric,
        limit: usize,
    ) -> Result<Vec<StoreHit>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.vector_top_k(embedding, metric, limit).await
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_record(id).await
    }

    async fn record_count(&self) -> Result<usize, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.record_count().await
    }
}
