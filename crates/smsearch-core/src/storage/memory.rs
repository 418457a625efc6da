//! In-memory record store.
//!
//! Holds the BM25 keyword index, the flat vector index and the record texts in
//! memory. Used directly in tests and as the query engine behind
//! [`RedbRecordStore`](super::RedbRecordStore).

use super::keyword_index::KeywordIndex;
use super::vector_index::{DistanceMetric, VectorIndex};
use super::{IndexManifest, RecordStore, StoreError, StoreHit};
use crate::search::types::{Record, RecordId};
use instant::Instant;
use std::collections::HashMap;
use tracing::{debug, info};

/// Record store whose indexes live entirely in memory.
///
/// Immutable once built: every query method takes `&self` and no interior
/// mutability is involved, so the store can be shared freely behind `Arc`.
pub struct InMemoryRecordStore {
    manifest: IndexManifest,
    /// Record text and embedding by id
    records: HashMap<RecordId, Record>,
    keyword_index: KeywordIndex,
    vector_index: VectorIndex,
}

impl InMemoryRecordStore {
    /// Builds both indexes over `records`.
    ///
    /// `manifest.record_count` is overwritten with the number of records.
    ///
    /// # Errors
    ///
    /// - `StoreError::DimensionMismatch` if a record embedding length differs
    ///   from `manifest.embedding_dim`
    /// - `StoreError::InvalidRecord` if two records share an id
    pub fn build(mut manifest: IndexManifest, records: Vec<Record>) -> Result<Self, StoreError> {
        let total_start = Instant::now();

        let mut by_id: HashMap<RecordId, Record> = HashMap::with_capacity(records.len());
        for record in records {
            if record.embedding.len() != manifest.embedding_dim {
                return Err(StoreError::DimensionMismatch {
                    expected: manifest.embedding_dim,
                    actual: record.embedding.len(),
                });
            }
            if by_id.contains_key(&record.id) {
                return Err(StoreError::InvalidRecord(format!(
                    "duplicate record id {}",
                    record.id
                )));
            }
            by_id.insert(record.id, record);
        }

        let texts: Vec<(RecordId, String)> = by_id
            .values()
            .map(|record| (record.id, record.text.clone()))
            .collect();
        let embeddings: Vec<(RecordId, Vec<f32>)> = by_id
            .values()
            .map(|record| (record.id, record.embedding.clone()))
            .collect();
        let dimension = manifest.embedding_dim;

        // The two indexes are independent; build them on separate threads.
        let (keyword_index, vector_index) = std::thread::scope(|s| {
            let bm25_handle = s.spawn(|| {
                let start = Instant::now();
                let index = KeywordIndex::from_texts(texts);
                debug!("Built BM25 index: {} records in {:?}", index.len(), start.elapsed());
                index
            });

            let vector_handle = s.spawn(|| {
                let start = Instant::now();
                let mut index = VectorIndex::new(dimension);
                for (id, embedding) in embeddings {
                    index.insert(id, embedding)?;
                }
                debug!(
                    "Built vector index: {} embeddings in {:?}",
                    index.len(),
                    start.elapsed()
                );
                Ok::<_, StoreError>(index)
            });

            let keyword_index = bm25_handle
                .join()
                .map_err(|_| StoreError::InvalidRecord("BM25 index build panicked".to_string()))?;
            let vector_index = vector_handle.join().map_err(|_| {
                StoreError::InvalidRecord("vector index build panicked".to_string())
            })??;
            Ok::<_, StoreError>((keyword_index, vector_index))
        })?;

        manifest.record_count = by_id.len();
        info!(
            "Built in-memory record store: {} records, dim {}, metric {} in {:?}",
            manifest.record_count,
            manifest.embedding_dim,
            manifest.metric,
            total_start.elapsed()
        );

        Ok(Self {
            manifest,
            records: by_id,
            keyword_index,
            vector_index,
        })
    }

    /// Convenience constructor for a store built with `metric` and `model_id`.
    pub fn from_records(
        embedding_dim: usize,
        metric: DistanceMetric,
        model_id: &str,
        records: Vec<Record>,
    ) -> Result<Self, StoreError> {
        Self::build(IndexManifest::new(embedding_dim, metric, model_id), records)
    }

    /// Iterates over every record, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    fn text_of(&self, id: RecordId) -> Result<String, StoreError> {
        self.records
            .get(&id)
            .map(|record| record.text.clone())
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")))
    }
}

#[async_trait::async_trait(?Send)]
impl RecordStore for InMemoryRecordStore {
    fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    async fn lexical_top_k(&self, query: &str, limit: usize) -> Result<Vec<StoreHit>, StoreError> {
        Ok(self.keyword_index.search(query, limit))
    }

    async fn vector_top_k(
        &self,
        embedding: &[f32],
        metric: DistanceMetric,
        limit: usize,
    ) -> Result<Vec<StoreHit>, StoreError> {
        self.vector_index
            .search(embedding, metric, limit)?
            .into_iter()
            .map(|(id, distance)| {
                Ok(StoreHit {
                    id,
                    text: self.text_of(id)?,
                    value: distance,
                })
            })
            .collect()
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        Ok(self.records.get(&id).cloned())
    }

    async fn record_count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }
}
