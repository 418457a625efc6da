//! Record store abstractions and implementations.
//!
//! The search components never touch an index directly. They talk to a
//! [`RecordStore`], which exposes exactly two query capabilities:
//!
//! - a **lexical** top-K query (BM25 relevance over the record text)
//! - a **vector** top-K query (distance between a query embedding and every
//!   record embedding, using the metric recorded in the [`IndexManifest`])
//!
//! # Implementations
//!
//! - [`InMemoryRecordStore`] - indexes built in memory from a list of records
//! - [`RedbRecordStore`] - records persisted in a redb database, indexes
//!   rebuilt in memory on open (feature `redb-store`)
//!
//! # "With ties" semantics
//!
//! Both queries return at least `limit` hits (when that many exist) and then
//! keep going while the next hit ties the last one kept. The search layer
//! applies its tie-break draw over the whole tied group and truncates
//! afterwards, so no tied candidate is excluded by the store's own ordering.

mod keyword_index;
mod memory;
mod vector_index;

#[cfg(feature = "redb-store")]
mod redb_store;

pub use keyword_index::KeywordIndex;
pub use memory::InMemoryRecordStore;
pub use vector_index::{DistanceMetric, VectorIndex};

#[cfg(feature = "redb-store")]
pub use redb_store::RedbRecordStore;

use crate::search::types::{get_current_timestamp, Record, RecordId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key/database not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error (redb)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Record rejected while building an index
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Query vector does not match the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was built with
        expected: usize,
        /// Dimension of the offending vector
        actual: usize,
    },

    /// Index was written by an incompatible version
    #[error("Incompatible index: {0}")]
    Incompatible(String),
}

/// One hit returned by a store query.
///
/// `value` is the BM25 relevance for lexical queries (higher is better) and
/// the distance for vector queries (lower is better).
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    /// Matching record
    pub id: RecordId,
    /// Record text, denormalized to avoid a second lookup
    pub text: String,
    /// Relevance or distance, depending on the query
    pub value: f32,
}

/// Current schema version for the persisted index format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Index manifest describing how the record store was built.
///
/// The vector dimension the search path validates against comes from here,
/// so swapping the embedding model without re-indexing is caught as a
/// dimension mismatch instead of silently returning nonsense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Schema version of this index
    pub schema_version: u32,
    /// Embedding dimension shared by every record
    pub embedding_dim: usize,
    /// Distance metric the vector index was built for
    pub metric: DistanceMetric,
    /// Identifier of the embedding model used at ingestion
    pub model_id: String,
    /// Number of records in the index
    pub record_count: usize,
    /// Unix timestamp when the index was built
    pub created_at: u64,
}

impl IndexManifest {
    /// Creates a manifest for a fresh index.
    pub fn new(embedding_dim: usize, metric: DistanceMetric, model_id: impl Into<String>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            embedding_dim,
            metric,
            model_id: model_id.into(),
            record_count: 0,
            created_at: get_current_timestamp(),
        }
    }

    /// Checks if this index can be read by the current version.
    pub fn is_compatible(&self) -> bool {
        self.schema_version == CURRENT_SCHEMA_VERSION
    }
}

/// Read-only query capabilities over an immutable corpus.
///
/// Implementations are shared behind `Arc` and queried concurrently; none of
/// the methods mutate state.
#[async_trait::async_trait(?Send)]
pub trait RecordStore {
    /// Manifest describing the index (dimension, metric, model).
    fn manifest(&self) -> &IndexManifest;

    /// Embedding dimension every query vector must match.
    fn dimension(&self) -> usize {
        self.manifest().embedding_dim
    }

    /// BM25 relevance query over the record text.
    ///
    /// Returns hits ordered by relevance descending, with ties (see module
    /// docs). Records that do not match any query term are excluded.
    async fn lexical_top_k(&self, query: &str, limit: usize) -> Result<Vec<StoreHit>, StoreError>;

    /// Distance query against every record embedding.
    ///
    /// Returns hits ordered by distance ascending, with ties (see module docs).
    async fn vector_top_k(
        &self,
        embedding: &[f32],
        metric: DistanceMetric,
        limit: usize,
    ) -> Result<Vec<StoreHit>, StoreError>;

    /// Retrieves a record by ID.
    ///
    /// Returns `Ok(None)` if the record doesn't exist.
    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, StoreError>;

    /// Returns the number of records in the store.
    async fn record_count(&self) -> Result<usize, StoreError>;
}

/// Keeps the first `limit` entries of an already sorted list, plus every
/// following entry whose value equals the last one kept.
pub(crate) fn take_with_ties<T>(mut sorted: Vec<T>, limit: usize, value: impl Fn(&T) -> f32) -> Vec<T> {
    if limit == 0 {
        sorted.clear();
        return sorted;
    }
    if sorted.len() <= limit {
        return sorted;
    }

    let boundary = value(&sorted[limit - 1]);
    let mut end = limit;
    while end < sorted.len() && value(&sorted[end]) == boundary {
        end += 1;
    }
    sorted.truncate(end);
    sorted
}
