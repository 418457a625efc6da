use crate::error::EmbeddingError;
use crate::storage::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Returns the current Unix timestamp (seconds since UNIX_EPOCH).
///
/// Uses `instant::SystemTime` which provides cross-platform timing.
/// If the system time is before UNIX_EPOCH (extremely unlikely),
/// returns 0 instead of panicking.
pub fn get_current_timestamp() -> u64 {
    instant::SystemTime::now()
        .duration_since(instant::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Unique record identifier.
///
/// IDs are assigned once at ingestion time and never reused. They are stable
/// across queries, so callers may use them to correlate results from
/// different search methods.
///
/// # Examples
///
/// ```
/// use smsearch_core::search::RecordId;
///
/// let id = RecordId::from_u64(42);
/// assert_eq!(id.as_u64(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates a RecordId from a raw u64 value.
    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value of this ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable corpus entry.
///
/// Created once at ingestion and never mutated by the search path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record identifier
    pub id: RecordId,
    /// Message body
    pub text: String,
    /// Precomputed embedding (same dimension for every record)
    pub embedding: Vec<f32>,
}

/// Which retrieval strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// BM25 full-text relevance
    Lexical,
    /// Embedding distance
    Vector,
    /// Reciprocal Rank Fusion of lexical and vector rankings
    Fused,
}

impl SearchMethod {
    /// Stable lowercase label used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Lexical => "lexical",
            SearchMethod::Vector => "vector",
            SearchMethod::Fused => "fused",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ranked search result.
///
/// Constructed fresh per query call and never shared across calls. Within
/// one result set `rank` runs 1..=N without gaps and every `id` is unique.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    /// Strategy that produced this result
    pub method: SearchMethod,
    /// Record identifier
    pub id: RecordId,
    /// Denormalized copy of the record text
    pub text: String,
    /// BM25 relevance for lexical results, RRF score for fused results.
    /// Vector search does not expose its raw distance, so it is `None` there.
    pub score: Option<f32>,
    /// 1-based position within the result set
    pub rank: usize,
}

/// Error types for search operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Bad `top_k`, `prefetch_k`, `rank_constant` or output format.
    /// Always raised before any store or embedder call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Embedding model unavailable or rejected the input
    #[error("Embedding error: {0}")]
    Embedding(String),
    /// Query embedding length disagrees with the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension recorded in the index manifest
        expected: usize,
        /// Dimension of the query embedding
        actual: usize,
    },
    /// Record store unreachable or failed while answering a query
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),
    /// A store query or embedding call exceeded its deadline
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Which call timed out
        operation: &'static str,
        /// Deadline that was exceeded
        after: Duration,
    },
}

/// Validates that an embedding has the expected dimension.
///
/// Returns `Ok(())` if dimensions match, or `Err(SearchError::DimensionMismatch)` otherwise.
///
/// # Examples
///
/// ```
/// use smsearch_core::search::validate_dimension;
///
/// assert!(validate_dimension(3, 3).is_ok());
/// assert!(validate_dimension(5, 3).is_err());
/// ```
pub fn validate_dimension(expected: usize, actual: usize) -> Result<(), SearchError> {
    if actual == expected {
        Ok(())
    } else {
        Err(SearchError::DimensionMismatch { expected, actual })
    }
}

/// Validates a requested result count.
pub fn validate_top_k(top_k: usize) -> Result<(), SearchError> {
    if top_k == 0 {
        return Err(SearchError::InvalidArgument(
            "top_k must be at least 1".to_string(),
        ));
    }
    Ok(())
}

impl From<StoreError> for SearchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DimensionMismatch { expected, actual } => {
                SearchError::DimensionMismatch { expected, actual }
            }
            other => SearchError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<EmbeddingError> for SearchError {
    fn from(err: EmbeddingError) -> Self {
        SearchError::Embedding(err.to_string())
    }
}
