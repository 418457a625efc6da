//! Production configuration constants.
//!
//! Defaults shared by the library, the CLI and the benchmarks.
//!
//! # Usage
//!
//! ```
//! use smsearch_core::config::{DEFAULT_EMBEDDING_DIM, DEFAULT_TOP_K};
//! use smsearch_core::embedding::HashingEmbedder;
//!
//! let embedder = HashingEmbedder::new(DEFAULT_EMBEDDING_DIM).unwrap();
//! assert!(DEFAULT_TOP_K > 0);
//! ```

use crate::storage::DistanceMetric;

// =============================================================================
// Query Defaults
// =============================================================================

/// Number of results returned when the caller doesn't ask for a count.
pub const DEFAULT_TOP_K: usize = 10;

/// Candidates fetched from each strategy before fusion.
///
/// Fusion can only surface records that made it into at least one of the two
/// candidate lists, so this is kept well above any realistic `top_k`.
pub const DEFAULT_PREFETCH_K: usize = 500;

/// Default RRF rank constant (see [`crate::search::fusion::RRF_K`]).
pub const DEFAULT_RANK_CONSTANT: u32 = crate::search::fusion::RRF_K;

// =============================================================================
// Index Defaults
// =============================================================================

/// Embedding dimension used when building a fresh index.
///
/// Only consulted at ingestion; queries validate against the dimension
/// recorded in the index manifest.
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Distance metric used when building a fresh index.
pub const DEFAULT_DISTANCE_METRIC: DistanceMetric = DistanceMetric::Cosine;

/// File name of the redb database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "records.redb";
