//! Hybrid search over short messages.
//!
//! This module implements three retrieval strategies over a [`RecordStore`]:
//! - **Lexical search** (exact term matching via BM25)
//! - **Vector search** (embedding distance to every record)
//! - **Reciprocal Rank Fusion** (RRF) of the two rankings
//!
//! # Architecture
//!
//! - `types`: Core types (RecordId, Record, ScoredResult, SearchError)
//! - `ranking`: Sorting with an explicit tie-breaking policy
//! - `lexical`: BM25 search component
//! - `vector`: Embedding-distance search component
//! - `fusion`: Reciprocal Rank Fusion and the lexical-miss fallback
//! - `engine`: HybridSearchEngine orchestrating the strategies
//! - `format`: Row and table output shapes
//!
//! # Usage
//!
//! ```ignore
//! use smsearch_core::embedding::HashingEmbedder;
//! use smsearch_core::search::{HybridParams, HybridSearchEngine};
//! use smsearch_core::storage::RedbRecordStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(RedbRecordStore::open("records.redb")?);
//! let embedder = Arc::new(HashingEmbedder::new(store.dimension())?);
//! let engine = HybridSearchEngine::new(store, embedder);
//!
//! let results = engine.hybrid_search("free prize", &HybridParams::with_top_k(5)).await?;
//! ```
//!
//! # Algorithm Details
//!
//! **Lexical Search (BM25)**:
//! - Term frequency-inverse document frequency scoring
//! - Records sharing no term with the query are excluded
//!
//! **Vector Search**:
//! - Exact scan with the metric recorded in the index manifest
//! - Raw distances stay internal; results carry rank only
//!
//! **Reciprocal Rank Fusion (RRF)**:
//! - Formula: `score = 1 / (k + rank)` summed over both lists, k=60 by default
//! - Records missing from one list get rank `1 + max rank seen`
//! - Merges rankings without normalizing incompatible score scales
//!
//! [`RecordStore`]: crate::storage::RecordStore

mod deadline;
mod engine;
pub mod format;
pub mod fusion;
mod lexical;
pub mod ranking;
pub mod types;
mod vector;

pub use deadline::with_deadline;
pub use engine::{HybridParams, HybridSearchEngine, SearchOptions, SearchStrategy};
pub use format::{
    FormattedResults, OutputFormat, ResultFormatter, ResultRow, ResultTable, RowFormatter,
    TableFormatter,
};
pub use fusion::{reciprocal_rank_fusion, vector_fallback, RRF_K};
pub use lexical::LexicalSearch;
pub use ranking::{SortOrder, TieBreak};
pub use types::{
    validate_dimension, validate_top_k, Record, RecordId, ScoredResult, SearchError, SearchMethod,
};
pub use vector::VectorSearch;
