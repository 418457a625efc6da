//! Hybrid search engine combining lexical (BM25) and vector search.
//!
//! This module provides the [`HybridSearchEngine`], the public entry point of
//! the library. It owns one [`LexicalSearch`] and one [`VectorSearch`] over a
//! shared store and exposes three strategies:
//!
//! - [`lexical_search`](HybridSearchEngine::lexical_search) - BM25 relevance
//! - [`vector_search`](HybridSearchEngine::vector_search) - embedding distance
//! - [`hybrid_search`](HybridSearchEngine::hybrid_search) - both, merged with
//!   Reciprocal Rank Fusion
//!
//! # Hybrid flow
//!
//! 1. Validate parameters (no I/O happens for invalid input)
//! 2. Run lexical and vector search with `prefetch_k` candidates each,
//!    concurrently; either failing (or timing out) fails the whole call
//! 3. Lexical side empty: return the vector results, re-tagged as fused
//! 4. Otherwise fuse both rankings with RRF and keep the best `top_k`

#[cfg(test)]
mod tests;

use super::format::{FormattedResults, OutputFormat};
use super::fusion::{reciprocal_rank_fusion, vector_fallback};
use super::lexical::LexicalSearch;
use super::ranking::TieBreak;
use super::types::{validate_top_k, ScoredResult, SearchError};
use super::vector::VectorSearch;
use crate::config::{DEFAULT_PREFETCH_K, DEFAULT_RANK_CONSTANT, DEFAULT_TOP_K};
use crate::embedding::Embedder;
use crate::storage::RecordStore;
use instant::Instant;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Parameters of a hybrid query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridParams {
    /// Number of fused results to return (≥ 1)
    pub top_k: usize,
    /// Candidates fetched from each strategy (≥ `top_k`)
    pub prefetch_k: usize,
    /// RRF damping constant (≥ 1)
    pub rank_constant: u32,
    /// Deadline for each store query and the embedding call; `None` uses the
    /// engine default
    pub deadline: Option<Duration>,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            prefetch_k: DEFAULT_PREFETCH_K,
            rank_constant: DEFAULT_RANK_CONSTANT,
            deadline: None,
        }
    }
}

impl HybridParams {
    /// Default parameters returning `top_k` results.
    pub fn with_top_k(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }

    /// Checks the parameters without touching the store.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidArgument` if `top_k` or `rank_constant` is
    /// 0, or if `prefetch_k < top_k`.
    pub fn validate(&self) -> Result<(), SearchError> {
        validate_top_k(self.top_k)?;
        if self.prefetch_k < self.top_k {
            return Err(SearchError::InvalidArgument(format!(
                "prefetch_k ({}) must be at least top_k ({})",
                self.prefetch_k, self.top_k
            )));
        }
        if self.rank_constant == 0 {
            return Err(SearchError::InvalidArgument(
                "rank_constant must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Retrieval strategy selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchStrategy {
    Lexical,
    Vector,
    #[default]
    Hybrid,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Lexical => "lexical",
            SearchStrategy::Vector => "vector",
            SearchStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStrategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "bm25" | "keyword" => Ok(SearchStrategy::Lexical),
            "vector" | "semantic" => Ok(SearchStrategy::Vector),
            "hybrid" | "rrf" | "hybrid_rrf" => Ok(SearchStrategy::Hybrid),
            other => Err(SearchError::InvalidArgument(format!(
                "unsupported search method '{other}' (expected 'lexical', 'vector' or 'hybrid')"
            ))),
        }
    }
}

/// One query as requested by a caller: strategy, parameters and output shape.
///
/// For lexical and vector search only `params.top_k` and `params.deadline`
/// are used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub strategy: SearchStrategy,
    pub params: HybridParams,
    pub format: OutputFormat,
}

/// Hybrid search engine over a shared, read-only record store.
///
/// The store and embedder are constructed once by the caller and injected;
/// the engine holds no mutable state, so one instance can serve concurrent
/// queries.
///
/// # Example
///
/// ```ignore
/// use smsearch_core::search::{HybridParams, HybridSearchEngine};
///
/// let engine = HybridSearchEngine::new(store, embedder);
/// let results = engine
///     .hybrid_search("free prize", &HybridParams::with_top_k(5))
///     .await?;
/// ```
pub struct HybridSearchEngine<S: RecordStore + ?Sized, E: Embedder + ?Sized> {
    store: Arc<S>,
    lexical: LexicalSearch<S>,
    vector: VectorSearch<S, E>,
    tie_break: TieBreak,
    timeout: Option<Duration>,
}

impl<S: RecordStore + ?Sized, E: Embedder + ?Sized> HybridSearchEngine<S, E> {
    /// Creates an engine over `store`, embedding queries with `embedder`.
    ///
    /// Logs a warning if the embedder differs from the one recorded in the
    /// index manifest; vector queries then fail with
    /// `SearchError::DimensionMismatch` if the dimensions disagree.
    pub fn new(store: Arc<S>, embedder: Arc<E>) -> Self {
        let manifest = store.manifest();
        if embedder.model_id() != manifest.model_id {
            warn!(
                "Embedder '{}' differs from index model '{}'",
                embedder.model_id(),
                manifest.model_id
            );
        }
        if embedder.embedding_dim() != manifest.embedding_dim {
            warn!(
                "Embedder dimension {} differs from index dimension {}",
                embedder.embedding_dim(),
                manifest.embedding_dim
            );
        }
        info!(
            "Search engine ready: {} records, dim {}, metric {}",
            manifest.record_count, manifest.embedding_dim, manifest.metric
        );

        Self {
            lexical: LexicalSearch::new(store.clone()),
            vector: VectorSearch::new(store.clone(), embedder),
            store,
            tie_break: TieBreak::default(),
            timeout: None,
        }
    }

    /// Sets the tie-breaking policy for every strategy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self.lexical = self.lexical.with_tie_break(tie_break);
        self.vector = self.vector.with_tie_break(tie_break);
        self
    }

    /// Sets the default deadline applied to each store query and embedding call.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self.lexical = self.lexical.with_timeout(timeout);
        self.vector = self.vector.with_timeout(timeout);
        self
    }

    /// The underlying record store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// BM25 search; see [`LexicalSearch::search`].
    pub async fn lexical_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredResult>, SearchError> {
        self.lexical.search(query, top_k).await
    }

    /// Embedding-distance search; see [`VectorSearch::search`].
    pub async fn vector_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredResult>, SearchError> {
        self.vector.search(query, top_k).await
    }

    /// Lexical and vector search fused with Reciprocal Rank Fusion.
    ///
    /// Returns at most `params.top_k` results tagged `fused`. If the lexical
    /// side finds nothing, the vector results are returned unchanged apart
    /// from the tag (no score, original ranks).
    ///
    /// # Errors
    ///
    /// - `SearchError::InvalidArgument` for invalid `params`, before any I/O
    /// - any error of either sub-search; partial results are never fused
    #[instrument(skip_all, fields(query_len = query.len(), top_k = params.top_k, prefetch_k = params.prefetch_k))]
    pub async fn hybrid_search(
        &self,
        query: &str,
        params: &HybridParams,
    ) -> Result<Vec<ScoredResult>, SearchError> {
        params.validate()?;
        let deadline = params.deadline.or(self.timeout);

        let start = Instant::now();
        let (lexical, vector) = tokio::try_join!(
            self.lexical
                .search_with_deadline(query, params.prefetch_k, deadline),
            self.vector
                .search_with_deadline(query, params.prefetch_k, deadline),
        )?;
        debug!(
            "Hybrid candidates: {} lexical, {} vector in {:?}",
            lexical.len(),
            vector.len(),
            start.elapsed()
        );

        if lexical.is_empty() {
            debug!("No lexical match, falling back to vector ranking");
            return Ok(vector_fallback(vector, params.top_k));
        }

        Ok(reciprocal_rank_fusion(
            &lexical,
            &vector,
            params.top_k,
            params.rank_constant,
            self.tie_break,
        ))
    }

    /// Runs the requested strategy and shapes the results.
    ///
    /// The per-call deadline in `options.params` applies to every strategy.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<FormattedResults, SearchError> {
        let params = &options.params;
        let deadline = params.deadline.or(self.timeout);

        let results = match options.strategy {
            SearchStrategy::Lexical => {
                self.lexical
                    .search_with_deadline(query, params.top_k, deadline)
                    .await?
            }
            SearchStrategy::Vector => {
                self.vector
                    .search_with_deadline(query, params.top_k, deadline)
                    .await?
            }
            SearchStrategy::Hybrid => self.hybrid_search(query, params).await?,
        };

        Ok(options.format.format(&results))
    }
}
