//! Lexical (BM25) search over the record store.

use super::deadline::with_deadline;
use super::ranking::{rank_by, SortOrder, TieBreak};
use super::types::{validate_top_k, ScoredResult, SearchError, SearchMethod};
use crate::storage::RecordStore;
use instant::Instant;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Keyword search component.
///
/// Delegates relevance scoring to the store's BM25 query and owns the
/// ranking: ties on relevance are broken per [`TieBreak`] and ranks are
/// assigned 1..N after truncation to `top_k`.
pub struct LexicalSearch<S: RecordStore + ?Sized> {
    store: Arc<S>,
    tie_break: TieBreak,
    timeout: Option<Duration>,
}

impl<S: RecordStore + ?Sized> LexicalSearch<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            tie_break: TieBreak::default(),
            timeout: None,
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Default deadline for the store query.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns at most `top_k` records matching `query`, best first.
    ///
    /// Records sharing no term with the query are excluded, so a query with
    /// no match yields an empty vector rather than an error.
    ///
    /// # Errors
    ///
    /// - `SearchError::InvalidArgument` if `top_k` is 0 (no store call is made)
    /// - `SearchError::StoreUnavailable` if the store query fails
    /// - `SearchError::Timeout` if the store query exceeds the deadline
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredResult>, SearchError> {
        self.search_with_deadline(query, top_k, self.timeout).await
    }

    /// Like [`search`](Self::search) with an explicit deadline for this call.
    #[instrument(skip_all, fields(query_len = query.len(), top_k))]
    pub async fn search_with_deadline(
        &self,
        query: &str,
        top_k: usize,
        deadline: Option<Duration>,
    ) -> Result<Vec<ScoredResult>, SearchError> {
        validate_top_k(top_k)?;

        let start = Instant::now();
        let hits = with_deadline(
            "lexical query",
            deadline,
            self.store.lexical_top_k(query, top_k),
        )
        .await?;
        let candidates = hits.len();

        let results: Vec<ScoredResult> = rank_by(
            hits,
            |hit| (hit.value as f64, hit.id),
            SortOrder::Descending,
            self.tie_break,
            top_k,
        )
        .into_iter()
        .map(|(rank, hit)| ScoredResult {
            method: SearchMethod::Lexical,
            id: hit.id,
            text: hit.text,
            score: Some(hit.value),
            rank,
        })
        .collect();

        debug!(
            "Lexical search: {} candidates, {} results in {:?}",
            candidates,
            results.len(),
            start.elapsed()
        );
        Ok(results)
    }
}
