// Embedding-distance search: embed the query, then rank every record by distance.

use super::deadline::with_deadline;
use super::ranking::{rank_by, SortOrder, TieBreak};
use super::types::{validate_dimension, validate_top_k, ScoredResult, SearchError, SearchMethod};
use crate::embedding::Embedder;
use crate::storage::RecordStore;
use instant::Instant;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Vector search component.
///
/// The query is embedded with the injected [`Embedder`], checked against the
/// dimension recorded in the store's manifest, and compared with every record
/// embedding using the manifest's distance metric. Results carry no score:
/// raw distances are not comparable across metrics and are kept internal.
pub struct VectorSearch<S: RecordStore + ?Sized, E: Embedder + ?Sized> {
    store: Arc<S>,
    embedder: Arc<E>,
    tie_break: TieBreak,
    timeout: Option<Duration>,
}

impl<S: RecordStore + ?Sized, E: Embedder + ?Sized> VectorSearch<S, E> {
    pub fn new(store: Arc<S>, embedder: Arc<E>) -> Self {
        Self {
            store,
            embedder,
            tie_break: TieBreak::default(),
            timeout: None,
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Default deadline, applied separately to the embedding call and the store query.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns at most `top_k` records closest to `query`, closest first.
    ///
    /// # Errors
    ///
    /// - `SearchError::InvalidArgument` if `top_k` is 0 (nothing is embedded)
    /// - `SearchError::Embedding` if the embedder rejects the query
    /// - `SearchError::DimensionMismatch` if the query embedding length differs
    ///   from the index dimension
    /// - `SearchError::StoreUnavailable` / `SearchError::Timeout` from the store query
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
        let embedding = with_deadline("query embedding", deadline, self.embedder.embed(query)).await?;
        validate_dimension(self.store.dimension(), embedding.len())?;
        let embed_time = start.elapsed();

        let metric = self.store.manifest().metric;
        let hits = with_deadline(
            "vector query",
            deadline,
            self.store.vector_top_k(&embedding, metric, top_k),
        )
        .await?;
        let candidates = hits.len();

        let results: Vec<ScoredResult> = rank_by(
            hits,
            |hit| (hit.value as f64, hit.id),
            SortOrder::Ascending,
            self.tie_break,
            top_k,
        )
        .into_iter()
        .map(|(rank, hit)| ScoredResult {
            method: SearchMethod::Vector,
            id: hit.id,
            text: hit.text,
            score: None,
            rank,
        })
        .collect();

        debug!(
            "Vector search ({}): {} candidates, {} results, embed {:?}, total {:?}",
            metric,
            candidates,
            results.len(),
            embed_time,
            start.elapsed()
        );
        Ok(results)
    }
}
