//! BM25 keyword index for exact term matching.
//!
//! This module wraps the [`bm25`](https://crates.io/crates/bm25) crate to provide
//! the lexical half of the record store. BM25 (Best Matching 25) scores records
//! by query term frequency, inverse document frequency across the corpus, and
//! record length normalization.
//!
//! # Usage
//!
//! ```
//! use smsearch_core::search::RecordId;
//! use smsearch_core::storage::KeywordIndex;
//!
//! let index = KeywordIndex::from_texts(vec![
//!     (RecordId::from_u64(1), "rust programming language".to_string()),
//!     (RecordId::from_u64(2), "python scripting language".to_string()),
//! ]);
//!
//! let results = index.search("rust", 10);
//! assert_eq!(results[0].id, RecordId::from_u64(1));
//! ```

use super::{take_with_ties, StoreHit};
use crate::search::types::RecordId;
use bm25::{Document, Language, SearchEngine, SearchEngineBuilder};
use tracing::instrument;

/// BM25-based keyword index.
///
/// Built once from the full corpus so IDF statistics and the average record
/// length reflect every record. Tokenization is case-insensitive and uses
/// English stemming and stop words.
pub struct KeywordIndex {
    /// BM25 search engine keyed by raw record id
    search_engine: SearchEngine<u64>,
    /// Record count (tracked separately since the bm25 crate doesn't expose it)
    record_count: usize,
}

impl KeywordIndex {
    /// Builds an index over `(id, text)` pairs.
    #[instrument(skip_all)]
    pub fn from_texts(texts: Vec<(RecordId, String)>) -> Self {
        let record_count = texts.len();
        let documents: Vec<Document<u64>> = texts
            .into_iter()
            .map(|(id, contents)| Document {
                id: id.as_u64(),
                contents,
            })
            .collect();
        let search_engine =
            SearchEngineBuilder::<u64>::with_documents(Language::English, documents).build();

        Self {
            search_engine,
            record_count,
        }
    }

    /// Searches for records matching the query.
    ///
    /// Returns up to `limit` hits ranked by BM25 score descending, extended by
    /// any further hits tied with the last one. Records sharing no term with
    /// the query are not returned. Returns an empty vector if the query or the
    /// index is empty.
    pub fn search(&self, query: &str, limit: usize) -> Vec<StoreHit> {
        if self.record_count == 0 || limit == 0 {
            return Vec::new();
        }

        // Score every matching record so the tie group at the boundary is complete.
        let results = self.search_engine.search(query, self.record_count);

        let hits: Vec<StoreHit> = results
            .into_iter()
            .map(|result| StoreHit {
                id: RecordId::from_u64(result.document.id),
                text: result.document.contents,
                value: result.score,
            })
            .collect();

        take_with_ties(hits, limit, |hit| hit.value)
    }

    /// Returns the number of indexed records.
    pub fn len(&self) -> usize {
        self.record_count
    }

    /// Returns `true` if no records have been indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
