//! Search command implementation.
//!
//! Opens the existing index and runs one query with the requested strategy.

use crate::{config, embedder};
use anyhow::{anyhow, Context, Result};
use smsearch_core::search::{FormattedResults, HybridSearchEngine, SearchOptions};
use smsearch_core::storage::{RecordStore, RedbRecordStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Performs a search against the existing index.
///
/// This function:
/// 1. Opens the redb store (rebuilding the BM25 and vector indexes in memory)
/// 2. Creates the embedder the index was built with
/// 3. Runs the requested strategy and shapes the results
///
/// `options` must already be validated; see [`SearchOptions`].
pub async fn execute_search(
    query: &str,
    options: &SearchOptions,
    data_dir: Option<&Path>,
    model_dir: Option<&Path>,
) -> Result<FormattedResults> {
    let db_path = config::database_path(data_dir)?;

    if !db_path.exists() {
        return Err(anyhow!(
            "No index found at {}.\n\
             Build one first with `smsearch index <corpus>`.",
            db_path.display()
        ));
    }

    info!("Opening database: {}", db_path.display());
    let store = RedbRecordStore::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let record_count = store.manifest().record_count;
    if record_count == 0 {
        return Err(anyhow!(
            "Index is empty. Rebuild it with `smsearch index <corpus>`."
        ));
    }
    info!("Loaded index with {} records", record_count);

    let embedder = embedder::for_index(store.manifest(), model_dir)?;

    let engine = HybridSearchEngine::new(Arc::new(store), embedder);

    info!("Searching ({}) for: \"{}\"", options.strategy, query);
    let results = engine
        .search(query, options)
        .await
        .map_err(|e| anyhow!("Search failed: {}", e))?;

    info!("Found {} results", results.len());
    Ok(results)
}
