//! Index command implementation.

use crate::{config, embedder};
use anyhow::{Context, Result};
use smsearch_core::ingest::{ingest_into_redb, IngestReport};
use smsearch_core::storage::DistanceMetric;
use std::path::Path;
use tracing::info;

/// Builds (or rebuilds) the index from a `label<TAB>message` corpus file.
///
/// Messages are embedded with the model in `model_dir` when given, else
/// with the hashing embedder at `dimension`.
pub async fn execute_index(
    corpus: &Path,
    dimension: usize,
    metric: DistanceMetric,
    data_dir: Option<&Path>,
    model_dir: Option<&Path>,
) -> Result<IngestReport> {
    let db_path = config::database_path(data_dir)?;
    let embedder = embedder::for_indexing(dimension, model_dir)?;

    info!(
        "Indexing {} into {} ({}, dim {}, {})",
        corpus.display(),
        db_path.display(),
        embedder.model_id(),
        embedder.embedding_dim(),
        metric
    );
    ingest_into_redb(corpus, &db_path, &*embedder, metric)
        .await
        .with_context(|| format!("Failed to index {}", corpus.display()))
}
