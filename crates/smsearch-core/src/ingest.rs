//! Corpus ingestion.
//!
//! Reads an SMS Spam Collection style file (`label<TAB>message` per line),
//! embeds every message and writes the records into a fresh index.
//!
//! # Example
//!
//! ```ignore
//! use smsearch_core::embedding::HashingEmbedder;
//! use smsearch_core::ingest::ingest_into_redb;
//! use smsearch_core::storage::DistanceMetric;
//!
//! let embedder = HashingEmbedder::new(256)?;
//! let report = ingest_into_redb("SMSSpamCollection", "records.redb", &embedder, DistanceMetric::Cosine).await?;
//! println!("indexed {} messages", report.records);
//! ```

use crate::embedding::Embedder;
use crate::error::IngestError;
use crate::search::types::{Record, RecordId};
use instant::Instant;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, instrument, warn};

#[cfg(feature = "redb-store")]
use crate::storage::{DistanceMetric, IndexManifest, RecordStore, RedbRecordStore};

/// One parsed corpus line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// Class label, e.g. `ham` or `spam`
    pub label: String,
    /// Message body
    pub text: String,
}

/// Summary of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records written to the index
    pub records: usize,
    /// Lines skipped as blank or malformed
    pub skipped_lines: usize,
    /// Record count per label
    pub labels: BTreeMap<String, usize>,
}

/// Parses `label<TAB>text` lines.
///
/// Both fields are trimmed; only the first tab separates them. Lines that are
/// blank, have no tab, or have an empty message are skipped with a warning.
/// Returns the entries and the number of skipped lines.
pub fn parse_corpus<R: BufRead>(reader: R) -> Result<(Vec<CorpusEntry>, usize), IngestError> {
    let mut entries = Vec::new();
    let mut skipped = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            skipped += 1;
            continue;
        }
        match line.split_once('\t') {
            Some((label, text)) if !text.trim().is_empty() => entries.push(CorpusEntry {
                label: label.trim().to_string(),
                text: text.trim().to_string(),
            }),
            _ => {
                warn!("Skipping malformed corpus line {}", index + 1);
                skipped += 1;
            }
        }
    }

    Ok((entries, skipped))
}

/// Reads and parses a corpus file.
pub fn read_corpus<P: AsRef<Path>>(path: P) -> Result<(Vec<CorpusEntry>, usize), IngestError> {
    let file = File::open(path.as_ref())?;
    parse_corpus(BufReader::new(file))
}

/// Embeds every entry in one batch and assigns sequential ids from 0.
#[instrument(skip_all, fields(entries = entries.len()))]
pub async fn build_records<E: Embedder + ?Sized>(
    entries: &[CorpusEntry],
    embedder: &E,
) -> Result<Vec<Record>, IngestError> {
    if entries.is_empty() {
        return Err(IngestError::EmptyCorpus);
    }

    let start = Instant::now();
    let texts: Vec<String> = entries.iter().map(|entry| entry.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    info!(
        "Embedded {} messages with {} in {:?}",
        embeddings.len(),
        embedder.model_id(),
        start.elapsed()
    );

    Ok(texts
        .into_iter()
        .zip(embeddings)
        .enumerate()
        .map(|(i, (text, embedding))| Record {
            id: RecordId::from_u64(i as u64),
            text,
            embedding,
        })
        .collect())
}

/// Builds a redb index at `db_path` from the corpus at `corpus_path`.
///
/// Any existing index at `db_path` is replaced.
#[cfg(feature = "redb-store")]
pub async fn ingest_into_redb<E: Embedder + ?Sized>(
    corpus_path: impl AsRef<Path>,
    db_path: impl AsRef<Path>,
    embedder: &E,
    metric: DistanceMetric,
) -> Result<IngestReport, IngestError> {
    let corpus_path = corpus_path.as_ref();
    info!("Reading corpus from {}", corpus_path.display());
    let (entries, skipped_lines) = read_corpus(corpus_path)?;

    let records = build_records(&entries, embedder).await?;

    let mut labels = BTreeMap::new();
    for entry in &entries {
        *labels.entry(entry.label.clone()).or_insert(0) += 1;
    }

    let manifest = IndexManifest::new(embedder.embedding_dim(), metric, embedder.model_id());
    let store = RedbRecordStore::create(db_path, manifest, records)?;

    Ok(IngestReport {
        records: store.manifest().record_count,
        skipped_lines,
        labels,
    })
}
