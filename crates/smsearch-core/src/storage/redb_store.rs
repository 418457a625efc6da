//! Redb-backed record store.
//!
//! Uses [redb](https://github.com/cberner/redb), a pure Rust, ACID-compliant,
//! embedded B-tree database, to persist the corpus produced by ingestion.
//! Query indexes are not persisted: on open, every record is loaded and the
//! BM25 and vector indexes are rebuilt in memory.
//!
//! # Tables
//!
//! - `records`: RecordId (u64) -> `{id, text}` (JSON)
//! - `embeddings`: RecordId (u64) -> `Vec<f32>` (raw bytes, little-endian)
//! - `metadata`: key (string) -> value (JSON) - stores the index manifest

use super::memory::InMemoryRecordStore;
use super::vector_index::DistanceMetric;
use super::{IndexManifest, RecordStore, StoreError, StoreHit};
use crate::search::types::{Record, RecordId};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

const RECORDS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("records");
const EMBEDDINGS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("embeddings");
const METADATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("metadata");

const MANIFEST_KEY: &str = "manifest";

/// Text half of a record as stored on disk (the embedding lives in its own table).
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    id: RecordId,
    text: String,
}

/// Record store persisted in a redb database.
///
/// Queries are answered by an [`InMemoryRecordStore`] hydrated at open time;
/// [`get_record`](RecordStore::get_record) reads through to the database.
///
/// # Example
///
/// ```ignore
/// use smsearch_core::storage::RedbRecordStore;
///
/// let store = RedbRecordStore::open("./data/records.redb")?;
/// let hits = store.lexical_top_k("free prize", 10).await?;
/// ```
pub struct RedbRecordStore {
    db: Arc<Database>,
    inner: InMemoryRecordStore,
}

impl RedbRecordStore {
    /// Creates (or overwrites) a database at `path` holding `records`.
    ///
    /// Any previous contents are dropped first, so the result always reflects
    /// exactly the given corpus.
    pub fn create<P: AsRef<Path>>(
        path: P,
        manifest: IndexManifest,
        records: Vec<Record>,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::IoError(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let db = Database::create(path)
            .map_err(|e| StoreError::DatabaseError(format!("Failed to open database: {}", e)))?;

        // Build the indexes first so invalid records never reach disk.
        let inner = InMemoryRecordStore::build(manifest, records)?;
        let manifest = inner.manifest().clone();

        let write_txn = db.begin_write().map_err(|e| {
            StoreError::DatabaseError(format!("Failed to begin write transaction: {}", e))
        })?;
        write_txn
            .delete_table(RECORDS_TABLE)
            .and_then(|_| write_txn.delete_table(EMBEDDINGS_TABLE))
            .and_then(|_| write_txn.delete_table(METADATA_TABLE))
            .map_err(|e| StoreError::DatabaseError(format!("Failed to drop tables: {}", e)))?;
        {
            let mut records_table = write_txn.open_table(RECORDS_TABLE).map_err(|e| {
                StoreError::DatabaseError(format!("Failed to create records table: {}", e))
            })?;
            let mut embeddings_table = write_txn.open_table(EMBEDDINGS_TABLE).map_err(|e| {
                StoreError::DatabaseError(format!("Failed to create embeddings table: {}", e))
            })?;
            let mut metadata_table = write_txn.open_table(METADATA_TABLE).map_err(|e| {
                StoreError::DatabaseError(format!("Failed to create metadata table: {}", e))
            })?;

            for record in inner.records() {
                let bytes = Self::serialize_record(&StoredRecord {
                    id: record.id,
                    text: record.text.clone(),
                })?;
                records_table
                    .insert(record.id.as_u64(), bytes.as_slice())
                    .map_err(|e| {
                        StoreError::DatabaseError(format!("Failed to put record: {}", e))
                    })?;

                let embedding = Self::serialize_embedding(&record.embedding);
                embeddings_table
                    .insert(record.id.as_u64(), embedding.as_slice())
                    .map_err(|e| {
                        StoreError::DatabaseError(format!("Failed to put embedding: {}", e))
                    })?;
            }

            let manifest_bytes = serde_json::to_vec(&manifest).map_err(|e| {
                StoreError::SerializationError(format!("Failed to serialize manifest: {}", e))
            })?;
            metadata_table
                .insert(MANIFEST_KEY, manifest_bytes.as_slice())
                .map_err(|e| StoreError::DatabaseError(format!("Failed to put manifest: {}", e)))?;
        }
        write_txn.commit().map_err(|e| {
            StoreError::DatabaseError(format!("Failed to commit records: {}", e))
        })?;

        info!(
            "Wrote {} records to {}",
            manifest.record_count,
            path.display()
        );

        Ok(Self {
            db: Arc::new(db),
            inner,
        })
    }

    /// Opens an existing database and rebuilds the in-memory indexes.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no database exists at `path`
    /// - `StoreError::Incompatible` if the manifest is missing or was written by
    ///   an incompatible schema version
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotFound(format!(
                "no index at {}",
                path.display()
            )));
        }

        let db = Database::open(path)
            .map_err(|e| StoreError::DatabaseError(format!("Failed to open database: {}", e)))?;

        let read_txn = db.begin_read().map_err(|e| {
            StoreError::DatabaseError(format!("Failed to begin read transaction: {}", e))
        })?;

        let manifest = {
            let table = read_txn.open_table(METADATA_TABLE).map_err(|e| {
                StoreError::Incompatible(format!("metadata table missing: {}", e))
            })?;
            let guard = table
                .get(MANIFEST_KEY)
                .map_err(|e| StoreError::DatabaseError(format!("Failed to get manifest: {}", e)))?
                .ok_or_else(|| StoreError::Incompatible("manifest missing".to_string()))?;
            let manifest: IndexManifest = serde_json::from_slice(guard.value()).map_err(|e| {
                StoreError::SerializationError(format!("Failed to deserialize manifest: {}", e))
            })?;
            manifest
        };

        if !manifest.is_compatible() {
            return Err(StoreError::Incompatible(format!(
                "schema version {} is not supported",
                manifest.schema_version
            )));
        }

        let mut embeddings: HashMap<u64, Vec<f32>> = HashMap::new();
        {
            let table = read_txn.open_table(EMBEDDINGS_TABLE).map_err(|e| {
                StoreError::DatabaseError(format!("Failed to open embeddings table: {}", e))
            })?;
            let iter = table.iter().map_err(|e| {
                StoreError::DatabaseError(format!("Failed to iterate embeddings: {}", e))
            })?;
            for entry in iter {
                let (key, value) = entry.map_err(|e| {
                    StoreError::DatabaseError(format!("Failed to read embedding: {}", e))
                })?;
                embeddings.insert(key.value(), Self::deserialize_embedding(value.value()));
            }
        }

        let mut records = Vec::with_capacity(embeddings.len());
        {
            let table = read_txn.open_table(RECORDS_TABLE).map_err(|e| {
                StoreError::DatabaseError(format!("Failed to open records table: {}", e))
            })?;
            let iter = table.iter().map_err(|e| {
                StoreError::DatabaseError(format!("Failed to iterate records: {}", e))
            })?;
            for entry in iter {
                let (key, value) = entry.map_err(|e| {
                    StoreError::DatabaseError(format!("Failed to read record: {}", e))
                })?;
                let stored = Self::deserialize_record(value.value())?;
                match embeddings.remove(&key.value()) {
                    Some(embedding) => records.push(Record {
                        id: stored.id,
                        text: stored.text,
                        embedding,
                    }),
                    None => warn!("Record {} has no embedding, skipping", stored.id),
                }
            }
        }
        drop(read_txn);

        if records.len() != manifest.record_count {
            warn!(
                "Manifest lists {} records but {} were loaded",
                manifest.record_count,
                records.len()
            );
        }

        info!("Loaded {} records from {}", records.len(), path.display());
        let inner = InMemoryRecordStore::build(manifest, records)?;

        Ok(Self {
            db: Arc::new(db),
            inner,
        })
    }

    /// Serializes a StoredRecord to JSON bytes.
    fn serialize_record(record: &StoredRecord) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(record).map_err(|e| {
            StoreError::SerializationError(format!("Failed to serialize record: {}", e))
        })
    }

    /// Deserializes a StoredRecord from JSON bytes.
    fn deserialize_record(bytes: &[u8]) -> Result<StoredRecord, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| {
            StoreError::SerializationError(format!("Failed to deserialize record: {}", e))
        })
    }

    /// Serializes an embedding to raw bytes.
    ///
    /// Format: Little-endian f32 values packed sequentially (4 bytes per value).
    /// NOTE: Endianness MUST match `deserialize_embedding()`.
    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(embedding.len() * 4);
        for &val in embedding {
            bytes.extend_from_slice(&val.to_le_bytes());
        }
        bytes
    }

    /// Deserializes an embedding from raw little-endian bytes.
    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

#[async_trait::async_trait(?Send)]
impl RecordStore for RedbRecordStore {
    fn manifest(&self) -> &IndexManifest {
        self.inner.manifest()
    }

    async fn lexical_top_k(&self, query: &str, limit: usize) -> Result<Vec<StoreHit>, StoreError> {
        self.inner.lexical_top_k(query, limit).await
    }

    async fn vector_top_k(
        &self,
        embedding: &[f32],
        metric: DistanceMetric,
        limit: usize,
    ) -> Result<Vec<StoreHit>, StoreError> {
        self.inner.vector_top_k(embedding, metric, limit).await
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let read_txn = self.db.begin_read().map_err(|e| {
            StoreError::DatabaseError(format!("Failed to begin read transaction: {}", e))
        })?;

        let records = read_txn.open_table(RECORDS_TABLE).map_err(|e| {
            StoreError::DatabaseError(format!("Failed to open records table: {}", e))
        })?;
        let stored = match records
            .get(id.as_u64())
            .map_err(|e| StoreError::DatabaseError(format!("Failed to get record: {}", e)))?
        {
            Some(guard) => Self::deserialize_record(guard.value())?,
            None => return Ok(None),
        };

        let embeddings = read_txn.open_table(EMBEDDINGS_TABLE).map_err(|e| {
            StoreError::DatabaseError(format!("Failed to open embeddings table: {}", e))
        })?;
        let embedding = embeddings
            .get(id.as_u64())
            .map_err(|e| StoreError::DatabaseError(format!("Failed to get embedding: {}", e)))?
            .map(|guard| Self::deserialize_embedding(guard.value()))
            .ok_or_else(|| {
                StoreError::Incompatible(format!("Record {} has no stored embedding", id))
            })?;
        if embedding.len() != self.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension(),
                actual: embedding.len(),
            });
        }

        Ok(Some(Record {
            id: stored.id,
            text: stored.text,
            embedding,
        }))
    }

    async fn record_count(&self) -> Result<usize, StoreError> {
        self.inner.record_count().await
    }
}
