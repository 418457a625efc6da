//! Error types for smsearch-core.
//!
//! Search errors live next to the search types ([`crate::search::SearchError`])
//! and store errors next to the store trait ([`crate::storage::StoreError`]).
//! This module holds the errors of the embedding and ingestion layers.

use crate::storage::StoreError;
use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Text cannot be embedded (e.g. empty or whitespace only)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Model not available or initialization failed
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    /// Embedding computation failed
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}

/// Errors that can occur while building an index from a corpus file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read the corpus
    #[error("Failed to read corpus: {0}")]
    Io(#[from] std::io::Error),
    /// Embedding a message failed
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    /// Writing the index failed
    #[error(transparent)]
    Store(#[from] StoreError),
    /// No usable line in the corpus
    #[error("Corpus contains no usable messages")]
    EmptyCorpus,
}

