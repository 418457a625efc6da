//! # smsearch Core
//!
//! Hybrid retrieval over a corpus of short text messages.
//!
//! This crate provides the search strategies, record stores and embedding
//! abstractions behind the `smsearch` CLI, and is usable on its own with any
//! [`storage::RecordStore`] and [`embedding::Embedder`] implementation.
//!
//! ## Modules
//!
//! - [`search`] - Lexical (BM25), vector and hybrid (RRF) search
//! - [`storage`] - Record store trait, in-memory and redb implementations
//! - [`embedding`] - Embedder trait and a feature-hashing embedder
//! - [`ingest`] - Building an index from an SMS corpus file
//! - [`config`] - Default constants
//! - [`error`] - Error types for embedding and ingestion

pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod search;
pub mod storage;

#[cfg(test)]
mod test_utils;
