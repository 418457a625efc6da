//! Embedding model abstractions and implementations.
//!
//! ## Core Traits
//!
//! - [`Embedder`] - Text to vector interface used by ingestion and vector search
//!
//! ## Implementations
//!
//! - [`HashingEmbedder`] - Deterministic feature-hashing embedder that needs no
//!   model files
//! - `JinaBertEmbedder` - Semantic transformer embedder on Candle (feature
//!   `model`), loaded from safetensors weights and a `tokenizer.json`
//!
//! ## Example
//!
//! ```
//! use smsearch_core::embedding::{Embedder, HashingEmbedder};
//!
//! # tokio_test_block_on(async {
//! let embedder = HashingEmbedder::new(64).unwrap();
//! let embedding = embedder.embed("Free entry in 2 a wkly comp").await.unwrap();
//! assert_eq!(embedding.len(), 64);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod hashing;
mod traits;

#[cfg(feature = "model")]
mod config;
#[cfg(feature = "model")]
mod model;
#[cfg(feature = "model")]
mod tokenizer;

pub use hashing::HashingEmbedder;
pub use traits::Embedder;

#[cfg(feature = "model")]
pub use config::JinaBertConfig;
#[cfg(feature = "model")]
pub use model::JinaBertEmbedder;
#[cfg(feature = "model")]
pub use tokenizer::TokenizerHandle;
