//! Feature-hashing embedder.
//!
//! Each text is split into lowercase word tokens; every word and every
//! character trigram of `^word$` is hashed with FNV-1a into one of `dim`
//! buckets with a hash-derived sign. The bucket vector is L2-normalized, so
//! cosine and Euclidean distances agree on ordering.
//!
//! Texts that share words or word fragments ("winner", "win", "won") end up
//! close together, which is enough for short-message retrieval and keeps the
//! whole system free of model weights.
//!
//! Messages made only of symbols (emoticons like `:)` or `<3`) have no words;
//! they are embedded from the character 1- to 3-grams of the whole string
//! with whitespace removed.

use super::traits::Embedder;
use crate::error::EmbeddingError;
use async_trait::async_trait;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Weight of a whole-word feature relative to a trigram feature.
const WORD_WEIGHT: f32 = 2.0;
const TRIGRAM_WEIGHT: f32 = 1.0;

/// Longest character n-gram used for symbol-only text.
const SYMBOL_NGRAM_MAX: usize = 3;

/// Deterministic embedder based on the hashing trick.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
    model_id: String,
}

impl HashingEmbedder {
    /// Creates an embedder producing vectors of `dim` values.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::InvalidConfig` if `dim` is zero.
    pub fn new(dim: usize) -> Result<Self, EmbeddingError> {
        if dim == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dim,
            model_id: format!("hashing-trigram-v1/{dim}"),
        })
    }

    /// Computes the embedding synchronously.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::InvalidInput` for empty or whitespace-only text.
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("text is empty".to_string()));
        }

        let mut vector = vec![0.0f32; self.dim];
        let words = tokenize(text);
        if words.is_empty() {
            self.add_symbol_features(&mut vector, text);
        }
        for word in &words {
            self.add_feature(&mut vector, word.as_bytes(), WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, trigram.as_bytes(), TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    fn add_symbol_features(&self, vector: &mut [f32], text: &str) {
        let chars: Vec<char> = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        for n in 1..=SYMBOL_NGRAM_MAX.min(chars.len()) {
            for window in chars.windows(n) {
                let ngram: String = window.iter().collect();
                self.add_feature(vector, ngram.as_bytes(), TRIGRAM_WEIGHT);
            }
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dim as u64) as usize;
        // Top bit picks the sign so colliding features tend to cancel out.
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

#[async_trait(?Send)]
impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed_sync(text)).collect()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}
