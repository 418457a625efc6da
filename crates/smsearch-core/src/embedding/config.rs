//! Configuration for the transformer embedding model.

use serde::{Deserialize, Serialize};

/// Architecture parameters of a JinaBERT encoder.
///
/// JinaBERT uses ALiBi positional biases instead of learned position
/// embeddings, so `max_position_embeddings` only bounds the bias matrix
/// (`heads * len^2` floats). SMS messages are short; a few hundred tokens
/// covers every message in the corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JinaBertConfig {
    /// Model identifier recorded in the index manifest
    pub model_id: String,
    /// L2-normalize pooled embeddings
    pub normalize_embeddings: bool,
    /// Hidden size, which is also the embedding dimension
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    /// Token limit; longer messages are truncated
    pub max_position_embeddings: usize,
}

impl Default for JinaBertConfig {
    /// `jinaai/jina-embeddings-v2-small-en`
    fn default() -> Self {
        Self {
            model_id: "jinaai/jina-embeddings-v2-small-en".to_string(),
            normalize_embeddings: true,
            hidden_size: 512,
            num_hidden_layers: 4,
            num_attention_heads: 8,
            intermediate_size: 2048,
            max_position_embeddings: 512,
        }
    }
}

impl JinaBertConfig {
    /// Creates a configuration with the usual 4x feed-forward width.
    pub fn new(
        model_id: impl Into<String>,
        hidden_size: usize,
        num_layers: usize,
        num_heads: usize,
        max_positions: usize,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            normalize_embeddings: true,
            hidden_size,
            num_hidden_layers: num_layers,
            num_attention_heads: num_heads,
            intermediate_size: hidden_size * 4,
            max_position_embeddings: max_positions,
        }
    }
}
