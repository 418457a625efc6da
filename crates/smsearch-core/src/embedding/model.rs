//! Transformer embedding model (JinaBERT on Candle).
//!
//! Requires the `model` feature plus weights and a tokenizer on disk; see
//! [`JinaBertEmbedder::from_bytes`]. Embeddings are the mean of the final
//! hidden states over all tokens, L2-normalized.

use super::config::JinaBertConfig;
use super::tokenizer::TokenizerHandle;
use super::traits::Embedder;
use crate::error::EmbeddingError;
use async_trait::async_trait;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Activation, VarBuilder};
use candle_transformers::models::jina_bert::{BertModel, Config, PositionEmbeddingType};
use tracing::{debug, info};

/// Semantic embedder backed by a JinaBERT encoder.
///
/// Messages are embedded one at a time. The Candle JinaBERT forward pass
/// takes no attention mask, so padding a batch would leak pad tokens into
/// every shorter message's mean.
pub struct JinaBertEmbedder {
    model: BertModel,
    tokenizer: TokenizerHandle,
    config: JinaBertConfig,
    device: Device,
}

impl JinaBertEmbedder {
    /// Loads safetensors weights and a serialized `tokenizer.json`.
    ///
    /// Weights are loaded as F32 on the CPU.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::ModelUnavailable` if either file is invalid.
    pub fn from_bytes(
        model_bytes: Vec<u8>,
        tokenizer_bytes: Vec<u8>,
        config: JinaBertConfig,
    ) -> Result<Self, EmbeddingError> {
        info!(
            "Loading embedding model '{}' ({:.2}MB)",
            config.model_id,
            model_bytes.len() as f64 / 1_000_000.0
        );

        let tokenizer = TokenizerHandle::from_bytes(tokenizer_bytes, config.max_position_embeddings)?;
        let device = Device::Cpu;
        let vb = VarBuilder::from_buffered_safetensors(model_bytes, DType::F32, &device)
            .map_err(|e| {
                EmbeddingError::ModelUnavailable(format!("Failed to read weights: {}", e))
            })?;

        Self::from_var_builder(vb, tokenizer, config, device)
    }

    /// Builds the model from an arbitrary weight source.
    pub fn from_var_builder(
        vb: VarBuilder,
        tokenizer: TokenizerHandle,
        config: JinaBertConfig,
        device: Device,
    ) -> Result<Self, EmbeddingError> {
        let model_config = Config::new(
            tokenizer.vocab_size(),
            config.hidden_size,
            config.num_hidden_layers,
            config.num_attention_heads,
            config.intermediate_size,
            Activation::Gelu,
            config.max_position_embeddings,
            2,     // type_vocab_size
            0.02,  // initializer_range
            1e-12, // layer_norm_eps
            0,     // pad_token_id
            PositionEmbeddingType::Alibi,
        );

        let model = BertModel::new(vb, &model_config).map_err(|e| {
            EmbeddingError::ModelUnavailable(format!("Failed to build model: {}", e))
        })?;
        info!(
            "Model ready: {}d hidden, {} layers, {} heads",
            config.hidden_size, config.num_hidden_layers, config.num_attention_heads
        );

        Ok(Self {
            model,
            tokenizer,
            config,
            device,
        })
    }

    pub fn config(&self) -> &JinaBertConfig {
        &self.config
    }

    /// Computes the embedding synchronously.
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("text is empty".to_string()));
        }

        let token_ids = self.tokenizer.tokenize(text)?;
        let n_tokens = token_ids.len();
        debug!("Embedding {} tokens", n_tokens);

        // [1, seq_len]
        let input = Tensor::from_vec(token_ids, n_tokens, &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference_error("create input tensor"))?;

        // [1, seq_len, hidden] -> [1, hidden]
        let hidden = self
            .model
            .forward(&input)
            .map_err(inference_error("forward pass"))?;
        let pooled = hidden
            .sum(1)
            .and_then(|t| t.affine(1.0 / n_tokens as f64, 0.0))
            .map_err(inference_error("mean pooling"))?;

        let pooled = if self.config.normalize_embeddings {
            pooled
                .sqr()
                .and_then(|sq| sq.sum_keepdim(1))
                .and_then(|sum| sum.sqrt())
                .and_then(|norm| pooled.broadcast_div(&norm))
                .map_err(inference_error("normalization"))?
        } else {
            pooled
        };

        pooled
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(inference_error("read embedding"))
    }
}

fn inference_error(step: &'static str) -> impl Fn(candle_core::Error) -> EmbeddingError {
    move |e| EmbeddingError::InferenceFailed(format!("Failed to {}: {}", step, e))
}

#[async_trait(?Send)]
impl Embedder for JinaBertEmbedder {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn embedding_dim(&self) -> usize {
        self.config.hidden_size
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }
}
