//! Embedding model abstraction.

use crate::error::EmbeddingError;
use async_trait::async_trait;

/// Trait for text embedding models.
///
/// An embedder maps a piece of text to a fixed-length vector. The same
/// embedder (or one with the same [`model_id`](Embedder::model_id) and
/// [`embedding_dim`](Embedder::embedding_dim)) must be used at ingestion and
/// at query time, otherwise vector distances are meaningless.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so they can be shared behind `Arc`
/// between the search components.
///
/// # Examples
///
/// ```ignore
/// let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(256)?);
///
/// let embedding = embedder.embed("free entry to win a prize").await?;
/// assert_eq!(embedding.len(), embedder.embedding_dim());
/// ```
#[async_trait(?Send)]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier recorded in the index manifest.
    fn model_id(&self) -> &str;

    /// Returns the embedding dimension (vector size).
    ///
    /// All embeddings from this model will have this length.
    fn embedding_dim(&self) -> usize;

    /// Embeds a single text.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::InvalidInput` for text with nothing to embed.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds a batch of texts, one embedding per input in order.
    ///
    /// The default implementation calls [`embed`](Embedder::embed) for each text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}
