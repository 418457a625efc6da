//! Embedder selection.
//!
//! Without `--model-dir` the CLI uses the feature-hashing embedder. With it
//! (and the `model` feature), messages are embedded by the JinaBERT model
//! whose `model.safetensors` and `tokenizer.json` live in that directory.
//! Searches pick whichever embedder the index was built with.

use anyhow::{anyhow, Context, Result};
use smsearch_core::embedding::{Embedder, HashingEmbedder};
use smsearch_core::storage::IndexManifest;
use std::path::Path;
use std::sync::Arc;

/// Embedder for building a new index.
///
/// `dimension` applies to the hashing embedder only; a model has a fixed
/// output size.
pub fn for_indexing(dimension: usize, model_dir: Option<&Path>) -> Result<Arc<dyn Embedder>> {
    match model_dir {
        Some(dir) => load_model(dir),
        None => Ok(Arc::new(
            HashingEmbedder::new(dimension).context("Invalid embedding dimension")?,
        )),
    }
}

/// Embedder producing vectors comparable with the ones stored in an index.
pub fn for_index(manifest: &IndexManifest, model_dir: Option<&Path>) -> Result<Arc<dyn Embedder>> {
    let hashing = HashingEmbedder::new(manifest.embedding_dim)
        .context("Failed to create embedder for this index")?;
    if hashing.model_id() == manifest.model_id {
        return Ok(Arc::new(hashing));
    }

    let dir = model_dir.ok_or_else(|| {
        anyhow!(
            "Index was built with model '{}'. Pass --model-dir (or set ${}) to search it.",
            manifest.model_id,
            crate::config::MODEL_DIR_ENV
        )
    })?;
    let embedder = load_model(dir)?;
    if embedder.model_id() != manifest.model_id {
        return Err(anyhow!(
            "Model in {} is '{}' but the index was built with '{}'",
            dir.display(),
            embedder.model_id(),
            manifest.model_id
        ));
    }
    Ok(embedder)
}

#[cfg(feature = "model")]
fn load_model(dir: &Path) -> Result<Arc<dyn Embedder>> {
    use smsearch_core::embedding::{JinaBertConfig, JinaBertEmbedder};

    let (model_path, tokenizer_path) = crate::config::model_files(dir)?;
    let model_bytes = std::fs::read(&model_path)
        .with_context(|| format!("Failed to read model file: {}", model_path.display()))?;
    let tokenizer_bytes = std::fs::read(&tokenizer_path)
        .with_context(|| format!("Failed to read tokenizer file: {}", tokenizer_path.display()))?;

    let embedder =
        JinaBertEmbedder::from_bytes(model_bytes, tokenizer_bytes, JinaBertConfig::default())
            .context("Failed to load embedding model")?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "model"))]
fn load_model(dir: &Path) -> Result<Arc<dyn Embedder>> {
    Err(anyhow!(
        "Cannot load the model in {}: smsearch was built without the `model` feature",
        dir.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsearch_core::storage::DistanceMetric;

    #[test]
    fn test_hashing_embedder_by_default() {
        let embedder = for_indexing(48, None).unwrap();
        assert_eq!(embedder.embedding_dim(), 48);
        assert_eq!(embedder.model_id(), "hashing-trigram-v1/48");
    }

    #[test]
    fn test_hashing_index_gets_hashing_embedder() {
        let manifest = IndexManifest::new(48, DistanceMetric::Cosine, "hashing-trigram-v1/48");
        let embedder = for_index(&manifest, None).unwrap();
        assert_eq!(embedder.model_id(), manifest.model_id);
    }

    #[test]
    fn test_model_index_requires_model_dir() {
        let manifest = IndexManifest::new(
            512,
            DistanceMetric::Cosine,
            "jinaai/jina-embeddings-v2-small-en",
        );
        let err = for_index(&manifest, None).err().unwrap().to_string();
        assert!(err.contains("--model-dir"));
    }

    #[test]
    fn test_missing_model_files() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(for_indexing(48, Some(dir.path())).is_err());
    }
}
