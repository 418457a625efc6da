//! HuggingFace tokenizer wrapper.

use crate::error::EmbeddingError;
use tokenizers::tokenizer::{Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

/// Tokenizer with truncation fixed to the model's position limit.
///
/// # Examples
///
/// ```ignore
/// let bytes = std::fs::read("tokenizer.json")?;
/// let tokenizer = TokenizerHandle::from_bytes(bytes, 512)?;
/// let ids = tokenizer.tokenize("Free entry in 2 a wkly comp")?;
/// ```
#[derive(Clone)]
pub struct TokenizerHandle {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl TokenizerHandle {
    /// Loads a serialized `tokenizer.json`.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::ModelUnavailable` if the bytes are not a valid
    /// tokenizer, or `EmbeddingError::InvalidConfig` if truncation cannot be
    /// configured.
    pub fn from_bytes(tokenizer_bytes: Vec<u8>, max_length: usize) -> Result<Self, EmbeddingError> {
        let mut tokenizer = Tokenizer::from_bytes(tokenizer_bytes).map_err(|e| {
            EmbeddingError::ModelUnavailable(format!("Failed to deserialize tokenizer: {}", e))
        })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                stride: 0,
                strategy: TruncationStrategy::OnlyFirst,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| {
                EmbeddingError::InvalidConfig(format!("Failed to configure truncation: {}", e))
            })?;

        Ok(Self {
            tokenizer,
            max_length,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Vocabulary size including added tokens.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Encodes text into token ids, special tokens included.
    pub fn tokenize(&self, text: &str) -> Result<Vec<u32>, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::InvalidInput(format!("Encoding failed: {}", e)))?;

        let ids = encoding.get_ids();
        if ids.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Tokenizer returned no tokens".to_string(),
            ));
        }
        Ok(ids.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Word-level tokenizer over a handful of SMS words.
    pub(crate) fn word_level_tokenizer_json() -> Vec<u8> {
        serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": {
                    "[UNK]": 0, "free": 1, "prize": 2, "win": 3, "call": 4,
                    "me": 5, "later": 6, "claim": 7, "your": 8, "now": 9
                },
                "unk_token": "[UNK]"
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_tokenize_known_and_unknown_words() {
        let tokenizer = TokenizerHandle::from_bytes(word_level_tokenizer_json(), 16).unwrap();
        assert_eq!(tokenizer.vocab_size(), 10);
        assert_eq!(tokenizer.tokenize("Free prize").unwrap(), vec![1, 2]);
        assert_eq!(tokenizer.tokenize("call zebra").unwrap(), vec![4, 0]);
    }

    #[test]
    fn test_truncation() {
        let tokenizer = TokenizerHandle::from_bytes(word_level_tokenizer_json(), 3).unwrap();
        assert_eq!(tokenizer.max_length(), 3);
        let ids = tokenizer.tokenize("win a free prize now call me later").unwrap();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_invalid_tokenizer_bytes() {
        assert!(matches!(
            TokenizerHandle::from_bytes(b"not json".to_vec(), 16),
            Err(EmbeddingError::ModelUnavailable(_))
        ));
    }
}
