//! Path resolution for the CLI.
//!
//! The index lives in a single redb file inside the data directory:
//! - `--data-dir DIR` / `$SMSEARCH_DATA_DIR` when given (resolved by clap)
//! - otherwise the platform data directory
//!
//! Model files are only needed for model-backed indexes and are looked up in
//! `--model-dir DIR` / `$SMSEARCH_MODEL_DIR`.

use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use smsearch_core::config::DATABASE_FILE_NAME;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SMSEARCH_DATA_DIR";

/// Environment variable naming the model directory.
pub const MODEL_DIR_ENV: &str = "SMSEARCH_MODEL_DIR";

#[cfg(feature = "model")]
const MODEL_FILENAME: &str = "model.safetensors";
#[cfg(feature = "model")]
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Returns the data directory.
///
/// Platform defaults:
/// - macOS: `~/Library/Application Support/dev.smsearch.smsearch/`
/// - Linux: `~/.local/share/smsearch/`
/// - Windows: `%APPDATA%\smsearch\smsearch\data\`
pub fn get_data_dir(custom_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        return Ok(dir.to_path_buf());
    }

    ProjectDirs::from("dev", "smsearch", "smsearch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}

/// Returns the path to the database file.
pub fn database_path(custom_dir: Option<&Path>) -> Result<PathBuf> {
    let data_dir = get_data_dir(custom_dir)?;
    Ok(data_dir.join(DATABASE_FILE_NAME))
}

/// Returns the weights and tokenizer paths inside a model directory.
#[cfg(feature = "model")]
pub fn model_files(model_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let model = model_dir.join(MODEL_FILENAME);
    let tokenizer = model_dir.join(TOKENIZER_FILENAME);
    for path in [&model, &tokenizer] {
        if !path.exists() {
            return Err(anyhow!("Model file not found: {}", path.display()));
        }
    }
    Ok((model, tokenizer))
}
