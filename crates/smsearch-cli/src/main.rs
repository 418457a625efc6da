//! smsearch CLI - hybrid search over an SMS corpus.
//!
//! # Usage
//!
//! ```bash
//! # Build the index from the SMS Spam Collection
//! smsearch index data/SMSSpamCollection
//!
//! # Search it
//! smsearch search "free prize"
//! smsearch search "you have won" --method vector -n 5
//! smsearch search "call me" --format table --json
//!
//! # Show help
//! smsearch --help
//! ```

mod config;
mod embedder;
mod index;
mod output;
mod search;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smsearch_core::config::{
    DEFAULT_DISTANCE_METRIC, DEFAULT_EMBEDDING_DIM, DEFAULT_PREFETCH_K, DEFAULT_RANK_CONSTANT,
    DEFAULT_TOP_K,
};
use smsearch_core::search::{HybridParams, OutputFormat, SearchOptions, SearchStrategy};
use smsearch_core::storage::DistanceMetric;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Hybrid lexical + semantic search over short text messages.
#[derive(Parser)]
#[command(name = "smsearch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Custom data directory (default: platform standard location)
    #[arg(long, global = true, env = config::DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Directory with `model.safetensors` and `tokenizer.json` for semantic
    /// embeddings (requires the `model` feature)
    #[arg(long, global = true, env = config::MODEL_DIR_ENV)]
    model_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the index from a `label<TAB>message` corpus file
    Index {
        /// Corpus file (SMS Spam Collection format)
        corpus: PathBuf,

        /// Embedding dimension (hashing embedder only)
        #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIM)]
        dim: usize,

        /// Distance metric for vector search (cosine, euclidean)
        #[arg(long, default_value_t = DEFAULT_DISTANCE_METRIC)]
        metric: DistanceMetric,
    },

    /// Search the index
    Search {
        /// Search query
        query: String,

        /// Retrieval strategy: lexical, vector or hybrid
        #[arg(short, long, default_value = "hybrid")]
        method: String,

        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
        limit: usize,

        /// Candidates fetched per strategy before fusion (hybrid only)
        #[arg(long, default_value_t = DEFAULT_PREFETCH_K)]
        prefetch: usize,

        /// RRF rank constant (hybrid only)
        #[arg(long, default_value_t = DEFAULT_RANK_CONSTANT)]
        rank_constant: u32,

        /// Result shape: rows or table
        #[arg(long, default_value = "rows")]
        format: String,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Deadline in milliseconds for each store query and the query embedding
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Index {
            corpus,
            dim,
            metric,
        } => {
            let report = index::execute_index(
                &corpus,
                dim,
                metric,
                cli.data_dir.as_deref(),
                cli.model_dir.as_deref(),
            )
            .await?;

            println!(
                "Indexed {} message{} ({} skipped line{})",
                report.records,
                if report.records == 1 { "" } else { "s" },
                report.skipped_lines,
                if report.skipped_lines == 1 { "" } else { "s" }
            );
            for (label, count) in &report.labels {
                println!("  {}: {}", label, count);
            }
        }
        Command::Search {
            query,
            method,
            limit,
            prefetch,
            rank_constant,
            format,
            json,
            timeout_ms,
        } => {
            // Reject bad arguments before touching the index.
            let options = SearchOptions {
                strategy: method.parse::<SearchStrategy>()?,
                params: HybridParams {
                    top_k: limit,
                    prefetch_k: prefetch,
                    rank_constant,
                    deadline: timeout_ms.map(Duration::from_millis),
                },
                format: format.parse::<OutputFormat>()?,
            };
            if options.strategy == SearchStrategy::Hybrid {
                options.params.validate().context("Invalid hybrid parameters")?;
            }

            let results = search::execute_search(
                &query,
                &options,
                cli.data_dir.as_deref(),
                cli.model_dir.as_deref(),
            )
            .await?;

            let output = if json {
                output::format_json(&query, options.strategy, &results)?
            } else {
                output::format_human(&query, &results)
            };

            println!("{}", output);
        }
    }

    Ok(())
}
