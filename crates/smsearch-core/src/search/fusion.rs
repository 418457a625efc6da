//! Reciprocal Rank Fusion (RRF).
//!
//! Merges a lexical and a vector ranking using only ranks, so BM25 relevance
//! and embedding distance never need to be put on a common scale:
//!
//! ```text
//! score(d) = 1 / (k + lexical_rank(d)) + 1 / (k + vector_rank(d))
//! ```
//!
//! A record missing from one list is given that list's *sentinel* rank,
//! `1 + max rank seen in either list`, i.e. one place behind the worst
//! candidate anybody returned. Its contribution from that side is therefore
//! small but non-zero.

use super::ranking::{rank_by, SortOrder, TieBreak};
use super::types::{RecordId, ScoredResult, SearchMethod};
use std::collections::HashMap;

/// RRF constant k.
///
/// Controls how quickly contributions decay with rank. k=60 is the value
/// from the original RRF paper (Cormack et al., 2009) and works well without
/// tuning: the first few ranks matter, but a document at rank 10 still
/// contributes almost as much as one at rank 1.
pub const RRF_K: u32 = 60;

/// Rank assigned to records absent from one of the two lists.
///
/// An empty list counts as max rank 0.
pub fn missing_rank_sentinel(lexical: &[ScoredResult], vector: &[ScoredResult]) -> usize {
    let max_rank = lexical
        .iter()
        .chain(vector.iter())
        .map(|result| result.rank)
        .max()
        .unwrap_or(0);
    max_rank + 1
}

/// One record's position in each input list.
struct RankPair {
    text: String,
    lexical_rank: Option<usize>,
    vector_rank: Option<usize>,
}

/// Fuses two rankings into at most `top_k` results tagged [`SearchMethod::Fused`].
///
/// The union of both lists is scored (full outer join on id); the best
/// `top_k` by fused score are returned with ranks renumbered 1..N. Text is
/// taken from the lexical side when a record appears in both lists.
///
/// `rank_constant` is assumed validated (≥ 1) by the caller.
pub fn reciprocal_rank_fusion(
    lexical: &[ScoredResult],
    vector: &[ScoredResult],
    top_k: usize,
    rank_constant: u32,
    tie_break: TieBreak,
) -> Vec<ScoredResult> {
    let sentinel = missing_rank_sentinel(lexical, vector);
    let k = rank_constant as f64;

    let mut merged: HashMap<RecordId, RankPair> =
        HashMap::with_capacity(lexical.len() + vector.len());

    for result in lexical {
        merged.insert(
            result.id,
            RankPair {
                text: result.text.clone(),
                lexical_rank: Some(result.rank),
                vector_rank: None,
            },
        );
    }
    for result in vector {
        merged
            .entry(result.id)
            .and_modify(|pair| pair.vector_rank = Some(result.rank))
            .or_insert_with(|| RankPair {
                text: result.text.clone(),
                lexical_rank: None,
                vector_rank: Some(result.rank),
            });
    }

    let scored: Vec<(RecordId, String, f64)> = merged
        .into_iter()
        .map(|(id, pair)| {
            let lexical_rank = pair.lexical_rank.unwrap_or(sentinel) as f64;
            let vector_rank = pair.vector_rank.unwrap_or(sentinel) as f64;
            let score = 1.0 / (lexical_rank + k) + 1.0 / (vector_rank + k);
            (id, pair.text, score)
        })
        .collect();

    rank_by(
        scored,
        |(id, _, score)| (*score, *id),
        SortOrder::Descending,
        tie_break,
        top_k,
    )
    .into_iter()
    .map(|(rank, (id, text, score))| ScoredResult {
        method: SearchMethod::Fused,
        id,
        text,
        score: Some(score as f32),
        rank,
    })
    .collect()
}

/// Result of a hybrid search whose lexical side found nothing.
///
/// Returns the vector results truncated to `top_k`, re-tagged as fused.
/// Ranks and the absent score are left as the vector search produced them.
pub fn vector_fallback(vector: Vec<ScoredResult>, top_k: usize) -> Vec<ScoredResult> {
    vector
        .into_iter()
        .take(top_k)
        .map(|result| ScoredResult {
            method: SearchMethod::Fused,
            ..result
        })
        .collect()
}
