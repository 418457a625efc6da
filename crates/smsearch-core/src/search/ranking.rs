//! Rank assignment with an explicit tie-breaking policy.
//!
//! Every strategy sorts on a scalar that can collide: BM25 relevance,
//! embedding distance, fused RRF score. Collisions are resolved here, in one
//! place, so lexical, vector and fused rankings all follow the same policy.
//!
//! The default draws a uniform random key per item for every call, so tied
//! low-signal matches are not biased by index order and may come back in a
//! different order on the next call. [`TieBreak::ById`] substitutes the record
//! id as a stable secondary key when reproducible output is needed.

use super::types::RecordId;
use rand::Rng;
use std::cmp::Ordering;

/// How items with equal primary keys are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Uniform random draw per call (not reproducible across calls)
    #[default]
    Random,
    /// Ascending record id (reproducible)
    ById,
}

/// Direction of the primary sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Higher is better (relevance, fused score)
    Descending,
    /// Lower is better (distance)
    Ascending,
}

/// Sorts `items` by `key`, breaks ties per `tie_break`, keeps the first
/// `limit` and pairs each with its 1-based rank.
///
/// NaN keys sort after every finite key in both directions.
pub fn rank_by<T, F>(
    items: Vec<T>,
    key: F,
    order: SortOrder,
    tie_break: TieBreak,
    limit: usize,
) -> Vec<(usize, T)>
where
    F: Fn(&T) -> (f64, RecordId),
{
    let mut rng = rand::thread_rng();
    let mut keyed: Vec<(f64, u64, T)> = items
        .into_iter()
        .map(|item| {
            let (primary, id) = key(&item);
            let secondary = match tie_break {
                TieBreak::Random => rng.gen::<u64>(),
                TieBreak::ById => id.as_u64(),
            };
            (primary, secondary, item)
        })
        .collect();

    keyed.sort_by(|a, b| compare_primary(a.0, b.0, order).then_with(|| a.1.cmp(&b.1)));
    keyed.truncate(limit);

    keyed
        .into_iter()
        .enumerate()
        .map(|(i, (_, _, item))| (i + 1, item))
        .collect()
}

fn compare_primary(a: f64, b: f64, order: SortOrder) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match order {
            SortOrder::Descending => b.total_cmp(&a),
            SortOrder::Ascending => a.total_cmp(&b),
        },
    }
}
