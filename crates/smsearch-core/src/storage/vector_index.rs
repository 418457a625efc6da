// Exact (flat) vector index: every query is compared against every embedding.

use super::{take_with_ties, StoreError};
use crate::search::types::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Distance metric between two embeddings. Smaller is more similar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity`, in [0, 2]
    #[default]
    Cosine,
    /// L2 distance
    Euclidean,
}

impl DistanceMetric {
    /// Computes the distance between two equal-length vectors.
    ///
    /// Cosine distance involving a zero vector is `f32::INFINITY`, i.e.
    /// further away than any real neighbor.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => {
                let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
                let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

                if mag_a == 0.0 || mag_b == 0.0 {
                    return f32::INFINITY;
                }

                1.0 - dot / (mag_a * mag_b)
            }
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(&x, &y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            other => Err(format!(
                "unsupported distance metric '{other}' (expected 'cosine' or 'euclidean')"
            )),
        }
    }
}

/// Flat vector index over fixed-dimension embeddings.
///
/// Embeddings are held as `Box<[f32]>` so the index owns stable heap
/// allocations. Search is a full scan, which matches the exact
/// "distance to every record" semantics and is fast enough for a
/// short-message corpus of a few thousand entries.
pub struct VectorIndex {
    /// Record id and embedding, in insertion order
    entries: Vec<(RecordId, Box<[f32]>)>,
    /// Dimensionality of every embedding
    dimension: usize,
}

impl VectorIndex {
    /// Creates an empty index for embeddings of `dimension` values.
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: Vec::new(),
            dimension,
        }
    }

    /// Adds an embedding to the index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DimensionMismatch` if the embedding length doesn't
    /// match the index dimension.
    pub fn insert(&mut self, id: RecordId, embedding: Vec<f32>) -> Result<(), StoreError> {
        if embedding.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        self.entries.push((id, embedding.into_boxed_slice()));
        Ok(())
    }

    /// Returns up to `limit` `(id, distance)` pairs ordered by distance
    /// ascending, extended by any further pairs tied with the last one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DimensionMismatch` if the query length doesn't
    /// match the index dimension.
    #[instrument(skip_all, fields(index_size = self.entries.len(), limit))]
    pub fn search(
        &self,
        query: &[f32],
        metric: DistanceMetric,
        limit: usize,
    ) -> Result<Vec<(RecordId, f32)>, StoreError> {
        if query.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(RecordId, f32)> = self
            .entries
            .iter()
            .map(|(id, embedding)| (*id, metric.distance(query, embedding)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        Ok(take_with_ties(scored, limit, |(_, distance)| *distance))
    }

    /// Returns the number of indexed embeddings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index holds no embeddings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of the indexed embeddings.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> RecordId {
        RecordId::from_u64(n)
    }

    #[test]
    fn test_cosine_distance() {
        let metric = DistanceMetric::Cosine;
        assert!(metric.distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-6);
        assert!((metric.distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((metric.distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert_eq!(metric.distance(&[0.0, 0.0], &[1.0, 0.0]), f32::INFINITY);
    }

    #[test]
    fn test_euclidean_distance() {
        let metric = DistanceMetric::Euclidean;
        assert!((metric.distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-6);
        assert_eq!(metric.distance(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("cosine".parse::<DistanceMetric>(), Ok(DistanceMetric::Cosine));
        assert_eq!("L2".parse::<DistanceMetric>(), Ok(DistanceMetric::Euclidean));
        assert!("manhattan".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_search_orders_by_distance() {
        let mut index = VectorIndex::new(2);
        index.insert(id(1), vec![0.0, 1.0]).unwrap();
        index.insert(id(2), vec![1.0, 0.0]).unwrap();
        index.insert(id(3), vec![0.7, 0.7]).unwrap();

        let results = index.search(&[1.0, 0.0], DistanceMetric::Cosine, 3).unwrap();
        let ids: Vec<u64> = results.iter().map(|(id, _)| id.as_u64()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        for pair in results.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn test_search_limit_and_ties() {
        let mut index = VectorIndex::new(2);
        index.insert(id(1), vec![1.0, 0.0]).unwrap();
        index.insert(id(2), vec![0.0, 1.0]).unwrap();
        index.insert(id(3), vec![0.0, 1.0]).unwrap();
        index.insert(id(4), vec![-1.0, 0.0]).unwrap();

        let one = index.search(&[1.0, 0.0], DistanceMetric::Cosine, 1).unwrap();
        assert_eq!(one.len(), 1);

        // Records 2 and 3 tie for second place.
        let two = index.search(&[1.0, 0.0], DistanceMetric::Cosine, 2).unwrap();
        assert_eq!(two.len(), 3);
    }

    #[test]
    fn test_insert_dimension_mismatch() {
        let mut index = VectorIndex::new(3);
        let result = index.insert(id(1), vec![1.0, 0.0]);
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let mut index = VectorIndex::new(3);
        index.insert(id(1), vec![1.0, 0.0, 0.0]).unwrap();
        let result = index.search(&[1.0, 0.0], DistanceMetric::Cosine, 1);
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::new(2);
        let results = index.search(&[1.0, 0.0], DistanceMetric::Euclidean, 5).unwrap();
        assert!(results.is_empty());
    }
}
