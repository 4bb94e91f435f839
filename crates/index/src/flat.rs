use serde::{Deserialize, Serialize};

use crate::IndexError;

/// Distance function used to rank neighbours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Squared L2 distance; smaller is closer.
    #[default]
    Euclidean,
}

impl DistanceMetric {
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Euclidean => squared_l2(a, b),
        }
    }
}

/// Chunk size for auto-vectorized distance loops
const SIMD_CHUNK_SIZE: usize = 32;

/// Squared Euclidean distance. Slices must have equal length.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = 0.0f32;
    let mut a_chunks = a.chunks_exact(SIMD_CHUNK_SIZE);
    let mut b_chunks = b.chunks_exact(SIMD_CHUNK_SIZE);
    for (ca, cb) in a_chunks.by_ref().zip(b_chunks.by_ref()) {
        acc += diff_sq_chunk(ca, cb);
    }
    acc + diff_sq_chunk(a_chunks.remainder(), b_chunks.remainder())
}

#[inline(always)]
fn diff_sq_chunk(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Exact nearest-neighbour index over dense vectors, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    metric: DistanceMetric,
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize, metric: DistanceMetric) -> Result<Self, IndexError> {
        if dimension == 0 {
            return Err(IndexError::InvalidConfig("dimension must be at least 1".into()));
        }
        Ok(Self {
            dimension,
            metric,
            vectors: Vec::new(),
        })
    }

    /// Rebuild from row-major storage, checking the shape.
    pub(crate) fn from_raw(
        dimension: usize,
        metric: DistanceMetric,
        vectors: Vec<f32>,
    ) -> Result<Self, IndexError> {
        if dimension == 0 || vectors.len() % dimension != 0 {
            return Err(IndexError::Corrupt(format!(
                "{} values do not form rows of dimension {dimension}",
                vectors.len()
            )));
        }
        Ok(Self {
            dimension,
            metric,
            vectors,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub(crate) fn raw(&self) -> &[f32] {
        &self.vectors
    }

    /// Append a vector; returns its position.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize, IndexError> {
        self.check_dimension(vector)?;
        let pos = self.len();
        self.vectors.extend_from_slice(vector);
        Ok(pos)
    }

    /// Positions and distances of the `k` closest vectors, closest first.
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        self.check_dimension(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .map(|row| self.metric.distance(query, row))
            .enumerate()
            .collect();
        // stable sort: ties stay in insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(rows: &[[f32; 2]]) -> FlatIndex {
        let mut idx = FlatIndex::new(2, DistanceMetric::Euclidean).unwrap();
        for r in rows {
            idx.add(r).unwrap();
        }
        idx
    }

    #[test]
    fn squared_l2_matches_naive() {
        let a: Vec<f32> = (0..70).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..70).map(|i| (70 - i) as f32 * 0.25).collect();
        let naive: f32 = a.iter().zip(&b).map(|(x, y)| (x - y) * (x - y)).sum();
        assert!((squared_l2(&a, &b) - naive).abs() < 1e-2);
        assert_eq!(squared_l2(&[1.0, 2.0], &[4.0, 6.0]), 25.0);
    }

    #[test]
    fn nearest_first() {
        let idx = index(&[[10.0, 0.0], [1.0, 0.0], [5.0, 0.0]]);
        let hits = idx.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits, vec![(1, 1.0), (2, 25.0)]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let idx = index(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]]);
        let hits = idx.search(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn k_larger_than_len() {
        let idx = index(&[[1.0, 1.0]]);
        assert_eq!(idx.search(&[0.0, 0.0], 10).unwrap().len(), 1);
        assert!(idx.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn wrong_dimension_rejected() {
        let mut idx = index(&[]);
        assert_eq!(
            idx.add(&[1.0, 2.0, 3.0]),
            Err(IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert!(matches!(
            idx.search(&[1.0], 1),
            Err(IndexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn raw_shape_is_checked() {
        assert!(FlatIndex::from_raw(3, DistanceMetric::Euclidean, vec![0.0; 7]).is_err());
        let idx = FlatIndex::from_raw(3, DistanceMetric::Euclidean, vec![0.0; 6]).unwrap();
        assert_eq!(idx.len(), 2);
    }
}
