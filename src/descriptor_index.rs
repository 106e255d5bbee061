//! Exact nearest-neighbor search over the database's shape descriptors.
//!
//! `DescriptorIndex` stores the descriptors of all loaded views as one
//! contiguous matrix and answers k-nearest queries with an exact scan.
//! In 308 dimensions space-partitioning trees degrade to scans anyway,
//! and the exact scan keeps the result contract simple: neighbors are
//! ordered by ascending Euclidean distance with ties broken by ascending
//! database index, and repeated queries on an unchanged index return
//! identical results.

/// One nearest-neighbor match.
///
/// `index` is the position of the matched view in the database it was
/// built from; positions are stable for the lifetime of the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f32,
}

/// Flat descriptor matrix with exact k-NN queries.
#[derive(Debug, Clone)]
pub struct DescriptorIndex {
    dim: usize,
    data: Vec<f32>,
}

impl DescriptorIndex {
    /// Build an index over the given descriptors.
    ///
    /// All descriptors must share one length; row order defines the
    /// indices returned by [`query`](Self::query). An empty slice builds
    /// an empty index whose queries return nothing.
    pub fn build(descriptors: &[Vec<f32>]) -> Self {
        let dim = descriptors.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(dim * descriptors.len());
        for d in descriptors {
            assert_eq!(d.len(), dim, "descriptor length mismatch");
            data.extend_from_slice(d);
        }
        Self { dim, data }
    }

    /// Number of descriptors in the index.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Descriptor dimensionality (zero for an empty index).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Find the `k` nearest descriptors to `vector` by Euclidean distance.
    ///
    /// Returns up to `k` neighbors sorted by ascending distance, ties by
    /// ascending index. Fewer than `k` stored descriptors simply yield a
    /// shorter result. A query whose length does not match the index
    /// dimensionality returns nothing.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<Neighbor> {
        if self.is_empty() || k == 0 || vector.len() != self.dim {
            return Vec::new();
        }

        // Squared distances accumulate in f64; f32 sums lose enough
        // precision over 308 components to reorder near-ties.
        let mut ranked: Vec<(f64, usize)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(idx, row)| (squared_distance(vector, row), idx))
            .collect();
        ranked.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ranked.truncate(k);

        ranked
            .into_iter()
            .map(|(d2, index)| Neighbor {
                index,
                distance: d2.sqrt() as f32,
            })
            .collect()
    }
}

#[inline]
fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut sum = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = (*x - *y) as f64;
        sum += d * d;
    }
    sum
}
