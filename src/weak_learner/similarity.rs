//! Similarity of coordinates under the current weighting, and the
//! cluster assignment derived from it.
//!
//! Here the "classes" of a [`WeightedDataset`] are read as coordinates
//! (users, items, ...). Two coordinates are similar when they push the
//! buckets of every feature in the same direction.
use kodama::{linkage, Method};
use rayon::prelude::*;

use crate::{
    cluster::{ClusterAssignment, SharedClusters},
    dataset::WeightedDataset,
    error::{BoostError, Result},
    weak_learner::{bucket::BucketEdges, featurewise},
};


/// A symmetric `n x n` matrix of cosine similarities.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}


impl SimilarityMatrix {
    /// Returns the number of coordinates.
    pub fn n(&self) -> usize {
        self.n
    }


    /// Similarity of coordinates `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }


    /// Similarities of coordinate `i` to every coordinate.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }


    /// Cosine similarities from a Gram matrix.
    fn from_gram(n: usize, gram: &[f64]) -> Self {
        let norms = (0..n)
            .map(|l| gram[l * n + l].max(0f64).sqrt())
            .collect::<Vec<_>>();
        let mut values = vec![0f64; n * n];
        for i in 0..n {
            for j in 0..n {
                values[i * n + j] = if i == j {
                    1f64
                } else if norms[i] > 0f64 && norms[j] > 0f64 {
                    (gram[i * n + j] / (norms[i] * norms[j])).clamp(-1f64, 1f64)
                } else {
                    0f64
                };
            }
        }
        Self { n, values }
    }


    /// Average-linkage clustering on `1 - similarity`, cut at `k` clusters.
    /// Cluster ids follow the order in which coordinates first appear.
    pub fn cluster(&self, k: usize) -> Result<ClusterAssignment> {
        let n = self.n;
        if k == 0 || k > n {
            return Err(BoostError::InvalidParameter {
                name: "k",
                reason: format!("expected a value in [1, {n}], got {k}"),
            });
        }
        if k == n {
            return Ok(ClusterAssignment::singletons(n));
        }

        let mut condensed = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n - 1 {
            for j in i + 1..n {
                condensed.push((1f64 - self.get(i, j)).clamp(0f64, 2f64));
            }
        }
        let dendrogram = linkage(&mut condensed, n, Method::Average);

        // Leaves are `0..n`, the `s`-th merge creates cluster `n + s`.
        let mut members = (0..n).map(|i| Some(vec![i])).collect::<Vec<_>>();
        for step in dendrogram.steps().iter().take(n - k) {
            let mut merged = members.get_mut(step.cluster1)
                .and_then(Option::take)
                .unwrap_or_default();
            merged.extend(
                members.get_mut(step.cluster2)
                    .and_then(Option::take)
                    .unwrap_or_default()
            );
            members.push(Some(merged));
        }

        let mut owner = vec![0usize; n];
        for (group, coords) in members.iter().flatten().enumerate() {
            coords.iter().for_each(|&c| owner[c] = group);
        }
        let mut relabel = std::collections::HashMap::new();
        let clusters = owner.into_iter()
            .map(|group| {
                let next = relabel.len();
                *relabel.entry(group).or_insert(next)
            })
            .collect();
        ClusterAssignment::new(clusters, k)
    }
}


/// Builds a [`SimilarityMatrix`] over the classes of a
/// [`WeightedDataset`] and turns it into a [`ClusterAssignment`].
///
/// ```
/// use enumboost::prelude::*;
///
/// let sample = Sample::new(
///     vec![vec![0.0], vec![0.0], vec![1.0]],
///     vec![0, 1, 2],
/// ).unwrap();
/// let dist = Distribution::uniform(3, 3);
/// let data = WeightedSample::new(&sample, &dist).unwrap();
///
/// let clusters = SharedClusters::new();
/// let assignment = SimilarityMatrixBuilder::new(2)
///     .generate(&data, &clusters)
///     .unwrap();
/// assert_eq!(assignment.clusters(), &[0, 0, 1]);
/// assert!(clusters.snapshot().is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityMatrixBuilder {
    k: usize,
}


impl SimilarityMatrixBuilder {
    /// Cluster into `k` groups.
    pub fn new(k: usize) -> Self {
        Self { k }
    }


    /// Returns the number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }


    /// Cosine similarity of the per-class edge profiles over every
    /// `(feature, bucket)` pair.
    pub fn similarity_matrix(&self, data: &dyn WeightedDataset)
        -> Result<SimilarityMatrix>
    {
        featurewise::check_dataset(data)?;
        let n = data.n_class();

        let grams = (0..data.n_feature())
            .into_par_iter()
            .map(|f| BucketEdges::accumulate(data, f).map(|e| e.gram()))
            .collect::<Result<Vec<_>>>()?;

        let mut gram = vec![0f64; n * n];
        for g in grams {
            gram.iter_mut().zip(g).for_each(|(a, b)| *a += b);
        }
        Ok(SimilarityMatrix::from_gram(n, &gram))
    }


    /// Cluster the classes of `data` and publish the result in `clusters`.
    pub fn generate(&self, data: &dyn WeightedDataset, clusters: &SharedClusters)
        -> Result<ClusterAssignment>
    {
        let n = data.n_class();
        if self.k == 0 || self.k > n {
            return Err(BoostError::InvalidParameter {
                name: "k",
                reason: format!("expected a value in [1, {n}], got {}", self.k),
            });
        }
        let assignment = self.similarity_matrix(data)?.cluster(self.k)?;
        clusters.replace(assignment.clone());
        tracing::info!(
            k = self.k,
            coordinates = n,
            "published a new cluster assignment",
        );
        Ok(assignment)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sample, dataset::{Distribution, WeightedSample}};

    fn twins() -> Sample {
        Sample::new(
            vec![vec![0.0, 3.0], vec![0.0, 3.0], vec![1.0, 4.0], vec![1.0, 3.0]],
            vec![0, 1, 2, 3],
        ).unwrap()
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let sample = twins();
        let dist = Distribution::uniform(4, 4);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let sim = SimilarityMatrixBuilder::new(2).similarity_matrix(&data).unwrap();

        for i in 0..4 {
            assert_eq!(sim.get(i, i), 1.0);
            for j in 0..4 {
                assert!((sim.get(i, j) - sim.get(j, i)).abs() < 1e-12);
            }
        }
        assert!((sim.get(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_profile_is_dissimilar() {
        let sample = twins();
        let dist = Distribution::from_rows(vec![
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.2, 0.1, 0.0, 0.1],
            vec![0.1, 0.1, 0.0, 0.1],
            vec![0.1, 0.1, 0.0, 0.3],
        ]).unwrap();
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let sim = SimilarityMatrixBuilder::new(2).similarity_matrix(&data).unwrap();
        assert_eq!(sim.get(2, 0), 0.0);
        assert_eq!(sim.get(2, 2), 1.0);
    }

    #[test]
    fn test_k_equal_to_n_gives_singletons() {
        let sample = twins();
        let dist = Distribution::uniform(4, 4);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let clusters = SharedClusters::new();
        let assignment = SimilarityMatrixBuilder::new(4)
            .generate(&data, &clusters)
            .unwrap();
        assert_eq!(assignment.clusters(), &[0, 1, 2, 3]);
        assert_eq!(*clusters.snapshot().unwrap(), assignment);
    }

    #[test]
    fn test_k_out_of_range() {
        let sample = twins();
        let dist = Distribution::uniform(4, 4);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let clusters = SharedClusters::new();
        for k in [0, 5] {
            let err = SimilarityMatrixBuilder::new(k)
                .generate(&data, &clusters)
                .unwrap_err();
            assert!(matches!(err, BoostError::InvalidParameter { name: "k", .. }));
        }
        assert!(clusters.snapshot().is_none());
    }

    #[test]
    fn test_single_cluster() {
        let sample = twins();
        let dist = Distribution::uniform(4, 4);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let assignment = SimilarityMatrixBuilder::new(1)
            .generate(&data, &SharedClusters::new())
            .unwrap();
        assert_eq!(assignment.clusters(), &[0, 0, 0, 0]);
    }
}
