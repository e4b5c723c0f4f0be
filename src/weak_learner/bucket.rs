//! Per-bucket class edges of a single feature.
//!
//! A *bucket* is the set of examples that share a value of the feature.
//! For bucket `v` and class `l`, the class edge is
//! `r[v][l] = sum_{i in v} s[i][l]`.
//! The edge of a factorized hypothesis `h_l(x) = vote(x) * u_l` is
//! `sum_v vote_v * sum_l u_l * r[v][l]`.
use crate::{
    constants::EDGE_TOLERANCE,
    dataset::WeightedDataset,
    error::{BoostError, Result},
};


/// The distinct values of a feature and their class edges.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BucketEdges {
    n_class: usize,
    values: Vec<f64>,
    edges: Vec<f64>,
}


impl BucketEdges {
    /// Group the examples of `data` by the value of `feature`.
    /// Values are ordered by [`f64::total_cmp`] and `-0.0` is merged
    /// into `0.0`.
    pub(crate) fn accumulate(data: &dyn WeightedDataset, feature: usize)
        -> Result<Self>
    {
        let n_class = data.n_class();
        let mut votes = data.feature_votes(feature);
        if let Some(i) = votes.iter().position(|(v, _)| v.is_nan()) {
            return Err(BoostError::invalid_training_set(format!(
                "feature {feature} of example {i} is NaN"
            )));
        }
        votes.iter_mut().for_each(|(v, _)| *v = normalize(*v));
        votes.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut values = Vec::new();
        let mut edges: Vec<f64> = Vec::new();
        for (value, signed) in votes {
            if values.last() != Some(&value) {
                values.push(value);
                edges.extend(std::iter::repeat(0f64).take(n_class));
            }
            let start = edges.len() - n_class;
            edges[start..].iter_mut()
                .zip(signed)
                .for_each(|(r, s)| *r += s);
        }

        Ok(Self { n_class, values, edges })
    }


    pub(crate) fn n_bucket(&self) -> usize {
        self.values.len()
    }


    pub(crate) fn values(&self) -> &[f64] {
        &self.values[..]
    }


    /// Class edges of the `v`-th bucket.
    #[inline]
    pub(crate) fn row(&self, v: usize) -> &[f64] {
        &self.edges[v * self.n_class..(v + 1) * self.n_class]
    }


    /// `sum_v r[v][l]` for every class `l`.
    pub(crate) fn class_totals(&self) -> Vec<f64> {
        let mut totals = vec![0f64; self.n_class];
        for v in 0..self.n_bucket() {
            totals.iter_mut()
                .zip(self.row(v))
                .for_each(|(t, r)| *t += r);
        }
        totals
    }


    /// The `C x C` matrix `sum_v r[v][l] * r[v][l']`, row-major.
    pub(crate) fn gram(&self) -> Vec<f64> {
        let n = self.n_class;
        let mut gram = vec![0f64; n * n];
        for v in 0..self.n_bucket() {
            let row = self.row(v);
            for (l, rl) in row.iter().enumerate() {
                for (k, rk) in row.iter().enumerate() {
                    gram[l * n + k] += rl * rk;
                }
            }
        }
        gram
    }


    fn edge(&self, u: &[f64], votes: &[f64]) -> f64 {
        votes.iter()
            .enumerate()
            .map(|(v, vote)| vote * dot(u, self.row(v)))
            .sum()
    }


    /// The best vote of every bucket for a fixed `u`.
    /// A bucket with no preference votes `+1`.
    fn best_votes(&self, u: &[f64]) -> Vec<f64> {
        (0..self.n_bucket())
            .map(|v| if dot(u, self.row(v)) >= 0f64 { 1f64 } else { -1f64 })
            .collect()
    }


    /// The best coefficients for fixed votes.
    /// A class with no preference gets `0`.
    fn best_u(&self, votes: &[f64]) -> Vec<f64> {
        let mut sums = vec![0f64; self.n_class];
        for (v, vote) in votes.iter().enumerate() {
            sums.iter_mut()
                .zip(self.row(v))
                .for_each(|(s, r)| *s += vote * r);
        }
        sums.into_iter().map(sign).collect()
    }
}


/// The result of [`maximize_edge`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FactorizedVote {
    pub(crate) u: Vec<f64>,
    pub(crate) votes: Vec<f64>,
    pub(crate) edge: f64,
}


/// Maximize the edge of `h_l(x) = vote(x) * u_l` over votes in `{-1, +1}`
/// and coefficients in `{-1, 0, +1}`.
///
/// The search alternates between the best votes for the current
/// coefficients and the best coefficients for the current votes, from
/// `1 + C` start points: all votes `+1`, then one-vs-rest for each class.
/// The first start point reaching the largest edge wins.
pub(crate) fn maximize_edge(edges: &BucketEdges, max_iter: usize)
    -> FactorizedVote
{
    let all_positive = vec![1f64; edges.n_bucket()];
    let mut best = climb(edges, edges.best_u(&all_positive), max_iter);

    for l in 0..edges.n_class {
        let mut u = vec![-1f64; edges.n_class];
        u[l] = 1f64;
        let candidate = climb(edges, u, max_iter);
        if candidate.edge > best.edge + EDGE_TOLERANCE {
            best = candidate;
        }
    }
    best
}


fn climb(edges: &BucketEdges, mut u: Vec<f64>, max_iter: usize)
    -> FactorizedVote
{
    let mut votes = edges.best_votes(&u);
    let mut edge = edges.edge(&u, &votes);

    for _ in 0..max_iter {
        let next_u = edges.best_u(&votes);
        let next_votes = edges.best_votes(&next_u);
        let next_edge = edges.edge(&next_u, &next_votes);
        if next_edge <= edge + EDGE_TOLERANCE {
            break;
        }
        u = next_u;
        votes = next_votes;
        edge = next_edge;
    }
    FactorizedVote { u, votes, edge }
}


/// Map `-0.0` to `0.0`; every other value is left as is.
#[inline]
pub(crate) fn normalize(value: f64) -> f64 {
    value + 0f64
}


#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}


#[inline]
fn sign(x: f64) -> f64 {
    if x > 0f64 {
        1f64
    } else if x < 0f64 {
        -1f64
    } else {
        0f64
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sample, dataset::{Distribution, WeightedSample}};

    fn scenario() -> Sample {
        Sample::new(
            vec![
                vec![0.0, 5.0],
                vec![1.0, 5.0],
                vec![2.0, 5.0],
                vec![0.0, 5.0],
            ],
            vec![0, 1, 2, 0],
        ).unwrap()
    }

    #[test]
    fn test_buckets_are_sorted_and_merged() {
        let sample = Sample::new(
            vec![vec![1.0], vec![-0.0], vec![0.0], vec![-3.0]],
            vec![0, 1, 0, 1],
        ).unwrap();
        let dist = Distribution::uniform(4, 2);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let edges = BucketEdges::accumulate(&data, 0).unwrap();

        assert_eq!(edges.values(), &[-3.0, 0.0, 1.0]);
        assert!(edges.values()[1].is_sign_positive());
        // Examples 1 and 2 cancel out.
        assert_eq!(edges.row(1), &[0.0, 0.0]);
    }

    #[test]
    fn test_nan_is_rejected() {
        let sample = Sample::new(vec![vec![f64::NAN]], vec![0]).unwrap();
        let dist = Distribution::uniform(1, 1);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let err = BucketEdges::accumulate(&data, 0).unwrap_err();
        assert!(matches!(err, BoostError::InvalidTrainingSet { .. }));
    }

    #[test]
    fn test_one_vs_rest_start_escapes() {
        let sample = scenario();
        let dist = Distribution::uniform(4, 3);
        let data = WeightedSample::new(&sample, &dist).unwrap();

        let edges = BucketEdges::accumulate(&data, 0).unwrap();
        let best = maximize_edge(&edges, 20);
        assert!((best.edge - 8.0 / 12.0).abs() < 1e-12, "{best:?}");
        assert_eq!(best.u, vec![1.0, -1.0, -1.0]);
        assert_eq!(best.votes, vec![1.0, -1.0, -1.0]);

        let constant = BucketEdges::accumulate(&data, 1).unwrap();
        let best = maximize_edge(&constant, 20);
        assert!((best.edge - 4.0 / 12.0).abs() < 1e-12, "{best:?}");
    }

    #[test]
    fn test_gram_is_symmetric() {
        let sample = scenario();
        let dist = Distribution::uniform(4, 3);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let gram = BucketEdges::accumulate(&data, 0).unwrap().gram();
        for l in 0..3 {
            for k in 0..3 {
                assert_eq!(gram[l * 3 + k], gram[k * 3 + l]);
            }
        }
    }
}
