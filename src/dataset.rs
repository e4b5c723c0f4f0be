//! The weighted view of a training set that weak learners read.
//!
//! Boosting for multiclass problems (AdaBoost.MH) keeps one weight per
//! `(example, class)` pair. A weak learner never needs the weights and the
//! labels separately: it reads the **signed** weight
//! `s[i][l] = w[i][l] * y[i][l]`, where `y[i][l]` is `+1` if `l` is the
//! class of example `i` and `-1` otherwise.
use crate::{
    Sample,
    error::{BoostError, Result},
};


/// The dataset collaborator of a weak learner.
///
/// Implementors must not change between the start and the end of a
/// [`WeakLearner::fit`](crate::WeakLearner::fit) call.
pub trait WeightedDataset: Sync {
    /// Number of classes `C`.
    fn n_class(&self) -> usize;

    /// Number of features `F`.
    fn n_feature(&self) -> usize;

    /// Number of examples `m`.
    fn n_example(&self) -> usize;

    /// Value of `feature` for `example`.
    fn value(&self, feature: usize, example: usize) -> f64;

    /// Signed per-class weights `s[example][0..C]`.
    fn signed_weights(&self, example: usize) -> &[f64];

    /// The `(value, signed per-class weights)` pairs of `feature`,
    /// in example order.
    fn feature_votes(&self, feature: usize) -> Vec<(f64, &[f64])> {
        (0..self.n_example())
            .map(|i| (self.value(feature, i), self.signed_weights(i)))
            .collect()
    }

    /// Sum of all weights, `sum_i sum_l |s[i][l]|`.
    fn total_weight(&self) -> f64 {
        (0..self.n_example())
            .map(|i| {
                self.signed_weights(i)
                    .iter()
                    .map(|s| s.abs())
                    .sum::<f64>()
            })
            .sum()
    }
}


/// Weights on `(example, class)` pairs, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    n_class: usize,
    weights: Vec<f64>,
}


impl Distribution {
    /// The uniform distribution `1 / (m * C)`.
    pub fn uniform(n_example: usize, n_class: usize) -> Self {
        let size = n_example * n_class;
        let w = if size > 0 { 1f64 / size as f64 } else { 0f64 };
        Self { n_class, weights: vec![w; size] }
    }


    /// The initial AdaBoost.MH distribution:
    /// half of the mass on the true classes,
    /// half spread over the other classes.
    /// With a single class every example gets `1 / m`.
    pub fn adaboost_mh(sample: &Sample) -> Self {
        let n_example = sample.shape().0;
        let n_class = sample.n_class();
        let m = n_example as f64;

        let mut weights = vec![0f64; n_example * n_class];
        for (i, &y) in sample.target().iter().enumerate() {
            let row = &mut weights[i * n_class..(i + 1) * n_class];
            if n_class == 1 {
                row[0] = 1f64 / m;
                continue;
            }
            let off = 1f64 / (2f64 * m * (n_class - 1) as f64);
            row.iter_mut().for_each(|w| *w = off);
            row[y] = 1f64 / (2f64 * m);
        }
        Self { n_class, weights }
    }


    /// Build a distribution from one weight row per example.
    /// Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_class = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(i) = rows.iter().position(|r| r.len() != n_class) {
            return Err(BoostError::invalid_training_set(format!(
                "weight row {i} has {} entries, expected {n_class}",
                rows[i].len(),
            )));
        }
        let weights = rows.into_iter().flatten().collect();
        Ok(Self { n_class, weights })
    }


    /// Returns the number of classes.
    pub fn n_class(&self) -> usize {
        self.n_class
    }


    /// Returns the number of examples.
    pub fn n_example(&self) -> usize {
        if self.n_class == 0 { 0 } else { self.weights.len() / self.n_class }
    }


    /// Weights of the `i`-th example.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.weights[i * self.n_class..(i + 1) * self.n_class]
    }


    /// Mutable weights of the `i`-th example.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.weights[i * self.n_class..(i + 1) * self.n_class]
    }


    /// Rescale the weights so that they sum to `1`.
    /// A zero distribution is left as is.
    pub fn normalize(&mut self) {
        let total = self.weights.iter().sum::<f64>();
        if total > 0f64 {
            self.weights.iter_mut().for_each(|w| *w /= total);
        }
    }


    /// Returns all weights, row-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.weights[..]
    }


    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.weights[..]
    }
}


/// A [`Sample`] together with a [`Distribution`] over it.
/// This is the [`WeightedDataset`] the boosting driver hands to weak
/// learners.
pub struct WeightedSample<'a> {
    sample: &'a Sample,
    n_class: usize,
    signed: Vec<f64>,
}


impl<'a> WeightedSample<'a> {
    /// Combine `sample` and `dist`.
    /// Fails if the shapes disagree or a weight is negative or not finite.
    pub fn new(sample: &'a Sample, dist: &Distribution) -> Result<Self> {
        let n_example = sample.shape().0;
        let n_class = sample.n_class();

        if sample.target().len() != n_example {
            return Err(BoostError::invalid_training_set(
                "the target column is not set"
            ));
        }
        if dist.n_class() != n_class || dist.n_example() != n_example {
            return Err(BoostError::invalid_training_set(format!(
                "the sample has shape {n_example} x {n_class} \
                but the distribution has shape {} x {}",
                dist.n_example(), dist.n_class(),
            )));
        }
        if let Some(w) = dist.as_slice().iter().find(|w| !w.is_finite() || **w < 0f64) {
            return Err(BoostError::invalid_training_set(format!(
                "weights must be finite and non-negative, got {w}"
            )));
        }

        let mut signed = dist.as_slice().to_vec();
        for (i, &y) in sample.target().iter().enumerate() {
            signed[i * n_class..(i + 1) * n_class]
                .iter_mut()
                .enumerate()
                .for_each(|(l, s)| if l != y { *s = -*s; });
        }

        Ok(Self { sample, n_class, signed })
    }


    /// Returns the underlying sample.
    pub fn sample(&self) -> &'a Sample {
        self.sample
    }
}


impl WeightedDataset for WeightedSample<'_> {
    fn n_class(&self) -> usize {
        self.n_class
    }


    fn n_feature(&self) -> usize {
        self.sample.shape().1
    }


    fn n_example(&self) -> usize {
        self.sample.shape().0
    }


    #[inline]
    fn value(&self, feature: usize, example: usize) -> f64 {
        self.sample.value(feature, example)
    }


    #[inline]
    fn signed_weights(&self, example: usize) -> &[f64] {
        &self.signed[example * self.n_class..(example + 1) * self.n_class]
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Sample {
        Sample::new(
            vec![vec![0.0], vec![1.0], vec![1.0]],
            vec![0, 1, 2],
        ).unwrap()
    }

    #[test]
    fn test_adaboost_mh_distribution() {
        let sample = toy();
        let dist = Distribution::adaboost_mh(&sample);
        let total = dist.as_slice().iter().sum::<f64>();
        assert!((total - 1.0).abs() < 1e-12, "total = {total}");
        assert_eq!(dist.row(1), &[1.0 / 12.0, 1.0 / 6.0, 1.0 / 12.0]);
    }

    #[test]
    fn test_signed_weights() {
        let sample = toy();
        let dist = Distribution::uniform(3, 3);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let w = 1.0 / 9.0;
        assert_eq!(data.signed_weights(2), &[-w, -w, w]);
        assert!((data.total_weight() - 1.0).abs() < 1e-12);

        let votes = data.feature_votes(0);
        assert_eq!(votes.len(), 3);
        assert_eq!(votes[1].0, 1.0);
    }

    #[test]
    fn test_rejects_negative_weight() {
        let sample = toy();
        let mut dist = Distribution::uniform(3, 3);
        dist.row_mut(0)[1] = -0.5;
        let err = WeightedSample::new(&sample, &dist).err().unwrap();
        assert!(matches!(err, BoostError::InvalidTrainingSet { .. }));
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let sample = toy();
        let dist = Distribution::uniform(2, 3);
        assert!(WeightedSample::new(&sample, &dist).is_err());
    }
}
