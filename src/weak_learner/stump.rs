//! A threshold stump with per-class coefficients.
use std::any::Any;
use std::fmt;

use crate::{
    cluster::SharedClusters,
    constants::EDGE_TOLERANCE,
    dataset::WeightedDataset,
    error::{BoostError, Result},
    serialization::Field,
    weak_learner::{
        bucket::BucketEdges,
        core::{DynTagWriter, DynTokenizer, WeakLearner},
        featurewise::{self, Candidate, FeaturewiseState},
    },
};


/// A decision stump for multiclass boosting.
///
/// `phi(x, l)` is `+1` if `x > threshold` and `-1` otherwise,
/// and the score for class `l` is `u[l] * phi(x, l)`.
/// The stump always searches every feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StumpLearner {
    state: FeaturewiseState,
    threshold: f64,
    u: Vec<f64>,
}


impl StumpLearner {
    /// The registry name of this learner.
    pub const NAME: &'static str = "StumpLearner";


    /// The fields written by `save`, in order.
    pub const LAYOUT: [Field; 3] = [Field::Column, Field::Threshold, Field::U];


    /// An empty stump.
    pub fn new() -> Self {
        Self::default()
    }


    /// Returns the threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }


    /// Returns the per-class coefficients.
    pub fn u(&self) -> &[f64] {
        &self.u[..]
    }
}


/// Sweep the thresholds of one feature.
/// Returns the best `(threshold, u, edge)`.
fn best_split(edges: &BucketEdges) -> (f64, Vec<f64>, f64) {
    let values = edges.values();
    let totals = edges.class_totals();

    // Everything on the right.
    let mut threshold = f64::NEG_INFINITY;
    let mut diff = totals.clone();
    let mut best_edge = diff.iter().map(|d| d.abs()).sum::<f64>();

    let mut left = vec![0f64; totals.len()];
    for k in 0..values.len() - 1 {
        left.iter_mut()
            .zip(edges.row(k))
            .for_each(|(l, r)| *l += r);

        let d = totals.iter()
            .zip(&left)
            .map(|(t, l)| (t - l) - l)
            .collect::<Vec<_>>();
        let edge = d.iter().map(|d| d.abs()).sum::<f64>();
        if edge > best_edge + EDGE_TOLERANCE {
            best_edge = edge;
            diff = d;
            threshold = midpoint(values[k], values[k + 1]);
        }
    }

    let u = diff.into_iter()
        .map(|d| if d > 0f64 { 1f64 } else if d < 0f64 { -1f64 } else { 0f64 })
        .collect();
    (threshold, u, best_edge)
}


/// A threshold `t` with `a <= t < b`, for `a < b`.
fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a / 2f64 + b / 2f64;
    if mid < b { mid } else { a }
}


impl WeakLearner for StumpLearner {
    fn name(&self) -> &str {
        Self::NAME
    }


    fn create(&self) -> Box<dyn WeakLearner> {
        Box::new(Self::new())
    }


    fn fit(&mut self, data: &dyn WeightedDataset, clusters: &SharedClusters)
        -> Result<f64>
    {
        featurewise::check_dataset(data)?;
        let candidates = featurewise::candidate_features(
            data.n_feature(), None, clusters
        );
        let total = data.total_weight();

        let best = featurewise::select_best(&candidates, |f| {
            let edges = BucketEdges::accumulate(data, f)?;
            let (threshold, u, edge) = best_split(&edges);
            Ok(Candidate::new(edge, total, (threshold, u)))
        })?;
        let Some((feature, candidate)) = best else {
            return Err(BoostError::invalid_training_set("no candidate feature"));
        };

        let (threshold, u) = candidate.state;
        self.state.select(feature);
        self.threshold = threshold;
        self.u = u;

        tracing::debug!(
            learner = Self::NAME,
            feature,
            threshold,
            error = candidate.error,
            "selected a split",
        );
        Ok(candidate.energy)
    }


    fn phi(&self, val: f64, class: usize) -> Result<f64> {
        if class >= self.u.len() {
            return Err(BoostError::IndexOutOfRange {
                index: class,
                len: self.u.len(),
            });
        }
        Ok(if val > self.threshold { 1f64 } else { -1f64 })
    }


    fn score(&self, val: f64, class: usize) -> Result<f64> {
        let phi = self.phi(val, class)?;
        Ok(self.u[class] * phi)
    }


    fn selected_feature(&self) -> Option<usize> {
        self.state.selected()
    }


    fn save(&self, out: &mut DynTagWriter<'_>) -> Result<()> {
        for field in Self::LAYOUT {
            match field {
                Field::Column => self.state.save(out)?,
                Field::Threshold => out.leaf(field.tag(), self.threshold)?,
                Field::U => out.values(field.tag(), &self.u)?,
                Field::Buckets => {
                    return Err(BoostError::malformed(
                        field.tag(), "not a field of StumpLearner"
                    ));
                },
            }
        }
        Ok(())
    }


    fn load(&mut self, st: &mut DynTokenizer<'_>, n_class: usize) -> Result<()> {
        let mut loaded = Self::new();
        for field in Self::LAYOUT {
            match field {
                Field::Column => loaded.state.load(st)?,
                Field::Threshold => {
                    loaded.threshold = st.read_leaf::<f64>(field.tag())?;
                    if loaded.threshold.is_nan() {
                        return Err(BoostError::malformed(
                            field.tag(), "threshold is NaN"
                        ));
                    }
                },
                Field::U => {
                    loaded.u = st.read_values::<f64>(field.tag())?;
                    if loaded.u.len() != n_class {
                        return Err(BoostError::malformed(field.tag(), format!(
                            "expected {n_class} coefficients, got {}",
                            loaded.u.len()
                        )));
                    }
                    let bad = loaded.u.iter()
                        .find(|&&c| ![-1f64, 0f64, 1f64].contains(&c));
                    if let Some(bad) = bad {
                        return Err(BoostError::malformed(field.tag(), format!(
                            "coefficient {bad} is not one of -1, 0, 1"
                        )));
                    }
                },
                Field::Buckets => {
                    return Err(BoostError::malformed(
                        field.tag(), "not a field of StumpLearner"
                    ));
                },
            }
        }
        *self = loaded;
        Ok(())
    }


    fn copy_state_into(&self, target: &mut dyn WeakLearner) -> Result<()> {
        let found = target.name().to_string();
        let target = target.as_any_mut()
            .downcast_mut::<Self>()
            .ok_or_else(|| BoostError::TypeMismatch {
                expected: Self::NAME.to_string(),
                found,
            })?;
        self.state.copy_into(&mut target.state);
        target.threshold = self.threshold;
        target.u = self.u.clone();
        Ok(())
    }


    fn as_any(&self) -> &dyn Any {
        self
    }


    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}


impl fmt::Display for StumpLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.selected() {
            Some(feature) => write!(
                f,
                "StumpLearner(feature {feature} > {}, u = {:?})",
                self.threshold, self.u,
            ),
            None => write!(f, "StumpLearner(not fitted)"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Sample,
        dataset::{Distribution, WeightedSample},
        weak_learner::core::{load_from_str, save_to_string},
    };

    #[test]
    fn test_stump_splits_the_first_bucket() {
        let sample = Sample::new(
            vec![
                vec![0.0, 5.0],
                vec![1.0, 5.0],
                vec![2.0, 5.0],
                vec![0.0, 5.0],
            ],
            vec![0, 1, 2, 0],
        ).unwrap();
        let dist = Distribution::uniform(4, 3);
        let data = WeightedSample::new(&sample, &dist).unwrap();

        let mut stump = StumpLearner::new();
        let energy = stump.fit(&data, &SharedClusters::new()).unwrap();
        assert!((energy - (5.0f64 / 9.0).sqrt()).abs() < 1e-12);
        assert_eq!(stump.selected_feature(), Some(0));
        assert_eq!(stump.threshold(), 0.5);
        assert_eq!(stump.u(), &[-1.0, 1.0, 1.0]);

        assert_eq!(stump.phi(0.0, 0).unwrap(), -1.0);
        assert_eq!(stump.score(0.0, 0).unwrap(), 1.0);
        assert_eq!(stump.score(2.0, 2).unwrap(), 1.0);
        assert!(stump.phi(0.0, 3).is_err());
    }

    #[test]
    fn test_stump_save_then_load() {
        let sample = Sample::new(
            vec![vec![0.25], vec![0.75]], vec![0, 1]
        ).unwrap();
        let dist = Distribution::uniform(2, 2);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let mut stump = StumpLearner::new();
        stump.fit(&data, &SharedClusters::new()).unwrap();

        let text = save_to_string(&stump).unwrap();
        assert_eq!(
            text,
            "<column>0</column>\n<threshold>0.5</threshold>\n<u>-1 1</u>\n"
        );

        let mut loaded = StumpLearner::new();
        load_from_str(&mut loaded, &text, 2).unwrap();
        assert_eq!(loaded, stump);

        let wide_u = "<column>0</column><threshold>0.5</threshold><u>2 1</u>";
        let err = load_from_str(&mut loaded, wide_u, 2).unwrap_err();
        assert!(matches!(err, BoostError::MalformedState { ref tag, .. } if tag == "u"));
        assert_eq!(loaded, stump);
    }

    #[test]
    fn test_midpoint_at_the_float_limits() {
        assert_eq!(midpoint(0.0, 1.0), 0.5);
        assert_eq!(midpoint(f64::MAX / 2.0, f64::MAX), 0.75 * f64::MAX);
        assert_eq!(midpoint(-f64::MAX, f64::MAX), 0.0);

        let a = 1.0f64;
        let b = f64::from_bits(a.to_bits() + 1);
        let t = midpoint(a, b);
        assert!(a <= t && t < b);
    }

    #[test]
    fn test_stump_on_huge_values() {
        let big = 2f64.powi(60);
        let sample = Sample::new(
            vec![vec![big], vec![f64::MAX]], vec![0, 1]
        ).unwrap();
        let dist = Distribution::uniform(2, 2);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let mut stump = StumpLearner::new();
        stump.fit(&data, &SharedClusters::new()).unwrap();

        assert!(stump.threshold().is_finite());
        assert!(big <= stump.threshold() && stump.threshold() < f64::MAX);
        assert_eq!(stump.score(big, 0).unwrap(), 1.0);
        assert_eq!(stump.score(f64::MAX, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_stump_keeps_everything_on_the_right() {
        let big = 2f64.powi(60);
        let sample = Sample::new(vec![vec![big], vec![big]], vec![0, 1]).unwrap();
        let dist = Distribution::uniform(2, 2);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let mut stump = StumpLearner::new();
        stump.fit(&data, &SharedClusters::new()).unwrap();

        assert_eq!(stump.threshold(), f64::NEG_INFINITY);
        assert_eq!(stump.phi(big, 0).unwrap(), 1.0);

        let text = save_to_string(&stump).unwrap();
        let mut loaded = StumpLearner::new();
        load_from_str(&mut loaded, &text, 2).unwrap();
        assert_eq!(loaded, stump);
    }
}
