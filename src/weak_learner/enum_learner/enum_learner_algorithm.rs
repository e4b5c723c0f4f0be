use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use crate::{
    cluster::SharedClusters,
    constants::DEFAULT_MAX_ITER,
    dataset::WeightedDataset,
    error::{BoostError, Result},
    serialization::{Field, schema::BUCKET},
    weak_learner::{
        bucket::{self, BucketEdges, FactorizedVote},
        core::{DynTagWriter, DynTokenizer, WeakLearner},
        featurewise::{self, Candidate, FeaturewiseState},
    },
};


/// A weak learner for multiclass boosting that enumerates the values of
/// a single feature.
///
/// Each distinct value `v` of the selected feature (a *bucket*) gets a
/// vote in `{-1, +1}` and each class `l` a coefficient `u[l]` in
/// `{-1, 0, +1}`; the hypothesis is `h_l(x) = vote(x[f]) * u[l]`.
/// A value that did not occur in training votes `0`.
///
/// # Example
///
/// ```
/// use enumboost::prelude::*;
///
/// let sample = Sample::new(
///     vec![vec![0.0], vec![1.0], vec![2.0], vec![0.0]],
///     vec![0, 1, 2, 0],
/// ).unwrap();
/// let dist = Distribution::uniform(4, 3);
/// let data = WeightedSample::new(&sample, &dist).unwrap();
///
/// let mut learner = EnumLearnerBuilder::new().build();
/// let energy = learner.fit(&data, &SharedClusters::new()).unwrap();
/// assert!(energy < 1.0);
/// assert_eq!(learner.phi(0.0, 0).unwrap(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnumLearner {
    state: FeaturewiseState,
    u: Vec<f64>,
    /// `(value, vote)` pairs sorted by value.
    buckets: Vec<(f64, f64)>,

    max_iter: usize,
    cluster_scope: Option<usize>,
}


impl EnumLearner {
    /// The registry name of this learner.
    pub const NAME: &'static str = "EnumLearner";


    /// The fields written by `save`, in order.
    pub const LAYOUT: [Field; 3] = [Field::Column, Field::U, Field::Buckets];


    /// An empty learner with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_ITER, None)
    }


    pub(super) fn with_config(max_iter: usize, cluster_scope: Option<usize>)
        -> Self
    {
        Self {
            state: FeaturewiseState::default(),
            u: Vec::new(),
            buckets: Vec::new(),
            max_iter,
            cluster_scope,
        }
    }


    /// Returns the maximal number of alternating updates.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }


    /// Returns the coordinate whose cluster restricts the search.
    pub fn cluster_scope(&self) -> Option<usize> {
        self.cluster_scope
    }


    /// Returns the per-class coefficients.
    pub fn u(&self) -> &[f64] {
        &self.u[..]
    }


    /// Returns the `(value, vote)` table.
    pub fn buckets(&self) -> &[(f64, f64)] {
        &self.buckets[..]
    }


    /// The vote of the bucket holding `val`, `0` for an unseen value.
    pub fn vote(&self, val: f64) -> f64 {
        let val = bucket::normalize(val);
        self.buckets
            .binary_search_by(|(v, _)| v.total_cmp(&val))
            .map(|i| self.buckets[i].1)
            .unwrap_or(0f64)
    }


    fn load_u(st: &mut DynTokenizer<'_>, n_class: usize) -> Result<Vec<f64>> {
        let tag = Field::U.tag();
        let u = st.read_values::<f64>(tag)?;
        if u.len() != n_class {
            return Err(BoostError::malformed(tag, format!(
                "expected {n_class} coefficients, got {}", u.len()
            )));
        }
        if let Some(bad) = u.iter().find(|&&c| ![-1f64, 0f64, 1f64].contains(&c)) {
            return Err(BoostError::malformed(tag, format!(
                "coefficient {bad} is not one of -1, 0, 1"
            )));
        }
        Ok(u)
    }


    fn load_buckets(st: &mut DynTokenizer<'_>) -> Result<Vec<(f64, f64)>> {
        let tag = Field::Buckets.tag();
        st.expect_open(tag)?;

        let mut buckets: Vec<(f64, f64)> = Vec::new();
        while st.peek_is_open(BUCKET)? {
            let pair = st.read_values::<f64>(BUCKET)?;
            let &[value, vote] = &pair[..] else {
                return Err(BoostError::malformed(BUCKET, format!(
                    "expected `value vote`, got {} numbers", pair.len()
                )));
            };
            if value.is_nan() {
                return Err(BoostError::malformed(BUCKET, "value is NaN"));
            }
            if vote != 1f64 && vote != -1f64 {
                return Err(BoostError::malformed(BUCKET, format!(
                    "vote {vote} is not one of -1, 1"
                )));
            }
            if let Some((last, _)) = buckets.last() {
                if last.total_cmp(&value) != Ordering::Less {
                    return Err(BoostError::malformed(
                        BUCKET, "values are not strictly increasing"
                    ));
                }
            }
            buckets.push((value, vote));
        }
        st.expect_close(tag)?;
        Ok(buckets)
    }
}


impl Default for EnumLearner {
    fn default() -> Self {
        Self::new()
    }
}


impl WeakLearner for EnumLearner {
    fn name(&self) -> &str {
        Self::NAME
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let scope = self.cluster_scope
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        Some(vec![
            ("# of updates", format!("{}", self.max_iter)),
            ("Cluster scope", scope),
        ])
    }


    fn create(&self) -> Box<dyn WeakLearner> {
        Box::new(Self::with_config(self.max_iter, self.cluster_scope))
    }


    fn fit(&mut self, data: &dyn WeightedDataset, clusters: &SharedClusters)
        -> Result<f64>
    {
        featurewise::check_dataset(data)?;
        let candidates = featurewise::candidate_features(
            data.n_feature(), self.cluster_scope, clusters
        );
        let total = data.total_weight();
        let max_iter = self.max_iter;

        let best = featurewise::select_best(&candidates, |f| {
            let edges = BucketEdges::accumulate(data, f)?;
            let fitted = bucket::maximize_edge(&edges, max_iter);
            let edge = fitted.edge;
            Ok(Candidate::new(edge, total, (edges.values().to_vec(), fitted)))
        })?;
        let Some((feature, candidate)) = best else {
            return Err(BoostError::invalid_training_set("no candidate feature"));
        };

        let (values, FactorizedVote { u, votes, .. }) = candidate.state;
        self.state.select(feature);
        self.u = u;
        self.buckets = values.into_iter().zip(votes).collect();

        tracing::debug!(
            learner = Self::NAME,
            feature,
            error = candidate.error,
            energy = candidate.energy,
            "selected a feature",
        );
        Ok(candidate.energy)
    }


    fn phi(&self, _val: f64, class: usize) -> Result<f64> {
        self.u.get(class)
            .copied()
            .ok_or(BoostError::IndexOutOfRange { index: class, len: self.u.len() })
    }


    fn score(&self, val: f64, class: usize) -> Result<f64> {
        Ok(self.vote(val) * self.phi(val, class)?)
    }


    fn selected_feature(&self) -> Option<usize> {
        self.state.selected()
    }


    fn save(&self, out: &mut DynTagWriter<'_>) -> Result<()> {
        for field in Self::LAYOUT {
            match field {
                Field::Column => self.state.save(out)?,
                Field::U => out.values(field.tag(), &self.u)?,
                Field::Buckets => {
                    out.open(field.tag())?;
                    for &(value, vote) in &self.buckets {
                        out.values(BUCKET, &[value, vote])?;
                    }
                    out.close(field.tag())?;
                },
                Field::Threshold => {
                    return Err(BoostError::malformed(
                        field.tag(), "not a field of EnumLearner"
                    ));
                },
            }
        }
        Ok(())
    }


    fn load(&mut self, st: &mut DynTokenizer<'_>, n_class: usize) -> Result<()> {
        let mut state = FeaturewiseState::default();
        let mut u = Vec::new();
        let mut buckets = Vec::new();
        for field in Self::LAYOUT {
            match field {
                Field::Column => state.load(st)?,
                Field::U => u = Self::load_u(st, n_class)?,
                Field::Buckets => buckets = Self::load_buckets(st)?,
                Field::Threshold => {
                    return Err(BoostError::malformed(
                        field.tag(), "not a field of EnumLearner"
                    ));
                },
            }
        }
        self.state = state;
        self.u = u;
        self.buckets = buckets;
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
        target.u = self.u.clone();
        target.buckets = self.buckets.clone();
        Ok(())
    }


    fn as_any(&self) -> &dyn Any {
        self
    }


    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}


impl fmt::Display for EnumLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----------")?;
        writeln!(f, "# EnumLearner")?;
        match self.state.selected() {
            Some(feature) => writeln!(f, "- Feature: {feature}")?,
            None => writeln!(f, "- Feature: (not fitted)")?,
        }
        writeln!(f, "- u: {:?}", self.u)?;
        writeln!(f, "- # of buckets: {}", self.buckets.len())?;
        write!(f, "----------")
    }
}
