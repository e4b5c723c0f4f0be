//! State and search shared by weak learners that look at one feature.
use fixedbitset::FixedBitSet;
use rayon::prelude::*;

use crate::{
    cluster::SharedClusters,
    dataset::WeightedDataset,
    error::{BoostError, Result},
    serialization::Field,
};
use super::core::{DynTagWriter, DynTokenizer};


/// The part of a single-feature learner's state that every such learner
/// owns: the index of the selected feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturewiseState {
    selected: Option<usize>,
}


impl FeaturewiseState {
    /// Returns the selected feature.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }


    pub(crate) fn select(&mut self, feature: usize) {
        self.selected = Some(feature);
    }


    pub(crate) fn save(&self, out: &mut DynTagWriter<'_>) -> Result<()> {
        let tag = Field::Column.tag();
        let feature = self.selected
            .ok_or_else(|| BoostError::malformed(tag, "no feature is selected"))?;
        out.leaf(tag, feature)?;
        Ok(())
    }


    pub(crate) fn load(&mut self, st: &mut DynTokenizer<'_>) -> Result<()> {
        self.selected = Some(st.read_leaf::<usize>(Field::Column.tag())?);
        Ok(())
    }


    pub(crate) fn copy_into(&self, other: &mut Self) {
        other.selected = self.selected;
    }
}


/// The score of one candidate feature.
#[derive(Debug, Clone)]
pub(crate) struct Candidate<T> {
    /// `(1 - edge / W) / 2`.
    pub(crate) error: f64,
    /// `sqrt(1 - (edge / W)^2)`.
    pub(crate) energy: f64,
    pub(crate) state: T,
}


impl<T> Candidate<T> {
    /// Score a hypothesis with the given `edge` on a dataset of total
    /// weight `total`. A zero total counts as a zero edge.
    pub(crate) fn new(edge: f64, total: f64, state: T) -> Self {
        let gamma = if total > 0f64 {
            (edge / total).clamp(-1f64, 1f64)
        } else {
            0f64
        };
        Self {
            error: (1f64 - gamma) / 2f64,
            energy: (1f64 - gamma * gamma).max(0f64).sqrt(),
            state,
        }
    }
}


/// Fail unless `data` has at least one example, feature and class.
pub(crate) fn check_dataset(data: &dyn WeightedDataset) -> Result<()> {
    if data.n_example() == 0 {
        return Err(BoostError::invalid_training_set("no examples"));
    }
    if data.n_feature() == 0 {
        return Err(BoostError::invalid_training_set("no features"));
    }
    if data.n_class() == 0 {
        return Err(BoostError::invalid_training_set("no classes"));
    }
    Ok(())
}


/// The features a learner scoped to coordinate `scope` may select.
///
/// Without a scope or a cluster snapshot every feature is a candidate.
/// Otherwise a feature is a candidate iff it lies in the same cluster
/// as `scope`. Features the assignment does not cover are never
/// candidates. If that leaves nothing, every feature is a candidate.
pub(crate) fn candidate_features(
    n_feature: usize,
    scope: Option<usize>,
    clusters: &SharedClusters,
) -> Vec<usize>
{
    let mut mask = FixedBitSet::with_capacity(n_feature);
    mask.insert_range(..);

    let snapshot = clusters.snapshot();
    if let (Some(scope), Some(assignment)) = (scope, snapshot.as_deref()) {
        mask.clear();
        if assignment.len() != n_feature {
            tracing::warn!(
                coordinates = assignment.len(),
                n_feature,
                "the cluster assignment does not cover the features \
                one to one, uncovered features are not candidates"
            );
        }
        assignment.members_with(scope)
            .into_iter()
            .filter(|&f| f < n_feature)
            .for_each(|f| mask.insert(f));
        if mask.count_ones(..) == 0 {
            tracing::warn!(
                scope,
                "no feature shares a cluster with the scope, \
                searching every feature"
            );
            mask.insert_range(..);
        }
    }
    mask.ones().collect()
}


/// Evaluate every candidate in parallel and return the one with
/// the smallest error. Ties go to the earliest candidate, so the result
/// does not depend on the number of threads.
pub(crate) fn select_best<T, F>(candidates: &[usize], eval: F)
    -> Result<Option<(usize, Candidate<T>)>>
    where T: Send,
          F: Fn(usize) -> Result<Candidate<T>> + Sync,
{
    let scored = candidates.par_iter()
        .map(|&f| eval(f).map(|c| (f, c)))
        .collect::<Result<Vec<_>>>()?;

    let mut best: Option<(usize, Candidate<T>)> = None;
    for (f, candidate) in scored {
        let better = match &best {
            Some((_, b)) => candidate.error < b.error,
            None => true,
        };
        if better {
            best = Some((f, candidate));
        }
    }
    Ok(best)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterAssignment;

    #[test]
    fn test_candidates_without_snapshot() {
        let clusters = SharedClusters::new();
        assert_eq!(candidate_features(3, Some(1), &clusters), vec![0, 1, 2]);
    }

    #[test]
    fn test_candidates_follow_the_scope() {
        let assignment = ClusterAssignment::new(vec![0, 1, 0, 1], 2).unwrap();
        let clusters = SharedClusters::with_assignment(assignment);
        assert_eq!(candidate_features(4, Some(2), &clusters), vec![0, 2]);
        assert_eq!(candidate_features(4, None, &clusters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_candidates_fall_back() {
        let assignment = ClusterAssignment::new(vec![1], 2).unwrap();
        let clusters = SharedClusters::with_assignment(assignment);
        // Scope 5 is not covered by the assignment.
        assert_eq!(candidate_features(3, Some(5), &clusters), vec![0, 1, 2]);
    }

    #[test]
    fn test_candidates_with_a_shorter_assignment() {
        let assignment = ClusterAssignment::new(vec![0, 1, 0], 2).unwrap();
        let clusters = SharedClusters::with_assignment(assignment);
        assert_eq!(candidate_features(5, Some(0), &clusters), vec![0, 2]);
        assert_eq!(candidate_features(5, Some(1), &clusters), vec![1]);
        assert_eq!(candidate_features(2, Some(0), &clusters), vec![0]);
    }

    #[test]
    fn test_select_best_prefers_lowest_index() {
        let errors = [0.3, 0.1, 0.1, 0.2];
        let best = select_best(&[0, 1, 2, 3], |f| {
            Ok(Candidate { error: errors[f], energy: 0.0, state: () })
        }).unwrap().unwrap();
        assert_eq!(best.0, 1);
    }

    #[test]
    fn test_candidate_scores() {
        let c = Candidate::new(0.5, 1.0, ());
        assert!((c.error - 0.25).abs() < 1e-12);
        assert!((c.energy - 0.75f64.sqrt()).abs() < 1e-12);

        let zero = Candidate::new(0.0, 0.0, ());
        assert_eq!(zero.energy, 1.0);
    }
}
