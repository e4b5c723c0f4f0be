//! Cluster assignment over coordinates, shared by every weak learner of a
//! boosting run.
use serde::{Serialize, Deserialize};

use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::error::{BoostError, Result};


/// Maps each coordinate to a cluster id in `0..k`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    clusters: Vec<usize>,
    k: usize,
}


impl ClusterAssignment {
    /// Build an assignment.
    /// Every id must be smaller than `k`.
    pub fn new(clusters: Vec<usize>, k: usize) -> Result<Self> {
        if let Some(&c) = clusters.iter().find(|&&c| c >= k) {
            return Err(BoostError::InvalidParameter {
                name: "clusters",
                reason: format!("cluster id {c} is not smaller than k = {k}"),
            });
        }
        Ok(Self { clusters, k })
    }


    /// Every coordinate in its own cluster.
    pub fn singletons(n: usize) -> Self {
        Self { clusters: (0..n).collect(), k: n }
    }


    /// Returns the number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }


    /// Returns the cluster id of every coordinate.
    pub fn clusters(&self) -> &[usize] {
        &self.clusters[..]
    }


    /// Returns the number of coordinates.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }


    /// Returns `true` if no coordinate is assigned.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }


    /// Returns the cluster of `coordinate`,
    /// `None` if it is not covered by the assignment.
    pub fn cluster_of(&self, coordinate: usize) -> Option<usize> {
        self.clusters.get(coordinate).copied()
    }


    /// Returns the coordinates in the same cluster as `coordinate`,
    /// `coordinate` included.
    pub fn members_with(&self, coordinate: usize) -> Vec<usize> {
        let Some(c) = self.cluster_of(coordinate) else {
            return Vec::new();
        };
        self.clusters.iter()
            .enumerate()
            .filter_map(|(i, &ci)| (ci == c).then_some(i))
            .collect()
    }


    /// Read an assignment from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let assignment: Self = serde_json::from_str(json)?;
        Self::new(assignment.clusters, assignment.k)
    }


    /// Read an assignment from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }


    /// Write the assignment as JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}


/// A handle on the current [`ClusterAssignment`] snapshot.
///
/// Clones share the same snapshot slot.
/// Readers take an `Arc` of the snapshot and never see a half-written
/// assignment; [`SharedClusters::replace`] swaps the whole snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedClusters {
    inner: Arc<RwLock<Option<Arc<ClusterAssignment>>>>,
}


impl SharedClusters {
    /// A handle with no assignment. Fitting with it searches every feature.
    pub fn new() -> Self {
        Self::default()
    }


    /// A handle that starts with `assignment`.
    pub fn with_assignment(assignment: ClusterAssignment) -> Self {
        let clusters = Self::new();
        clusters.replace(assignment);
        clusters
    }


    /// Returns the current snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<ClusterAssignment>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }


    /// Replace the snapshot.
    pub fn replace(&self, assignment: ClusterAssignment) {
        let assignment = Some(Arc::new(assignment));
        match self.inner.write() {
            Ok(mut guard) => *guard = assignment,
            Err(poisoned) => *poisoned.into_inner() = assignment,
        }
    }


    /// Drop the snapshot.
    pub fn clear(&self) {
        match self.inner.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
