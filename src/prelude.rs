//! Exports the boosting driver, the weak learners and the data types.
//!
pub use crate::booster::{
    // Booster trait
    Booster,

    // Multiclass boosting
    AdaBoostMH,
};


pub use crate::weak_learner::{
    // Weak learner trait
    WeakLearner,

    // Enumerated-feature learner
    EnumLearner,
    EnumLearnerBuilder,
    LearnerConfig,

    // Threshold learner
    StumpLearner,

    // Collaborative filtering
    SimilarityMatrix,
    SimilarityMatrixBuilder,
};


pub use crate::cluster::{
    ClusterAssignment,
    SharedClusters,
};


pub use crate::dataset::{
    Distribution,
    WeightedDataset,
    WeightedSample,
};


pub use crate::sample::{
    Feature,
    Sample,
    SampleReader,
};


pub use crate::hypothesis::Ensemble;
pub use crate::registry::LearnerRegistry;
pub use crate::logger::{CurrentHypothesis, Logger};
pub use crate::error::BoostError;
