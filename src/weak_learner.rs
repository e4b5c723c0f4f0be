//! The files in `weak_learner/` directory defines
//! `WeakLearner` trait and weak learners.

/// Provides WeakLearner trait.
pub mod core;

/// State and search shared by single-feature learners.
pub mod featurewise;

/// Defines `EnumLearner`.
pub mod enum_learner;

/// Defines `StumpLearner`.
pub mod stump;

/// Defines the similarity-matrix mode.
pub mod similarity;

pub(crate) mod bucket;


pub use self::core::{
    WeakLearner,
    DynTagWriter,
    DynTokenizer,
    save_to_string,
    load_from_str,
};

pub use self::featurewise::FeaturewiseState;

pub use self::enum_learner::{
    EnumLearner,
    EnumLearnerBuilder,
    LearnerConfig,
};

pub use self::stump::StumpLearner;

pub use self::similarity::{
    SimilarityMatrix,
    SimilarityMatrixBuilder,
};
