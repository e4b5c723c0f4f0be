#![warn(missing_docs)]

//!
//! A crate that provides `EnumLearner`, a weak learner for multiclass
//! boosting over discrete (enumerated) features, and the pieces needed
//! to train and persist it.
//!
//! - [`EnumLearner`] selects one feature, gives every distinct value of
//!   it a vote in `{-1, +1}` and every class a coefficient in
//!   `{-1, 0, +1}`. The score for class `l` is `vote(x[f]) * u[l]`.
//! - [`AdaBoostMH`] combines such learners into an [`Ensemble`].
//! - [`SimilarityMatrixBuilder`] clusters the classes (read as
//!   coordinates in collaborative filtering) and publishes the result in a
//!   [`SharedClusters`] handle, which restricts the feature search of
//!   learners configured with a cluster scope.
//! - Learners and ensembles are saved in a tagged text format
//!   ([`TagWriter`], [`StreamTokenizer`]) and rebuilt by name through
//!   a [`LearnerRegistry`].
//!
//! ```
//! use enumboost::prelude::*;
//!
//! let sample = Sample::new(
//!     vec![vec![0.0, 7.0], vec![1.0, 7.0], vec![2.0, 7.0], vec![0.0, 7.0]],
//!     vec![0, 1, 2, 0],
//! ).unwrap();
//!
//! let mut booster = AdaBoostMH::init(&sample).force_quit_at(10);
//! let f = booster.run(&EnumLearner::new()).unwrap();
//!
//! let text = f.to_tagged_string().unwrap();
//! let g = Ensemble::from_reader(text.as_bytes(), &LearnerRegistry::with_defaults())
//!     .unwrap();
//! assert_eq!(g.predict_all(&sample).unwrap(), f.predict_all(&sample).unwrap());
//! ```

pub mod booster;
pub mod cluster;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod hypothesis;
pub mod logger;
pub mod logging;
pub mod registry;
pub mod sample;
pub mod serialization;
pub mod weak_learner;

pub mod prelude;


pub use booster::{Booster, AdaBoostMH};
pub use cluster::{ClusterAssignment, SharedClusters};
pub use dataset::{Distribution, WeightedDataset, WeightedSample};
pub use error::{BoostError, Result};
pub use hypothesis::Ensemble;
pub use logger::{CurrentHypothesis, Logger};
pub use registry::LearnerRegistry;
pub use sample::{Feature, Sample, SampleReader};
pub use serialization::{Field, StreamTokenizer, TagWriter, Token};

pub use weak_learner::{
    WeakLearner,
    FeaturewiseState,
    EnumLearner,
    EnumLearnerBuilder,
    LearnerConfig,
    StumpLearner,
    SimilarityMatrix,
    SimilarityMatrixBuilder,
};
