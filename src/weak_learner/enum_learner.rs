/// Defines the builder of `EnumLearner`.
pub mod builder;
/// Defines `EnumLearner`.
pub mod enum_learner_algorithm;


pub use builder::{EnumLearnerBuilder, LearnerConfig};
pub use enum_learner_algorithm::EnumLearner;
