use serde::{Serialize, Deserialize};

use std::path::Path;

use crate::{
    constants::DEFAULT_MAX_ITER,
    error::Result,
};
use super::enum_learner_algorithm::EnumLearner;


/// A struct that builds [`EnumLearner`].
///
/// # Example
///
/// ```
/// use enumboost::prelude::*;
///
/// let weak_learner = EnumLearnerBuilder::new()
///     .max_iter(10)
///     .cluster_scope(2)
///     .build();
/// assert_eq!(weak_learner.max_iter(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLearnerBuilder {
    max_iter: usize,
    cluster_scope: Option<usize>,
}


impl EnumLearnerBuilder {
    /// Construct a new instance of [`EnumLearnerBuilder`].
    /// By default, the parameters are
    /// ```text
    /// max_iter: DEFAULT_MAX_ITER == 20,
    /// cluster_scope: None,
    /// ```
    pub fn new() -> Self {
        Self { max_iter: DEFAULT_MAX_ITER, cluster_scope: None }
    }


    /// Set the maximal number of vote/coefficient updates
    /// per start point of the optimization.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }


    /// Restrict the feature search to the cluster of `coordinate`
    /// in the shared cluster assignment.
    pub fn cluster_scope(mut self, coordinate: usize) -> Self {
        self.cluster_scope = Some(coordinate);
        self
    }


    /// Build an empty [`EnumLearner`].
    pub fn build(&self) -> EnumLearner {
        EnumLearner::with_config(self.max_iter, self.cluster_scope)
    }
}


impl Default for EnumLearnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}


/// The JSON form of [`EnumLearnerBuilder`].
///
/// ```json
/// { "max_iter": 20, "cluster_scope": 3 }
/// ```
/// Missing keys take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LearnerConfig {
    /// See [`EnumLearnerBuilder::max_iter`].
    pub max_iter: usize,
    /// See [`EnumLearnerBuilder::cluster_scope`].
    pub cluster_scope: Option<usize>,
}


impl Default for LearnerConfig {
    fn default() -> Self {
        Self { max_iter: DEFAULT_MAX_ITER, cluster_scope: None }
    }
}


impl LearnerConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }


    /// Parse a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }


    /// Returns the builder with these parameters.
    pub fn builder(&self) -> EnumLearnerBuilder {
        let builder = EnumLearnerBuilder::new().max_iter(self.max_iter);
        match self.cluster_scope {
            Some(c) => builder.cluster_scope(c),
            None => builder,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = LearnerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LearnerConfig::default());
        assert_eq!(config.builder(), EnumLearnerBuilder::new());
    }

    #[test]
    fn test_config_to_builder() {
        let config = LearnerConfig::from_json_str(
            r#"{ "max_iter": 5, "cluster_scope": 1 }"#
        ).unwrap();
        let learner = config.builder().build();
        assert_eq!(learner.max_iter(), 5);
        assert_eq!(learner.cluster_scope(), Some(1));
    }

    #[test]
    fn test_config_rejects_unknown_key() {
        assert!(LearnerConfig::from_json_str(r#"{ "depth": 2 }"#).is_err());
    }
}
