//! Name-to-constructor table used to rebuild learners from saved
//! ensembles.
use std::collections::HashMap;

use crate::{
    error::{BoostError, Result},
    weak_learner::{EnumLearner, StumpLearner, WeakLearner},
};


/// Builds an empty learner.
pub type Constructor = fn() -> Box<dyn WeakLearner>;


/// Maps the name a learner is saved under to a constructor.
///
/// ```
/// use enumboost::prelude::*;
///
/// let registry = LearnerRegistry::with_defaults();
/// let learner = registry.create("EnumLearner").unwrap();
/// assert_eq!(learner.name(), "EnumLearner");
/// assert!(registry.create("Perceptron").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LearnerRegistry {
    constructors: HashMap<&'static str, Constructor>,
}


impl LearnerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }


    /// A registry that knows every learner of this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(EnumLearner::NAME, enum_learner);
        registry.register(StumpLearner::NAME, stump_learner);
        registry
    }


    /// Register `constructor` under `name`.
    /// Returns the constructor previously registered under `name`.
    pub fn register(&mut self, name: &'static str, constructor: Constructor)
        -> Option<Constructor>
    {
        self.constructors.insert(name, constructor)
    }


    /// Build an empty learner registered as `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn WeakLearner>> {
        self.constructors.get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| BoostError::UnknownLearner { name: name.to_string() })
    }


    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }


    /// Returns the registered names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self.constructors.keys().copied().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}


fn enum_learner() -> Box<dyn WeakLearner> {
    Box::new(EnumLearner::new())
}


fn stump_learner() -> Box<dyn WeakLearner> {
    Box::new(StumpLearner::new())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let registry = LearnerRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["EnumLearner", "StumpLearner"]);
        assert_eq!(registry.create("StumpLearner").unwrap().name(), "StumpLearner");
    }

    #[test]
    fn test_unknown_name() {
        let err = LearnerRegistry::new().create("EnumLearner").unwrap_err();
        assert!(matches!(err, BoostError::UnknownLearner { ref name } if name == "EnumLearner"));
    }
}
