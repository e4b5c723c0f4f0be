//! Provides `Booster` trait.

use crate::{
    WeakLearner,
    error::Result,
};

use std::ops::ControlFlow;


/// The trait [`Booster`] defines the standard framework of Boosting:
/// a repeated game between **Booster** and **Weak Learner**.
///
/// In each round `t = 1, 2, ...`,
/// 1. Booster chooses a distribution over `(example, class)` pairs.
/// 2. Weak Learner chooses a hypothesis with a positive edge
///    with respect to the distribution.
///
/// # Required Methods
/// - [`Booster::name`]
/// - [`Booster::preprocess`]
/// - [`Booster::boost`]
/// - [`Booster::postprocess`]
/// - [`Booster::info`] ... optional.
///
/// # Provided Methods
/// - [`Booster::run`]
pub trait Booster {
    /// The final hypothesis output by a boosting algorithm.
    type Output;


    /// Returns the name of the boosting algorithm.
    fn name(&self) -> &str;


    /// Returns the information of boosting algorithm as `(key, value)`
    /// pairs.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// A main function that runs boosting algorithm.
    /// `weak_learner` is a prototype: every round fits a fresh copy made
    /// by [`WeakLearner::create`].
    fn run(&mut self, weak_learner: &dyn WeakLearner) -> Result<Self::Output> {
        self.preprocess()?;

        let mut iteration = 1;
        while self.boost(weak_learner, iteration)?.is_continue() {
            iteration += 1;
        }

        self.postprocess()
    }


    /// Pre-processing for `self`.
    /// As you can see in [`Booster::run`],
    /// this method is called before the boosting process.
    fn preprocess(&mut self) -> Result<()>;


    /// Boosting step per iteration.
    /// Returns `ControlFlow::Break(terminated_iter)` once boosting should
    /// stop, `ControlFlow::Continue(())` otherwise.
    fn boost(&mut self, weak_learner: &dyn WeakLearner, iteration: usize)
        -> Result<ControlFlow<usize>>;


    /// Post-processing.
    fn postprocess(&mut self) -> Result<Self::Output>;
}
