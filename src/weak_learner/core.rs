use std::any::Any;
use std::fmt;
use std::io::{BufRead, Write};

use crate::{
    Sample,
    cluster::SharedClusters,
    dataset::WeightedDataset,
    error::{BoostError, Result},
    serialization::{StreamTokenizer, TagWriter},
};


/// The writer handed to [`WeakLearner::save`].
pub type DynTagWriter<'a> = TagWriter<&'a mut dyn Write>;
/// The tokenizer handed to [`WeakLearner::load`].
pub type DynTokenizer<'a> = StreamTokenizer<&'a mut dyn BufRead>;


/// A trait that defines the behavior of a single-feature weak learner.
///
/// A weak learner is created empty ([`WeakLearner::create`] or the
/// [`LearnerRegistry`](crate::LearnerRegistry)), then populated either by
/// [`WeakLearner::fit`] or by [`WeakLearner::load`].
/// After that it is only read.
///
/// The score of an example for class `l` is
/// [`WeakLearner::score`] applied to the value of the selected feature.
pub trait WeakLearner: fmt::Debug + Send + Sync {
    /// Returns the name under which this learner is registered
    /// and serialized.
    fn name(&self) -> &str;


    /// Returns the configuration of this learner as `(key, value)` pairs.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// Returns a fresh, empty learner of the same type
    /// that shares this learner's configuration.
    fn create(&self) -> Box<dyn WeakLearner>;


    /// Choose a feature and the per-class coefficients that
    /// minimize the weighted error on `data`.
    /// Returns the energy `sqrt(1 - edge^2)` of the chosen hypothesis.
    fn fit(&mut self, data: &dyn WeightedDataset, clusters: &SharedClusters)
        -> Result<f64>;


    /// The discriminative function for the value `val` of the selected
    /// feature and class `class`.
    fn phi(&self, val: f64, class: usize) -> Result<f64>;


    /// The score for class `class` of an example whose selected feature
    /// takes the value `val`.
    fn score(&self, val: f64, class: usize) -> Result<f64>;


    /// Returns the selected feature, `None` before `fit`/`load`.
    fn selected_feature(&self) -> Option<usize>;


    /// Write the state needed for classification.
    fn save(&self, out: &mut DynTagWriter<'_>) -> Result<()>;


    /// Read the state written by [`WeakLearner::save`].
    /// The stream is left right after this learner's tokens.
    fn load(&mut self, st: &mut DynTokenizer<'_>, n_class: usize) -> Result<()>;


    /// Copy the fields that [`WeakLearner::save`] persists into `target`,
    /// which must have the same concrete type.
    fn copy_state_into(&self, target: &mut dyn WeakLearner) -> Result<()>;


    /// Upcast for [`WeakLearner::copy_state_into`].
    fn as_any(&self) -> &dyn Any;


    /// Upcast for [`WeakLearner::copy_state_into`].
    fn as_any_mut(&mut self) -> &mut dyn Any;


    /// The score of the `row`-th example of `sample` for class `class`.
    /// A learner that has not selected a feature abstains (`0`).
    /// A selected feature or a row outside `sample` is an error.
    fn confidence(&self, sample: &Sample, row: usize, class: usize)
        -> Result<f64>
    {
        let Some(feature) = self.selected_feature() else {
            return Ok(0f64);
        };
        let (n_sample, n_feature) = sample.shape();
        if feature >= n_feature {
            return Err(BoostError::IndexOutOfRange {
                index: feature,
                len: n_feature,
            });
        }
        if row >= n_sample {
            return Err(BoostError::IndexOutOfRange {
                index: row,
                len: n_sample,
            });
        }
        self.score(sample.value(feature, row), class)
    }
}


/// Write `learner` to a `String`.
pub fn save_to_string(learner: &dyn WeakLearner) -> Result<String> {
    let mut buf = Vec::new();
    {
        let out: &mut dyn Write = &mut buf;
        let mut writer = TagWriter::new(out);
        learner.save(&mut writer)?;
    }
    String::from_utf8(buf)
        .map_err(|e| BoostError::malformed(learner.name(), e))
}


/// Populate `learner` from `text`, as written by [`save_to_string`].
pub fn load_from_str(
    learner: &mut dyn WeakLearner,
    text: &str,
    n_class: usize,
) -> Result<()>
{
    let mut bytes = text.as_bytes();
    let input: &mut dyn BufRead = &mut bytes;
    let mut st = StreamTokenizer::new(input);
    learner.load(&mut st, n_class)
}
