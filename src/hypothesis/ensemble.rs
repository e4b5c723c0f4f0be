use colored::Colorize;
use rayon::prelude::*;

use std::fmt;
use std::io::{BufRead, Write};

use crate::{
    Sample,
    constants::SCHEMA_VERSION,
    error::{BoostError, Result},
    registry::LearnerRegistry,
    serialization::{StreamTokenizer, TagWriter, schema},
    weak_learner::{DynTokenizer, WeakLearner},
};


const STAT_WIDTH: usize = 28;


/// A weighted vote of weak learners over `n_class` classes.
///
/// The confidence for class `l` is `sum_t alpha_t * h_t(x, l)` and the
/// prediction is the class with the largest confidence
/// (the smallest class index on ties).
#[derive(Debug, Default)]
pub struct Ensemble {
    n_class: usize,
    weights: Vec<f64>,
    hypotheses: Vec<Box<dyn WeakLearner>>,
}


impl Ensemble {
    /// An empty ensemble over `n_class` classes.
    pub fn new(n_class: usize) -> Self {
        Self { n_class, weights: Vec::new(), hypotheses: Vec::new() }
    }


    /// Append a pair `(weight, hypothesis)`.
    #[inline]
    pub fn push(&mut self, weight: f64, hypothesis: Box<dyn WeakLearner>) {
        self.weights.push(weight);
        self.hypotheses.push(hypothesis);
    }


    /// Returns the number of classes.
    pub fn n_class(&self) -> usize {
        self.n_class
    }


    /// Returns the number of weak hypotheses.
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }


    /// Returns `true` if the ensemble has no hypothesis.
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }


    /// Returns the weights on the hypotheses.
    pub fn weights(&self) -> &[f64] {
        &self.weights[..]
    }


    /// Returns the hypotheses.
    pub fn hypotheses(&self) -> &[Box<dyn WeakLearner>] {
        &self.hypotheses[..]
    }


    /// Decompose into weights and hypotheses.
    pub fn decompose(self) -> (Vec<f64>, Vec<Box<dyn WeakLearner>>) {
        (self.weights, self.hypotheses)
    }


    /// Per-class confidence for the `row`-th example of `sample`.
    pub fn confidence(&self, sample: &Sample, row: usize) -> Result<Vec<f64>> {
        let mut conf = vec![0f64; self.n_class];
        for (w, h) in self.weights.iter().zip(&self.hypotheses) {
            for (l, c) in conf.iter_mut().enumerate() {
                *c += w * h.confidence(sample, row, l)?;
            }
        }
        Ok(conf)
    }


    /// The predicted class of the `row`-th example of `sample`.
    pub fn predict(&self, sample: &Sample, row: usize) -> Result<usize> {
        let conf = self.confidence(sample, row)?;
        let mut best = 0;
        for (l, c) in conf.iter().enumerate().skip(1) {
            if *c > conf[best] {
                best = l;
            }
        }
        Ok(best)
    }


    /// The predicted classes of every example of `sample`.
    pub fn predict_all(&self, sample: &Sample) -> Result<Vec<usize>> {
        let n_sample = sample.shape().0;
        (0..n_sample).into_par_iter()
            .map(|row| self.predict(sample, row))
            .collect()
    }


    /// Fraction of the examples of `sample` whose prediction differs from
    /// the target.
    pub fn error_rate(&self, sample: &Sample) -> Result<f64> {
        let n_sample = sample.shape().0;
        if n_sample == 0 {
            return Ok(0f64);
        }
        let wrong = self.predict_all(sample)?
            .into_iter()
            .zip(sample.target())
            .filter(|(p, y)| p != *y)
            .count();
        Ok(wrong as f64 / n_sample as f64)
    }


    /// A deep copy built with [`WeakLearner::create`] and
    /// [`WeakLearner::copy_state_into`].
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::new(self.n_class);
        for (&w, h) in self.weights.iter().zip(&self.hypotheses) {
            let mut target = h.create();
            h.copy_state_into(target.as_mut())?;
            copy.push(w, target);
        }
        Ok(copy)
    }


    /// Write the ensemble in the tagged text format.
    pub fn save<W: Write>(&self, mut out: W) -> Result<()> {
        let out: &mut dyn Write = &mut out;
        let mut w = TagWriter::new(out);
        w.open(schema::ENSEMBLE)?;
        w.leaf(schema::VERSION, SCHEMA_VERSION)?;
        w.leaf(schema::CLASSES, self.n_class)?;
        for (alpha, h) in self.weights.iter().zip(&self.hypotheses) {
            w.open(schema::WEAK_HYPOTHESIS)?;
            w.leaf(schema::NAME, h.name())?;
            w.leaf(schema::ALPHA, alpha)?;
            h.save(&mut w)?;
            w.close(schema::WEAK_HYPOTHESIS)?;
        }
        w.close(schema::ENSEMBLE)?;
        w.flush()?;
        Ok(())
    }


    /// Same as [`Ensemble::save`], into a `String`.
    pub fn to_tagged_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.save(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| BoostError::malformed(schema::ENSEMBLE, e))
    }


    /// Read an ensemble written by [`Ensemble::save`].
    /// Learners are rebuilt by name through `registry`.
    pub fn load(st: &mut DynTokenizer<'_>, registry: &LearnerRegistry)
        -> Result<Self>
    {
        st.expect_open(schema::ENSEMBLE)?;
        let version = st.read_leaf::<u32>(schema::VERSION)?;
        if version != SCHEMA_VERSION {
            return Err(BoostError::malformed(schema::VERSION, format!(
                "unsupported version {version}, expected {SCHEMA_VERSION}"
            )));
        }
        let n_class = st.read_leaf::<usize>(schema::CLASSES)?;

        let mut ensemble = Self::new(n_class);
        while st.peek_is_open(schema::WEAK_HYPOTHESIS)? {
            st.expect_open(schema::WEAK_HYPOTHESIS)?;
            let name = st.read_leaf::<String>(schema::NAME)?;
            let alpha = st.read_leaf::<f64>(schema::ALPHA)?;
            let mut h = registry.create(&name)?;
            h.load(st, n_class)?;
            st.expect_close(schema::WEAK_HYPOTHESIS)?;
            ensemble.push(alpha, h);
        }
        st.expect_close(schema::ENSEMBLE)?;
        Ok(ensemble)
    }


    /// Same as [`Ensemble::load`], from any [`BufRead`].
    pub fn from_reader<R: BufRead>(mut input: R, registry: &LearnerRegistry)
        -> Result<Self>
    {
        let input: &mut dyn BufRead = &mut input;
        let mut st = StreamTokenizer::new(input);
        Self::load(&mut st, registry)
    }
}


impl fmt::Display for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "+ {:<STAT_WIDTH$}\t{:>8}",
            "# of classes".bold(),
            self.n_class.to_string().bold().green(),
        )?;
        writeln!(
            f,
            "+ {:<STAT_WIDTH$}\t{:>8}",
            "# of hypotheses".bold(),
            self.len().to_string().bold().green(),
        )?;
        for (t, (alpha, h)) in self.weights.iter().zip(&self.hypotheses).enumerate() {
            let feature = h.selected_feature()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".into());
            writeln!(
                f,
                "    [{:>4}] {:<16} feature {:>6}  alpha {}",
                t + 1,
                h.name().green(),
                feature,
                format!("{alpha:.5}").yellow(),
            )?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        weak_learner::{EnumLearner, StumpLearner},
        weak_learner::load_from_str,
    };

    fn toy() -> Sample {
        Sample::new(
            vec![vec![0.0], vec![1.0], vec![2.0]],
            vec![0, 1, 2],
        ).unwrap()
    }

    fn learner(text: &str) -> Box<dyn WeakLearner> {
        let mut h: Box<dyn WeakLearner> = Box::new(EnumLearner::new());
        load_from_str(h.as_mut(), text, 3).unwrap();
        h
    }

    fn ensemble() -> Ensemble {
        let mut f = Ensemble::new(3);
        f.push(0.5, learner(
            "<column>0</column><u>1 -1 -1</u>\
            <buckets><bucket>0 1</bucket><bucket>1 -1</bucket>\
            <bucket>2 -1</bucket></buckets>"
        ));
        f.push(0.25, learner(
            "<column>0</column><u>-1 1 -1</u>\
            <buckets><bucket>0 -1</bucket><bucket>1 1</bucket>\
            <bucket>2 -1</bucket></buckets>"
        ));
        f
    }

    #[test]
    fn test_confidence_and_predict() {
        let sample = toy();
        let f = ensemble();
        assert_eq!(f.confidence(&sample, 1).unwrap(), vec![-0.75, 0.75, 0.25]);
        assert_eq!(f.predict_all(&sample).unwrap(), vec![0, 1, 2]);
        assert_eq!(f.error_rate(&sample).unwrap(), 0.0);
    }

    #[test]
    fn test_predict_with_a_column_outside_the_sample() {
        let sample = Sample::new(
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            vec![0, 1],
        ).unwrap();
        let mut f = Ensemble::new(3);
        f.push(1.0, learner(
            "<column>9</column><u>1 -1 -1</u>\
            <buckets><bucket>0 1</bucket></buckets>"
        ));

        let err = f.predict_all(&sample).unwrap_err();
        assert!(matches!(err, BoostError::IndexOutOfRange { index: 9, len: 2 }));
        assert!(f.predict(&sample, 0).is_err());

        let err = ensemble().predict(&toy(), 3).unwrap_err();
        assert!(matches!(err, BoostError::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_ties_go_to_the_lowest_class() {
        let sample = toy();
        let f = Ensemble::new(3);
        assert_eq!(f.predict(&sample, 0).unwrap(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let f = ensemble();
        let text = f.to_tagged_string().unwrap();
        assert!(text.starts_with("<ensemble>\n\t<version>1</version>\n\t<classes>3</classes>\n"));
        assert!(text.contains("\t\t<name>EnumLearner</name>\n\t\t<alpha>0.5</alpha>\n"));

        let registry = LearnerRegistry::with_defaults();
        let g = Ensemble::from_reader(text.as_bytes(), &registry).unwrap();
        assert_eq!(g.weights(), f.weights());
        assert_eq!(g.to_tagged_string().unwrap(), text);
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let registry = LearnerRegistry::with_defaults();
        let text = "<ensemble><version>9</version><classes>3</classes></ensemble>";
        let err = Ensemble::from_reader(text.as_bytes(), &registry).unwrap_err();
        assert!(matches!(err, BoostError::MalformedState { ref tag, .. } if tag == "version"));
    }

    #[test]
    fn test_try_clone_and_mixed_learners() {
        let mut f = ensemble();
        let mut stump: Box<dyn WeakLearner> = Box::new(StumpLearner::new());
        load_from_str(
            stump.as_mut(),
            "<column>0</column><threshold>1.5</threshold><u>0 0 1</u>",
            3,
        ).unwrap();
        f.push(1.0, stump);

        let g = f.try_clone().unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.to_tagged_string().unwrap(), f.to_tagged_string().unwrap());
    }
}
