//! Provides [`AdaBoostMH`] by Schapire & Singer, 1999.
use rayon::prelude::*;

use crate::{
    Booster,
    Sample,
    WeakLearner,
    cluster::SharedClusters,
    constants::{DEFAULT_ROUNDS, DEFAULT_TOLERANCE},
    dataset::{Distribution, WeightedSample},
    error::{BoostError, Result},
    hypothesis::Ensemble,
    logger::CurrentHypothesis,
};

use std::mem;
use std::ops::ControlFlow;


/// Defines `AdaBoost.MH`, multiclass AdaBoost on `(example, class)` pairs.
///
/// Each round fits a fresh copy of the weak learner on the current
/// distribution, measures its edge `g = sum w[i][l] y[i][l] h_l(x_i)`,
/// weighs it by `alpha = ln((1 + g) / (1 - g)) / 2`
/// and multiplies every weight by `exp(-alpha y h)`.
///
/// # Example
///
/// ```
/// use enumboost::prelude::*;
///
/// let sample = Sample::new(
///     vec![vec![0.0], vec![1.0], vec![2.0], vec![0.0]],
///     vec![0, 1, 2, 0],
/// ).unwrap();
///
/// let mut booster = AdaBoostMH::init(&sample)
///     .force_quit_at(10);
/// let weak_learner = EnumLearnerBuilder::new().build();
/// let f = booster.run(&weak_learner).unwrap();
///
/// assert_eq!(f.predict_all(&sample).unwrap(), vec![0, 1, 2, 0]);
/// ```
pub struct AdaBoostMH<'a> {
    // Training sample
    sample: &'a Sample,

    // Distribution on `(example, class)` pairs.
    dist: Distribution,

    // Cluster assignment read by every weak learner.
    clusters: SharedClusters,

    // Tolerance parameter
    tolerance: f64,

    // Weights on hypotheses in `hypotheses`
    weights: Vec<f64>,

    // Hypotheses obtained by the weak-learner.
    hypotheses: Vec<Box<dyn WeakLearner>>,

    // Round budget.
    max_iter: usize,

    // Terminated iteration.
    terminated: usize,
}


impl<'a> AdaBoostMH<'a> {
    /// Initialize the `AdaBoostMH`.
    /// By default, the parameters are
    /// ```text
    /// force_quit_at: DEFAULT_ROUNDS == 100,
    /// tolerance: DEFAULT_TOLERANCE == 1e-9,
    /// clusters: no assignment,
    /// ```
    pub fn init(sample: &'a Sample) -> Self {
        Self {
            sample,
            dist: Distribution::adaboost_mh(sample),
            clusters: SharedClusters::new(),
            tolerance: DEFAULT_TOLERANCE,

            weights: Vec::new(),
            hypotheses: Vec::new(),

            max_iter: DEFAULT_ROUNDS,
            terminated: usize::MAX,
        }
    }


    /// Force quits after `it` iterations.
    pub fn force_quit_at(mut self, it: usize) -> Self {
        self.max_iter = it;
        self
    }


    /// Set the tolerance parameter.
    /// Boosting stops once the edge of a new hypothesis is at most
    /// `tolerance` or at least `1 - tolerance`.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }


    /// Share `clusters` with every weak learner fitted by this booster.
    pub fn clusters(mut self, clusters: SharedClusters) -> Self {
        self.clusters = clusters;
        self
    }


    /// Returns the iteration at which boosting stopped,
    /// `usize::MAX` before [`Booster::run`].
    pub fn terminated(&self) -> usize {
        self.terminated
    }


    /// Returns the current distribution.
    pub fn distribution(&self) -> &Distribution {
        &self.dist
    }


    /// `y[i][l] * h_l(x_i)` for every `(example, class)` pair, row-major.
    fn margins_of_hypothesis(&self, h: &dyn WeakLearner) -> Result<Vec<f64>> {
        let n_class = self.sample.n_class();
        let rows = self.sample.target()
            .par_iter()
            .enumerate()
            .map(|(i, &y)| {
                (0..n_class)
                    .map(|l| {
                        let sign = if l == y { 1f64 } else { -1f64 };
                        h.confidence(self.sample, i, l).map(|c| sign * c)
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(rows.into_iter().flatten().collect())
    }


    /// Returns a weight on the new hypothesis.
    /// `update_params` also updates `self.dist`.
    #[inline]
    fn update_params(&mut self, margins: Vec<f64>, edge: f64) -> f64 {
        let weight = ((1f64 + edge) / (1f64 - edge)).ln() / 2f64;

        // To prevent overflow, take the logarithm.
        let dist = self.dist.as_mut_slice();
        dist.par_iter_mut()
            .zip(margins)
            .for_each(|(d, m)| *d = d.ln() - weight * m);

        let max = dist.iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let normalizer = max + dist.iter()
            .map(|d| (d - max).exp())
            .sum::<f64>()
            .ln();

        dist.par_iter_mut()
            .for_each(|d| *d = (*d - normalizer).exp());

        weight
    }
}


impl Booster for AdaBoostMH<'_> {
    type Output = Ensemble;


    fn name(&self) -> &str {
        "AdaBoost.MH"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let (n_sample, n_feature) = self.sample.shape();
        let info = Vec::from([
            ("# of examples", format!("{n_sample}")),
            ("# of features", format!("{n_feature}")),
            ("# of classes", format!("{}", self.sample.n_class())),
            ("Tolerance", format!("{}", self.tolerance)),
            ("Max iteration", format!("{}", self.max_iter)),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) -> Result<()> {
        self.sample.check_trainable()?;
        if !(0f64..0.5).contains(&self.tolerance) {
            return Err(BoostError::InvalidParameter {
                name: "tolerance",
                reason: format!("expected a value in [0, 0.5), got {}", self.tolerance),
            });
        }

        self.dist = Distribution::adaboost_mh(self.sample);
        self.weights = Vec::new();
        self.hypotheses = Vec::new();
        self.terminated = usize::MAX;
        Ok(())
    }


    fn boost(&mut self, weak_learner: &dyn WeakLearner, iteration: usize)
        -> Result<ControlFlow<usize>>
    {
        if self.max_iter < iteration {
            self.terminated = self.max_iter;
            return Ok(ControlFlow::Break(self.max_iter));
        }

        // Get a new hypothesis
        let data = WeightedSample::new(self.sample, &self.dist)?;
        let mut h = weak_learner.create();
        let energy = h.fit(&data, &self.clusters)?;

        let margins = self.margins_of_hypothesis(h.as_ref())?;
        let edge = self.dist.as_slice()
            .iter()
            .zip(&margins)
            .map(|(d, m)| d * m)
            .sum::<f64>();

        // `h` classifies every pair correctly.
        if edge >= 1f64 - self.tolerance {
            tracing::info!(
                round = iteration,
                feature = ?h.selected_feature(),
                edge,
                "the new hypothesis is perfect",
            );
            self.terminated = iteration;
            self.weights = vec![1f64];
            self.hypotheses = vec![h];
            return Ok(ControlFlow::Break(iteration));
        }

        // No progress.
        if edge <= self.tolerance {
            tracing::info!(
                round = iteration,
                edge,
                "the weak learner has no edge, stopping",
            );
            self.terminated = iteration - 1;
            return Ok(ControlFlow::Break(iteration - 1));
        }

        let alpha = self.update_params(margins, edge);
        tracing::info!(
            round = iteration,
            feature = ?h.selected_feature(),
            edge,
            energy,
            alpha,
            "boosting round",
        );
        self.weights.push(alpha);
        self.hypotheses.push(h);

        Ok(ControlFlow::Continue(()))
    }


    fn postprocess(&mut self) -> Result<Self::Output> {
        let mut f = Ensemble::new(self.sample.n_class());
        let weights = mem::take(&mut self.weights);
        let hypotheses = mem::take(&mut self.hypotheses);
        weights.into_iter()
            .zip(hypotheses)
            .for_each(|(w, h)| f.push(w, h));
        Ok(f)
    }
}


impl CurrentHypothesis for AdaBoostMH<'_> {
    type Output = Ensemble;


    fn current_hypothesis(&self) -> Result<Self::Output> {
        let mut f = Ensemble::new(self.sample.n_class());
        for (&w, h) in self.weights.iter().zip(&self.hypotheses) {
            let mut copy = h.create();
            h.copy_state_into(copy.as_mut())?;
            f.push(w, copy);
        }
        Ok(f)
    }
}
