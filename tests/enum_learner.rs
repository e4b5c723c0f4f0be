use enumboost::prelude::*;
use enumboost::weak_learner::{load_from_str, save_to_string};

use rand::{Rng, SeedableRng, rngs::StdRng};


fn random_sample(rng: &mut StdRng, m: usize, n_feature: usize, n_class: usize)
    -> (Sample, Distribution)
{
    let rows = (0..m)
        .map(|_| (0..n_feature).map(|_| rng.gen_range(0..5) as f64).collect())
        .collect::<Vec<Vec<f64>>>();
    let labels = (0..m).map(|i| i % n_class).collect::<Vec<_>>();
    let sample = Sample::new(rows, labels).unwrap();

    let weights = (0..m)
        .map(|_| (0..n_class).map(|_| rng.gen_range(0.01..1.0)).collect())
        .collect::<Vec<Vec<f64>>>();
    let mut dist = Distribution::from_rows(weights).unwrap();
    dist.normalize();
    (sample, dist)
}


/// `sum_i sum_l s[i][l] * score(x_i, l)`.
fn edge_of(learner: &dyn WeakLearner, data: &WeightedSample<'_>) -> f64 {
    let sample = data.sample();
    let mut edge = 0.0;
    for i in 0..data.n_example() {
        for (l, s) in data.signed_weights(i).iter().enumerate() {
            edge += s * learner.confidence(sample, i, l).unwrap();
        }
    }
    edge
}


/// Tests for `EnumLearner`.
#[cfg(test)]
pub mod enum_learner_tests {
    use super::*;

    #[test]
    fn no_worse_than_any_constant() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..20 {
            let (sample, dist) = random_sample(&mut rng, 40, 6, 4);
            let data = WeightedSample::new(&sample, &dist).unwrap();

            let mut learner = EnumLearner::new();
            learner.fit(&data, &SharedClusters::new()).unwrap();

            // The best constant classifier takes u[l] = sign(sum_i s[i][l]).
            let mut totals = vec![0.0; 4];
            for i in 0..data.n_example() {
                for (t, s) in totals.iter_mut().zip(data.signed_weights(i)) {
                    *t += s;
                }
            }
            let constant = totals.iter().map(|t: &f64| t.abs()).sum::<f64>();
            let fitted = edge_of(&learner, &data);
            assert!(fitted >= constant - 1e-9, "{fitted} < {constant}");
        }
    }

    #[test]
    fn repeated_fits_agree() {
        let mut rng = StdRng::seed_from_u64(99);
        let (sample, dist) = random_sample(&mut rng, 50, 5, 3);
        let data = WeightedSample::new(&sample, &dist).unwrap();

        let mut a = EnumLearner::new();
        let mut b = EnumLearner::new();
        let ea = a.fit(&data, &SharedClusters::new()).unwrap();
        let eb = b.fit(&data, &SharedClusters::new()).unwrap();
        assert_eq!(ea.to_bits(), eb.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn energy_matches_the_edge() {
        let mut rng = StdRng::seed_from_u64(5);
        let (sample, dist) = random_sample(&mut rng, 30, 4, 3);
        let data = WeightedSample::new(&sample, &dist).unwrap();

        let mut learner = EnumLearner::new();
        let energy = learner.fit(&data, &SharedClusters::new()).unwrap();
        let gamma = edge_of(&learner, &data) / data.total_weight();
        assert!((energy - (1.0 - gamma * gamma).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn save_then_load_keeps_scores() {
        let mut rng = StdRng::seed_from_u64(42);
        let (sample, dist) = random_sample(&mut rng, 30, 4, 3);
        let data = WeightedSample::new(&sample, &dist).unwrap();

        let mut learner = EnumLearner::new();
        learner.fit(&data, &SharedClusters::new()).unwrap();
        let text = save_to_string(&learner).unwrap();

        let registry = LearnerRegistry::with_defaults();
        let mut loaded = registry.create("EnumLearner").unwrap();
        load_from_str(loaded.as_mut(), &text, 3).unwrap();

        assert_eq!(loaded.selected_feature(), learner.selected_feature());
        for val in [-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 0.5] {
            for class in 0..3 {
                assert_eq!(
                    loaded.phi(val, class).unwrap(),
                    learner.phi(val, class).unwrap(),
                );
                assert_eq!(
                    loaded.score(val, class).unwrap(),
                    learner.score(val, class).unwrap(),
                );
            }
        }
    }

    #[test]
    fn copy_into_another_type_fails() {
        let learner = EnumLearner::new();
        let mut stump = StumpLearner::new();
        let err = learner.copy_state_into(&mut stump).unwrap_err();
        match err {
            BoostError::TypeMismatch { expected, found } => {
                assert_eq!(expected, "EnumLearner");
                assert_eq!(found, "StumpLearner");
            },
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn empty_training_sets_are_rejected() {
        let sample = Sample::new(Vec::new(), Vec::new()).unwrap();
        let dist = Distribution::from_rows(Vec::new()).unwrap();
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let err = EnumLearner::new()
            .fit(&data, &SharedClusters::new())
            .unwrap_err();
        assert!(matches!(err, BoostError::InvalidTrainingSet { .. }));

        let sample = Sample::new(vec![vec![], vec![]], vec![0, 1]).unwrap();
        let dist = Distribution::uniform(2, 2);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let err = EnumLearner::new()
            .fit(&data, &SharedClusters::new())
            .unwrap_err();
        assert!(matches!(err, BoostError::InvalidTrainingSet { .. }));
    }

    #[test]
    fn nan_values_are_rejected() {
        let sample = Sample::new(
            vec![vec![1.0, f64::NAN], vec![2.0, 0.0]],
            vec![0, 1],
        ).unwrap();
        let dist = Distribution::uniform(2, 2);
        let data = WeightedSample::new(&sample, &dist).unwrap();
        let err = EnumLearner::new()
            .fit(&data, &SharedClusters::new())
            .unwrap_err();
        assert!(matches!(err, BoostError::InvalidTrainingSet { .. }));
    }
}
