use approx::assert_relative_eq;
use imbalance_tree::data::dataset::{Dataset, Label};
use imbalance_tree::data::resample::oversample;
use imbalance_tree::data::synthetic::{make_imbalanced, SyntheticParams};
use imbalance_tree::evaluation::{evaluate_model, run_experiments, ExperimentConfig};
use imbalance_tree::metrics::confusion::ConfusionMatrix;
use imbalance_tree::metrics::curves::{pr_auc, roc_auc};
use imbalance_tree::metrics::threshold::sweep;
use imbalance_tree::trees::classifier::DecisionTreeClassifier;
use imbalance_tree::trees::node::Node;
use imbalance_tree::trees::params::ClassWeight;
use nalgebra::DMatrix;

fn one_positive_dataset() -> Dataset<f64> {
    let rows: Vec<Vec<f64>> = (0..10)
        .map(|i| {
            let x0 = if i == 9 { 8.0 } else { i as f64 * 0.5 };
            vec![x0, (i % 3) as f64]
        })
        .collect();
    let labels: Vec<Label> = (0..10).map(|i| u8::from(i == 9)).collect();
    Dataset::from_rows(&rows, &labels).unwrap()
}

fn small_synthetic(seed: u64) -> Dataset<f64> {
    make_imbalanced(&SyntheticParams {
        n_samples: 300,
        n_features: 5,
        n_informative: 2,
        positive_fraction: 0.1,
        separation: 0.5,
        seed: Some(seed),
    })
    .unwrap()
}

#[test]
fn separable_positive_is_learned_exactly() {
    let dataset = one_positive_dataset();
    let tree = DecisionTreeClassifier::with_params(Some(2), Some(2), Some(ClassWeight::Uniform))
        .unwrap()
        .fit(&dataset)
        .unwrap();

    let predictions = tree.predict_batch(dataset.x()).unwrap();
    let matrix = ConfusionMatrix::from_labels(dataset.y().as_slice(), predictions.as_slice()).unwrap();
    assert_relative_eq!(matrix.accuracy(), 1.0);
    assert_eq!(matrix.tp(), 1);
}

#[test]
fn unbounded_tree_overfits_distinct_samples() {
    let dataset = small_synthetic(7);
    let tree = DecisionTreeClassifier::with_params(Some(1), None, None)
        .unwrap()
        .fit(&dataset)
        .unwrap();

    for node in tree.nodes() {
        if let Node::Leaf { probability, .. } = node {
            assert!(*probability == 0.0 || *probability == 1.0);
        }
    }
    let predictions = tree.predict_batch(dataset.x()).unwrap();
    assert_eq!(&predictions, dataset.y());
}

#[test]
fn prediction_is_idempotent() {
    let dataset = small_synthetic(3);
    let tree = DecisionTreeClassifier::with_params(Some(10), Some(6), Some(ClassWeight::Balanced))
        .unwrap()
        .fit(&dataset)
        .unwrap();

    for row in dataset.x().row_iter().take(50) {
        let sample: Vec<f64> = row.iter().copied().collect();
        assert_eq!(tree.predict(&sample).unwrap(), tree.predict(&sample).unwrap());
        assert_eq!(
            tree.predict_proba(&sample).unwrap(),
            tree.predict_proba(&sample).unwrap()
        );
    }
}

#[test]
fn oversampling_is_balanced_and_reproducible() {
    let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, -(i as f64)]).collect();
    let labels: Vec<Label> = (0..10).map(|i| u8::from(i == 4)).collect();
    let dataset = Dataset::from_rows(&rows, &labels).unwrap();

    let first = oversample(&dataset, Some(0)).unwrap();
    let second = oversample(&dataset, Some(0)).unwrap();

    assert_eq!(first.nrows(), 18);
    assert_eq!(first.class_counts(), [9, 9]);
    assert_eq!(first, second);
}

#[test]
fn roc_auc_ignores_monotonic_rescaling() {
    let dataset = small_synthetic(11);
    let (train, test) = dataset.stratified_train_test_split(0.3, Some(1)).unwrap();
    let tree = DecisionTreeClassifier::with_params(Some(4), Some(4), None)
        .unwrap()
        .fit(&train)
        .unwrap();

    let scores = tree.predict_proba_batch(test.x()).unwrap();
    let squashed: Vec<f64> = scores.iter().map(|s| s.powi(3) * 0.5 + 0.1).collect();
    let y_true = test.y().as_slice();
    assert_relative_eq!(
        roc_auc(y_true, scores.as_slice()).unwrap(),
        roc_auc(y_true, &squashed).unwrap()
    );
}

#[test]
fn perfect_scores_give_unit_areas() {
    let y_true: Vec<Label> = vec![0, 1, 0, 0, 1, 0, 0, 0, 1, 0];
    let scores: Vec<f64> = y_true.iter().map(|&l| f64::from(l)).collect();
    assert_relative_eq!(roc_auc(&y_true, &scores).unwrap(), 1.0);
    assert_relative_eq!(pr_auc(&y_true, &scores).unwrap(), 1.0);
}

#[test]
fn sweep_at_half_matches_hard_labels() {
    let dataset = small_synthetic(5);
    let (train, test) = dataset.stratified_train_test_split(0.25, Some(9)).unwrap();
    let tree = DecisionTreeClassifier::with_params(Some(2), Some(5), Some(ClassWeight::Balanced))
        .unwrap()
        .fit(&train)
        .unwrap();
    let result = evaluate_model("weighted", &tree, &test).unwrap();

    let scores = sweep(test.y().as_slice(), result.probabilities.as_slice(), &[0.5]).unwrap();
    assert_eq!(scores[0].precision, result.precision);
    assert_eq!(scores[0].recall, result.recall);
    assert_eq!(scores[0].f1, result.f1);
}

#[test]
fn confusion_scores_for_one_false_positive() {
    let matrix = ConfusionMatrix::from_labels(&[0, 0, 1, 1], &[0, 1, 1, 1]).unwrap();
    assert_eq!(matrix.matrix(), &DMatrix::from_row_slice(2, 2, &[1, 1, 0, 2]));
    assert_relative_eq!(matrix.precision(), 2.0 / 3.0);
    assert_relative_eq!(matrix.recall(), 1.0);
    assert_relative_eq!(matrix.f1_score(), 0.8);
}

#[test]
fn experiments_run_on_synthetic_data() {
    let dataset = make_imbalanced(&SyntheticParams {
        n_samples: 2_000,
        positive_fraction: 0.02,
        ..SyntheticParams::default()
    })
    .unwrap();
    let (train, test) = dataset.stratified_train_test_split(0.2, Some(42)).unwrap();
    assert_eq!(test.class_counts(), [392, 8]);

    let config = ExperimentConfig::new(Some(6), 10).unwrap();
    let report = run_experiments(&train, &test, &config).unwrap();

    for result in report.results() {
        assert_eq!(result.confusion_matrix.total(), test.nrows());
        let roc = result.roc_auc.unwrap();
        assert!((0.0..=1.0).contains(&roc));
    }
    let table = report.threshold_sweep.unwrap();
    assert_eq!(table.len(), 5);
    // Lower thresholds can only admit more positives.
    for pair in table.windows(2) {
        assert!(pair[0].recall >= pair[1].recall);
    }
}
