//! Evaluation of trained trees and the baseline / class-weighted / resampled comparison.
use nalgebra::DVector;
use tracing::{info, instrument, warn};

use crate::data::dataset::{Dataset, Label, RealNumber};
use crate::data::resample::oversample;
use crate::error::ImbalanceError;
use crate::metrics::confusion::ConfusionMatrix;
use crate::metrics::curves::{pr_curve, roc_curve, Curve};
use crate::metrics::threshold::{sweep, ThresholdScore};
use crate::trees::classifier::{DecisionTreeClassifier, TrainedTree};
use crate::trees::params::{ClassWeight, TreeParams};

/// Metrics of one model on one test set. Built once by [`evaluate`].
#[derive(Clone, Debug)]
pub struct EvaluationResult {
    pub name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `None` when the test labels hold a single class.
    pub roc_auc: Option<f64>,
    /// `None` when the test labels hold a single class.
    pub pr_auc: Option<f64>,
    pub confusion_matrix: ConfusionMatrix,
    /// Positive-class probability for every test sample.
    pub probabilities: DVector<f64>,
    /// Hard label for every test sample.
    pub predictions: DVector<Label>,
}

impl EvaluationResult {
    /// ROC curve of the stored probabilities against `y_true`.
    pub fn roc_curve(&self, y_true: &DVector<Label>) -> Result<Curve, ImbalanceError> {
        roc_curve(y_true.as_slice(), self.probabilities.as_slice())
    }

    /// Precision-recall curve of the stored probabilities against `y_true`.
    pub fn pr_curve(&self, y_true: &DVector<Label>) -> Result<Curve, ImbalanceError> {
        pr_curve(y_true.as_slice(), self.probabilities.as_slice())
    }

    /// Precision / recall / F1 of the stored probabilities at each threshold.
    pub fn sweep(
        &self,
        y_true: &DVector<Label>,
        thresholds: &[f64],
    ) -> Result<Vec<ThresholdScore>, ImbalanceError> {
        sweep(y_true.as_slice(), self.probabilities.as_slice(), thresholds)
    }
}

/// Maps an undefined area to `None`, passing every other error through.
fn optional_area(area: Result<Curve, ImbalanceError>) -> Result<Option<f64>, ImbalanceError> {
    match area {
        Ok(curve) => Ok(Some(curve.area)),
        Err(ImbalanceError::UndefinedAuc { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Predicts every test sample with `tree` and scores the result.
///
/// # Errors
///
/// Returns an error if the test set's feature count differs from the tree's.
#[instrument(skip(tree, test), fields(n_test = test.nrows()))]
pub fn evaluate_model<T: RealNumber>(
    name: &str,
    tree: &TrainedTree<T>,
    test: &Dataset<T>,
) -> Result<EvaluationResult, ImbalanceError> {
    let (x, y_true) = test.into_parts();
    let probabilities = tree.predict_proba_batch(x)?;
    let predictions = tree.predict_batch(x)?;
    evaluate(name, y_true, predictions, probabilities)
}

/// Scores precomputed hard labels and probabilities against `y_true`.
///
/// # Errors
///
/// Returns an error if the three vectors differ in length or hold a label other than 0/1.
/// A single-class `y_true` is not an error; the areas are recorded as `None`.
pub fn evaluate(
    name: &str,
    y_true: &DVector<Label>,
    predictions: DVector<Label>,
    probabilities: DVector<f64>,
) -> Result<EvaluationResult, ImbalanceError> {
    let confusion_matrix = ConfusionMatrix::from_labels(y_true.as_slice(), predictions.as_slice())?;
    let roc_auc = optional_area(roc_curve(y_true.as_slice(), probabilities.as_slice()))?;
    let pr_auc = optional_area(pr_curve(y_true.as_slice(), probabilities.as_slice()))?;
    if roc_auc.is_none() {
        warn!(model = name, "test labels hold a single class; AUC is undefined");
    }

    let result = EvaluationResult {
        name: name.to_string(),
        accuracy: confusion_matrix.accuracy(),
        precision: confusion_matrix.precision(),
        recall: confusion_matrix.recall(),
        f1: confusion_matrix.f1_score(),
        roc_auc,
        pr_auc,
        confusion_matrix,
        probabilities,
        predictions,
    };
    info!(
        model = name,
        accuracy = result.accuracy,
        precision = result.precision,
        recall = result.recall,
        f1 = result.f1,
        "model evaluated"
    );
    Ok(result)
}

/// Settings shared by the three experiment conditions.
///
/// | Parameter      | Default                     |
/// |----------------|-----------------------------|
/// | `tree_params`  | depth 6, split 10           |
/// | `random_seed`  | `Some(42)`                  |
/// | `thresholds`   | 0.1, 0.2, 0.3, 0.4, 0.5     |
#[derive(Clone, Debug)]
pub struct ExperimentConfig {
    /// The class weight set here is ignored; each condition picks its own.
    pub tree_params: TreeParams,
    pub random_seed: Option<u64>,
    pub thresholds: Vec<f64>,
}

impl ExperimentConfig {
    /// Creates a config with the given depth and split size.
    ///
    /// # Errors
    ///
    /// Returns [`ImbalanceError::InvalidConfiguration`] for a zero depth or split size.
    pub fn new(max_depth: Option<u16>, min_samples_split: u16) -> Result<Self, ImbalanceError> {
        let mut tree_params = TreeParams::new();
        tree_params.set_max_depth(max_depth)?;
        tree_params.set_min_samples_split(min_samples_split)?;
        Ok(Self {
            tree_params,
            random_seed: Some(42),
            thresholds: vec![0.1, 0.2, 0.3, 0.4, 0.5],
        })
    }

    fn classifier(&self, class_weight: ClassWeight) -> DecisionTreeClassifier {
        let mut params = self.tree_params.clone();
        params.set_class_weight(class_weight);
        DecisionTreeClassifier::from_params(params)
    }
}

/// Outcome of the three training conditions on one train/test split.
#[derive(Clone, Debug)]
pub struct ExperimentReport {
    pub baseline: EvaluationResult,
    pub class_weighted: EvaluationResult,
    /// `None` when the training set had no positive samples to oversample.
    pub resampled: Option<EvaluationResult>,
    /// Threshold sweep of the resampled model against the original test labels.
    pub threshold_sweep: Option<Vec<ThresholdScore>>,
}

impl ExperimentReport {
    /// Results in reporting order.
    pub fn results(&self) -> Vec<&EvaluationResult> {
        let mut results = vec![&self.baseline, &self.class_weighted];
        results.extend(self.resampled.as_ref());
        results
    }
}

fn train_and_evaluate<T: RealNumber>(
    name: &str,
    classifier: &DecisionTreeClassifier,
    train: &Dataset<T>,
    test: &Dataset<T>,
) -> Result<EvaluationResult, ImbalanceError> {
    let tree = classifier.fit(train)?;
    evaluate_model(name, &tree, test)
}

fn resampled_condition<T: RealNumber>(
    config: &ExperimentConfig,
    train: &Dataset<T>,
    test: &Dataset<T>,
) -> Result<Option<EvaluationResult>, ImbalanceError> {
    let balanced = match oversample(train, config.random_seed) {
        Ok(balanced) => balanced,
        Err(ImbalanceError::NoMinoritySamples) => {
            warn!("no minority samples in training set; skipping resampled model");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    let classifier = config.classifier(ClassWeight::Uniform);
    train_and_evaluate("Upsampled DT", &classifier, &balanced, test).map(Some)
}

/// Trains and evaluates the baseline, class-weighted and oversampled trees concurrently.
///
/// All three are scored against the same, untouched `test` set; the resampled model's
/// probabilities are also swept over `config.thresholds`.
///
/// # Errors
///
/// Returns the first error raised by any condition, except a missing minority class
/// for oversampling, which only skips that condition.
#[instrument(skip_all, fields(n_train = train.nrows(), n_test = test.nrows()))]
pub fn run_experiments<T: RealNumber>(
    train: &Dataset<T>,
    test: &Dataset<T>,
    config: &ExperimentConfig,
) -> Result<ExperimentReport, ImbalanceError> {
    let (baseline, (class_weighted, resampled)) = rayon::join(
        || train_and_evaluate("Baseline DT", &config.classifier(ClassWeight::Uniform), train, test),
        || {
            rayon::join(
                || {
                    train_and_evaluate(
                        "Class-weighted DT",
                        &config.classifier(ClassWeight::Balanced),
                        train,
                        test,
                    )
                },
                || resampled_condition(config, train, test),
            )
        },
    );
    let (baseline, class_weighted, resampled) = (baseline?, class_weighted?, resampled?);

    let threshold_sweep = resampled
        .as_ref()
        .map(|result| result.sweep(test.y(), &config.thresholds))
        .transpose()?;

    Ok(ExperimentReport {
        baseline,
        class_weighted,
        resampled,
        threshold_sweep,
    })
}
