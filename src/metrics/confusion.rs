use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::data::dataset::Label;
use crate::error::ImbalanceError;

/// 2x2 confusion matrix; rows are true labels, columns predicted labels.
///
/// `[[tn, fp], [fn, tp]]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfusionMatrix(DMatrix<usize>);

impl ConfusionMatrix {
    /// Counts `(true, predicted)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the slices have different lengths or contain a label other than 0/1.
    pub fn from_labels(y_true: &[Label], y_pred: &[Label]) -> Result<Self, ImbalanceError> {
        if y_true.len() != y_pred.len() {
            return Err(ImbalanceError::LengthMismatch {
                expected: y_true.len(),
                got: y_pred.len(),
            });
        }

        let mut matrix = DMatrix::zeros(2, 2);
        for (row, (&y_t, &y_p)) in y_true.iter().zip(y_pred.iter()).enumerate() {
            if let Some(bad) = [y_t, y_p].into_iter().find(|&label| label > 1) {
                return Err(ImbalanceError::InvalidLabel {
                    row,
                    value: bad.to_string(),
                });
            }
            matrix[(usize::from(y_t), usize::from(y_p))] += 1;
        }
        Ok(Self(matrix))
    }

    pub fn matrix(&self) -> &DMatrix<usize> {
        &self.0
    }

    pub fn tn(&self) -> usize {
        self.0[(0, 0)]
    }

    pub fn fp(&self) -> usize {
        self.0[(0, 1)]
    }

    pub fn fn_(&self) -> usize {
        self.0[(1, 0)]
    }

    pub fn tp(&self) -> usize {
        self.0[(1, 1)]
    }

    pub fn total(&self) -> usize {
        self.0.sum()
    }

    /// Fraction of correct predictions; 0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp() + self.tn(), self.total())
    }

    /// `tp / (tp + fp)`; 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.tp(), self.tp() + self.fp())
    }

    /// `tp / (tp + fn)`; 0 when there are no positives.
    pub fn recall(&self) -> f64 {
        ratio(self.tp(), self.tp() + self.fn_())
    }

    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            return 0.0;
        }
        2.0 * (precision * recall) / (precision + recall)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[{} {}]", self.tn(), self.fp())?;
        write!(f, " [{} {}]]", self.fn_(), self.tp())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Binary classification scores over label vectors.
///
/// Zero denominators resolve to 0 rather than an error.
pub trait ClassificationMetrics {
    /// Computes the confusion matrix based on the true labels and predicted labels.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Returns
    ///
    /// The 2x2 confusion matrix, or an error if the lengths differ or a label is not 0/1.
    fn confusion_matrix(
        &self,
        y_true: &DVector<Label>,
        y_pred: &DVector<Label>,
    ) -> Result<ConfusionMatrix, ImbalanceError> {
        ConfusionMatrix::from_labels(y_true.as_slice(), y_pred.as_slice())
    }

    /// Computes the accuracy based on the true labels and predicted labels.
    fn accuracy(
        &self,
        y_true: &DVector<Label>,
        y_pred: &DVector<Label>,
    ) -> Result<f64, ImbalanceError> {
        Ok(self.confusion_matrix(y_true, y_pred)?.accuracy())
    }

    /// Computes the positive-class precision based on the true labels and predicted labels.
    fn precision(
        &self,
        y_true: &DVector<Label>,
        y_pred: &DVector<Label>,
    ) -> Result<f64, ImbalanceError> {
        Ok(self.confusion_matrix(y_true, y_pred)?.precision())
    }

    /// Computes the positive-class recall based on the true labels and predicted labels.
    fn recall(&self, y_true: &DVector<Label>, y_pred: &DVector<Label>) -> Result<f64, ImbalanceError> {
        Ok(self.confusion_matrix(y_true, y_pred)?.recall())
    }

    /// Computes the F1 score based on the true labels and predicted labels.
    fn f1_score(
        &self,
        y_true: &DVector<Label>,
        y_pred: &DVector<Label>,
    ) -> Result<f64, ImbalanceError> {
        Ok(self.confusion_matrix(y_true, y_pred)?.f1_score())
    }
}
