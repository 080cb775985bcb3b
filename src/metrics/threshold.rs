//! Precision / recall / F1 at caller-chosen decision thresholds.
use crate::data::dataset::Label;
use crate::error::ImbalanceError;
use crate::metrics::confusion::ConfusionMatrix;

/// Scores obtained by predicting positive when `probability >= threshold`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdScore {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Re-derives hard labels from stored probabilities at each threshold, in the order given.
///
/// # Errors
///
/// Returns an error if `y_true` and `probabilities` differ in length or a label is not 0/1.
pub fn sweep(
    y_true: &[Label],
    probabilities: &[f64],
    thresholds: &[f64],
) -> Result<Vec<ThresholdScore>, ImbalanceError> {
    if y_true.len() != probabilities.len() {
        return Err(ImbalanceError::LengthMismatch {
            expected: y_true.len(),
            got: probabilities.len(),
        });
    }

    thresholds
        .iter()
        .map(|&threshold| {
            let y_pred: Vec<Label> = probabilities
                .iter()
                .map(|&p| u8::from(p >= threshold))
                .collect();
            let matrix = ConfusionMatrix::from_labels(y_true, &y_pred)?;
            Ok(ThresholdScore {
                threshold,
                precision: matrix.precision(),
                recall: matrix.recall(),
                f1: matrix.f1_score(),
            })
        })
        .collect()
}
