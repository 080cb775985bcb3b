/// Confusion matrix and label-based scores
pub mod confusion;
/// ROC and precision-recall curves
pub mod curves;
/// Scores across decision thresholds
pub mod threshold;
