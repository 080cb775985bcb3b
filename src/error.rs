/// Errors from tree building, resampling and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ImbalanceError {
    /// Returned when a tree hyperparameter is out of range.
    #[error("invalid configuration: {parameter} = {value}, {reason}")]
    InvalidConfiguration {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value, formatted.
        value: String,
        /// What the parameter must satisfy.
        reason: &'static str,
    },

    /// Returned when a prediction query has a different number of features than the tree was trained on.
    #[error("prediction input has {got} features, expected {expected}")]
    FeatureLengthMismatch {
        /// Feature count seen at training time.
        expected: usize,
        /// Feature count of the query.
        got: usize,
    },

    /// Returned when oversampling is requested on a dataset without positive samples.
    #[error("dataset has no minority (positive) samples to oversample")]
    NoMinoritySamples,

    /// Returned when ROC or PR area is requested over single-class ground truth.
    #[error("AUC is undefined: ground truth only contains class {class}")]
    UndefinedAuc {
        /// The only class present in the ground truth.
        class: u8,
    },

    /// Returned when two parallel sequences have different lengths.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Reference length.
        expected: usize,
        /// Offending length.
        got: usize,
    },

    /// Returned when a sample weight is negative or not finite.
    #[error("sample {index} has invalid weight {weight}")]
    NegativeWeight {
        /// Zero-based sample index.
        index: usize,
        /// The rejected weight.
        weight: f64,
    },

    /// Returned when an operation needs at least one sample.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when a label other than 0 or 1 is encountered.
    #[error("row {row} has label {value}, expected 0 or 1")]
    InvalidLabel {
        /// Zero-based data row.
        row: usize,
        /// Raw label text.
        value: String,
    },

    /// Returned when the test fraction is outside (0, 1).
    #[error("test size must be in (0.0, 1.0), got {test_size}")]
    InvalidTestSize {
        /// The rejected fraction.
        test_size: f64,
    },

    /// Returned when a named column is absent from a CSV header.
    #[error("column '{name}' not found in header")]
    MissingColumn {
        /// Requested column name.
        name: String,
    },

    /// Returned when a CSV cell cannot be parsed as a number.
    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    Parse {
        /// Zero-based data row.
        row: usize,
        /// Column name.
        column: String,
        /// Raw cell text.
        value: String,
    },

    /// Returned when the CSV reader or writer fails.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Returned when writing an output file fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
