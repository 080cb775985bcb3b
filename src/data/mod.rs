/// Labelled feature matrices with per-sample weights
pub mod dataset;
/// CSV ingestion
pub mod reader;
/// Random oversampling of the minority class
pub mod resample;
/// Synthetic imbalanced datasets
pub mod synthetic;
