/// The decision tree classifier and its trained model
pub mod classifier;
/// Arena nodes
pub mod node;
/// Hyperparameters and class weighting
pub mod params;
/// Weighted Gini split search
pub mod split;
