//! # Imbalance-tree
//!
//! `imbalance-tree` provides a CART decision tree for binary classification on heavily
//! imbalanced data, together with the tools needed to judge it: class weighting, random
//! oversampling, confusion-matrix scores, ROC / precision-recall curves and threshold sweeps.
//!
//! ## Getting Started
//!
//! To use `imbalance-tree`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! imbalance-tree = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how you can train a class-weighted tree and score it:
//!
//! ```rust
//! use imbalance_tree::data::dataset::Dataset;
//! use imbalance_tree::metrics::curves::roc_auc;
//! use imbalance_tree::trees::classifier::DecisionTreeClassifier;
//! use imbalance_tree::trees::params::ClassWeight;
//! use nalgebra::{DMatrix, DVector};
//!
//! let x = DMatrix::from_row_slice(6, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 9.0]);
//! let y = DVector::from_vec(vec![0, 0, 0, 0, 0, 1]);
//! let dataset = Dataset::new(x, y).unwrap();
//!
//! let model = DecisionTreeClassifier::with_params(None, Some(3), Some(ClassWeight::Balanced))
//!     .unwrap()
//!     .fit(&dataset)
//!     .unwrap();
//!
//! assert_eq!(model.predict(&[8.0]).unwrap(), 1);
//!
//! let scores = model.predict_proba_batch(dataset.x()).unwrap();
//! let auc = roc_auc(dataset.y().as_slice(), scores.as_slice()).unwrap();
//! assert_eq!(auc, 1.0);
//! ```

/// Dataset and data manipulation utilities
pub mod data;
/// Error type shared by the whole crate
pub mod error;
/// Model evaluation and the imbalance experiments
pub mod evaluation;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;

pub use error::ImbalanceError;
