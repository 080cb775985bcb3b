//! Deterministic synthetic imbalanced datasets.
use crate::data::dataset::{rng_from_seed, Dataset, Label};
use crate::error::ImbalanceError;
use nalgebra::{DMatrix, DVector};
use rand::seq::SliceRandom;
use rand::Rng;

/// Shape of a generated dataset.
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `n_samples`         | 20000   |
/// | `n_features`        | 20      |
/// | `n_informative`     | 3       |
/// | `positive_fraction` | 0.002   |
/// | `separation`        | 0.5     |
/// | `seed`              | 42      |
#[derive(Clone, Debug)]
pub struct SyntheticParams {
    pub n_samples: usize,
    pub n_features: usize,
    pub n_informative: usize,
    pub positive_fraction: f64,
    /// Offset added to the informative features of positive samples.
    pub separation: f64,
    pub seed: Option<u64>,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            n_samples: 20_000,
            n_features: 20,
            n_informative: 3,
            positive_fraction: 0.002,
            separation: 0.5,
            seed: Some(42),
        }
    }
}

/// Generates a binary dataset where positives make up `positive_fraction` of the rows.
///
/// Every feature is uniform noise in `[0, 1)`. The first `n_informative` features of a
/// positive sample are shifted by `separation`; below 1 the classes overlap. At least one
/// positive and one negative sample are always produced, and rows are shuffled.
///
/// # Errors
///
/// Returns an error if fewer than two samples are requested, `n_informative` exceeds
/// `n_features`, or `positive_fraction` is outside `(0, 1)`.
pub fn make_imbalanced(params: &SyntheticParams) -> Result<Dataset<f64>, ImbalanceError> {
    if params.n_samples < 2 {
        return Err(ImbalanceError::InvalidConfiguration {
            parameter: "n_samples",
            value: params.n_samples.to_string(),
            reason: "need at least 2 samples",
        });
    }
    if params.n_features == 0 || params.n_informative > params.n_features {
        return Err(ImbalanceError::InvalidConfiguration {
            parameter: "n_informative",
            value: params.n_informative.to_string(),
            reason: "must not exceed a positive n_features",
        });
    }
    if !(params.positive_fraction > 0.0 && params.positive_fraction < 1.0) {
        return Err(ImbalanceError::InvalidConfiguration {
            parameter: "positive_fraction",
            value: params.positive_fraction.to_string(),
            reason: "must be in (0, 1)",
        });
    }

    let mut rng = rng_from_seed(params.seed);
    let n_positive = ((params.n_samples as f64 * params.positive_fraction).round() as usize)
        .clamp(1, params.n_samples - 1);

    let mut labels: Vec<Label> = (0..params.n_samples)
        .map(|i| u8::from(i < n_positive))
        .collect();
    labels.shuffle(&mut rng);

    let mut x = DMatrix::zeros(params.n_samples, params.n_features);
    for (i, &label) in labels.iter().enumerate() {
        for j in 0..params.n_features {
            let shift = if label == 1 && j < params.n_informative {
                params.separation
            } else {
                0.0
            };
            x[(i, j)] = rng.gen::<f64>() + shift;
        }
    }

    Dataset::new(x, DVector::from_vec(labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SyntheticParams {
        SyntheticParams {
            n_samples: 1000,
            n_features: 5,
            n_informative: 2,
            positive_fraction: 0.01,
            separation: 1.0,
            seed: Some(42),
        }
    }

    #[test]
    fn test_make_imbalanced_shape_and_prevalence() {
        let dataset = make_imbalanced(&small()).unwrap();
        assert_eq!(dataset.nrows(), 1000);
        assert_eq!(dataset.ncols(), 5);
        assert_eq!(dataset.class_counts(), [990, 10]);
    }

    #[test]
    fn test_make_imbalanced_tiny_fraction_keeps_one_positive() {
        let params = SyntheticParams {
            n_samples: 100,
            positive_fraction: 0.0001,
            ..small()
        };
        let dataset = make_imbalanced(&params).unwrap();
        assert_eq!(dataset.class_counts(), [99, 1]);
    }

    #[test]
    fn test_make_imbalanced_informative_features_are_shifted() {
        let dataset = make_imbalanced(&small()).unwrap();
        for i in 0..dataset.nrows() {
            let informative = dataset.x()[(i, 0)];
            let noise = dataset.x()[(i, 4)];
            assert!((0.0..1.0).contains(&noise));
            if dataset.y()[i] == 1 {
                assert!(informative >= 1.0);
            } else {
                assert!(informative < 1.0);
            }
        }
    }

    #[test]
    fn test_default_classes_overlap_on_informative_features() {
        let params = SyntheticParams::default();
        let dataset = make_imbalanced(&params).unwrap();
        for j in 0..params.n_informative {
            let column = dataset.x().column(j);
            let (mut max_negative, mut min_positive) = (f64::MIN, f64::MAX);
            for (value, &label) in column.iter().zip(dataset.y().iter()) {
                if label == 1 {
                    min_positive = min_positive.min(*value);
                } else {
                    max_negative = max_negative.max(*value);
                }
            }
            assert!(max_negative > min_positive, "feature {j} is separable");
        }
    }

    #[test]
    fn test_make_imbalanced_is_reproducible() {
        let a = make_imbalanced(&small()).unwrap();
        let b = make_imbalanced(&small()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_make_imbalanced_rejects_bad_params() {
        let too_many_informative = SyntheticParams {
            n_informative: 6,
            ..small()
        };
        assert!(make_imbalanced(&too_many_informative).is_err());

        let bad_fraction = SyntheticParams {
            positive_fraction: 1.0,
            ..small()
        };
        assert!(matches!(
            make_imbalanced(&bad_fraction),
            Err(ImbalanceError::InvalidConfiguration {
                parameter: "positive_fraction",
                ..
            })
        ));
    }
}
