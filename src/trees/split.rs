//! Weighted Gini impurity and exhaustive best-split search.
use crate::data::dataset::{Dataset, RealNumber};
use std::cmp::Ordering;

/// Gains at or below this are treated as no improvement, absorbing rounding noise.
const MIN_GAIN: f64 = 1e-12;

/// A candidate must beat the current best by more than this to replace it. The same
/// partition summed in another row order can differ in the last bits.
const TIE_TOLERANCE: f64 = 1e-12;

/// Best split found for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitCandidate<T: RealNumber> {
    pub feature_index: usize,
    pub threshold: T,
    pub gain: f64,
}

/// Gini impurity `1 - p0^2 - p1^2` of `[negative, positive]` weighted class mass.
///
/// Zero mass is treated as pure.
pub fn gini(class_mass: [f64; 2]) -> f64 {
    let total = class_mass[0] + class_mass[1];
    if total <= 0.0 {
        return 0.0;
    }
    let p0 = class_mass[0] / total;
    let p1 = class_mass[1] / total;
    1.0 - p0 * p0 - p1 * p1
}

/// Sums sample weights per class over the given rows.
pub fn class_mass<T: RealNumber>(dataset: &Dataset<T>, indices: &[usize]) -> [f64; 2] {
    let (y, weights) = (dataset.y(), dataset.weights());
    indices.iter().fold([0.0, 0.0], |mut mass, &i| {
        mass[usize::from(y[i])] += weights[i];
        mass
    })
}

/// Information gain of splitting `parent` mass into `left` and the remainder.
fn information_gain(parent: [f64; 2], left: [f64; 2], parent_impurity: f64) -> f64 {
    let total = parent[0] + parent[1];
    let right = [
        (parent[0] - left[0]).max(0.0),
        (parent[1] - left[1]).max(0.0),
    ];
    let w_left = left[0] + left[1];
    let w_right = right[0] + right[1];
    parent_impurity - (w_left / total) * gini(left) - (w_right / total) * gini(right)
}

/// Midpoint of two consecutive distinct values that still separates them under `<=`.
fn midpoint<T: RealNumber>(low: T, high: T) -> T {
    let mid = (low + high) / (T::one() + T::one());
    if mid < high {
        mid
    } else {
        low
    }
}

/// Finds the split of `indices` with the largest weighted Gini gain.
///
/// Candidate thresholds are midpoints between consecutive distinct values of each feature
/// among the node's samples. Ties keep the lowest feature index, then the lowest threshold.
/// Returns `None` when no candidate has positive gain.
pub fn best_split<T: RealNumber>(
    dataset: &Dataset<T>,
    indices: &[usize],
) -> Option<SplitCandidate<T>> {
    if indices.len() < 2 {
        return None;
    }
    let (x, y) = dataset.into_parts();
    let weights = dataset.weights();

    let parent = class_mass(dataset, indices);
    if parent[0] + parent[1] <= 0.0 {
        return None;
    }
    let parent_impurity = gini(parent);

    let mut best: Option<SplitCandidate<T>> = None;
    let mut order = indices.to_vec();

    for feature_index in 0..x.ncols() {
        order.sort_by(|&a, &b| {
            x[(a, feature_index)]
                .partial_cmp(&x[(b, feature_index)])
                .unwrap_or(Ordering::Equal)
        });

        let mut left = [0.0, 0.0];
        for pair in order.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            left[usize::from(y[current])] += weights[current];

            let value = x[(current, feature_index)];
            let next_value = x[(next, feature_index)];
            if !(value < next_value) {
                continue;
            }

            let gain = information_gain(parent, left, parent_impurity);
            if gain > best.as_ref().map_or(MIN_GAIN, |b| b.gain + TIE_TOLERANCE) {
                best = Some(SplitCandidate {
                    feature_index,
                    threshold: midpoint(value, next_value),
                    gain,
                });
            }
        }
    }
    best
}
