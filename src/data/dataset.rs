use crate::error::ImbalanceError;
use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait RealNumber: DataValue + PartialOrd + Float {}
impl<T> RealNumber for T where T: DataValue + PartialOrd + Float {}

/// Binary class label: 0 is the majority (negative) class, 1 the minority (positive) class.
pub type Label = u8;

/// Builds a seeded generator, falling back to entropy when no seed is given.
pub(crate) fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Feature matrix, binary labels and per-sample weights.
///
/// Rows of `x` are samples. The weight vector always has one non-negative entry per
/// sample; datasets built without explicit weights carry a weight of 1.0 everywhere.
#[derive(Clone, PartialEq)]
pub struct Dataset<T: RealNumber> {
    x: DMatrix<T>,
    y: DVector<Label>,
    weights: DVector<f64>,
}

impl<T: RealNumber> Debug for Dataset<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{:?}, ", self.y[i])?;
        }
        write!(f, "],\n    weights: [")?;
        for i in 0..self.weights.len() {
            write!(f, "{:?}, ", self.weights[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl<T: RealNumber> Dataset<T> {
    /// Creates a dataset with unit weights.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` disagree on the number of samples or a label is not 0/1.
    pub fn new(x: DMatrix<T>, y: DVector<Label>) -> Result<Self, ImbalanceError> {
        let weights = DVector::from_element(y.len(), 1.0);
        Self::with_weights(x, y, weights)
    }

    /// Creates a dataset with explicit per-sample weights.
    ///
    /// # Errors
    ///
    /// Returns an error on length mismatches, labels other than 0/1, or negative weights.
    pub fn with_weights(
        x: DMatrix<T>,
        y: DVector<Label>,
        weights: DVector<f64>,
    ) -> Result<Self, ImbalanceError> {
        if x.nrows() != y.len() {
            return Err(ImbalanceError::LengthMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        if weights.len() != y.len() {
            return Err(ImbalanceError::LengthMismatch {
                expected: y.len(),
                got: weights.len(),
            });
        }
        if let Some((row, label)) = y.iter().enumerate().find(|&(_, &label)| label > 1) {
            return Err(ImbalanceError::InvalidLabel {
                row,
                value: label.to_string(),
            });
        }
        if let Some((index, &weight)) = weights
            .iter()
            .enumerate()
            .find(|&(_, &w)| !(w.is_finite() && w >= 0.0))
        {
            return Err(ImbalanceError::NegativeWeight { index, weight });
        }
        Ok(Self { x, y, weights })
    }

    /// Creates a unit-weight dataset from row-major feature vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if rows have inconsistent lengths or labels are invalid.
    pub fn from_rows(rows: &[Vec<T>], labels: &[Label]) -> Result<Self, ImbalanceError> {
        if rows.len() != labels.len() {
            return Err(ImbalanceError::LengthMismatch {
                expected: rows.len(),
                got: labels.len(),
            });
        }
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != ncols) {
            return Err(ImbalanceError::FeatureLengthMismatch {
                expected: ncols,
                got: row.len(),
            });
        }
        let x = DMatrix::from_row_slice(rows.len(), ncols, &rows.concat());
        Self::new(x, DVector::from_column_slice(labels))
    }

    pub fn into_parts(&self) -> (&DMatrix<T>, &DVector<Label>) {
        (&self.x, &self.y)
    }

    pub fn x(&self) -> &DMatrix<T> {
        &self.x
    }

    pub fn y(&self) -> &DVector<Label> {
        &self.y
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    pub fn is_not_empty(&self) -> bool {
        !(self.x.is_empty() || self.y.is_empty())
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Sample counts as `[negatives, positives]`.
    pub fn class_counts(&self) -> [usize; 2] {
        self.y.iter().fold([0, 0], |mut counts, &label| {
            counts[usize::from(label)] += 1;
            counts
        })
    }

    /// Returns a copy whose weights are multiplied by `factors[label]` for every sample.
    pub fn scale_weights(&self, factors: [f64; 2]) -> Self {
        let weights = DVector::from_iterator(
            self.nrows(),
            self.y
                .iter()
                .zip(self.weights.iter())
                .map(|(&label, &w)| w * factors[usize::from(label)]),
        );
        Self {
            x: self.x.clone(),
            y: self.y.clone(),
            weights,
        }
    }

    /// Builds a new dataset from the given row indices, in order. Indices may repeat.
    pub fn select(&self, indices: &[usize]) -> Self {
        let x = DMatrix::from_fn(indices.len(), self.ncols(), |i, j| self.x[(indices[i], j)]);
        let y = DVector::from_iterator(indices.len(), indices.iter().map(|&i| self.y[i]));
        let weights =
            DVector::from_iterator(indices.len(), indices.iter().map(|&i| self.weights[i]));
        Self { x, y, weights }
    }

    /// Standardizes the given columns to zero mean and unit (population) variance.
    ///
    /// Constant columns are only centred.
    pub fn standardize_columns(&mut self, columns: &[usize]) {
        let nrows = self.x.nrows();
        if nrows == 0 {
            return;
        }
        let ncols = self.x.ncols();
        let n = T::from_usize(nrows).unwrap_or_else(T::one);
        for &column in columns.iter().filter(|&&c| c < ncols) {
            let mut col = self.x.column_mut(column);
            let mean = col.iter().fold(T::zero(), |acc, &v| acc + v) / n;
            let variance = col
                .iter()
                .fold(T::zero(), |acc, &v| acc + (v - mean) * (v - mean))
                / n;
            let std_dev = variance.sqrt();
            for val in col.iter_mut() {
                *val -= mean;
                if std_dev > T::zero() {
                    *val /= std_dev;
                }
            }
        }
    }

    /// Splits into `(train, test)` keeping the class proportions of the whole set.
    ///
    /// Every class contributes `round(count * test_size)` samples to the test set, clamped so
    /// that a class with at least two samples appears on both sides.
    ///
    /// # Errors
    ///
    /// Returns an error if `test_size` is outside `(0, 1)` or the dataset is empty.
    pub fn stratified_train_test_split(
        &self,
        test_size: f64,
        seed: Option<u64>,
    ) -> Result<(Self, Self), ImbalanceError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ImbalanceError::InvalidTestSize { test_size });
        }
        if !self.is_not_empty() {
            return Err(ImbalanceError::EmptyDataset);
        }
        let mut rng = rng_from_seed(seed);

        let mut train_indices = Vec::with_capacity(self.nrows());
        let mut test_indices = Vec::new();
        for class in 0..=1 {
            let mut indices: Vec<usize> =
                (0..self.nrows()).filter(|&i| self.y[i] == class).collect();
            indices.shuffle(&mut rng);
            let count = indices.len();
            let n_test = if count < 2 {
                0
            } else {
                ((count as f64 * test_size).round() as usize).clamp(1, count - 1)
            };
            test_indices.extend_from_slice(&indices[..n_test]);
            train_indices.extend_from_slice(&indices[n_test..]);
        }
        train_indices.shuffle(&mut rng);
        test_indices.shuffle(&mut rng);

        Ok((self.select(&train_indices), self.select(&test_indices)))
    }
}
