//! Random oversampling of the minority class.
use crate::data::dataset::{rng_from_seed, Dataset, RealNumber};
use crate::error::ImbalanceError;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument};

/// Balances a dataset by drawing minority samples with replacement until both classes
/// have as many samples as the majority class.
///
/// The majority samples are kept unchanged, `majority_count` minority samples are drawn
/// uniformly with replacement, and the concatenation is shuffled. The result has
/// `2 * majority_count` samples and carries each drawn sample's weight.
///
/// # Arguments
///
/// * `dataset` - The training set to rebalance.
/// * `seed` - Seed for the draws and the shuffle. `None` uses entropy.
///
/// # Errors
///
/// Returns [`ImbalanceError::NoMinoritySamples`] if the dataset has no positive samples.
#[instrument(skip(dataset), fields(n_samples = dataset.nrows()))]
pub fn oversample<T: RealNumber>(
    dataset: &Dataset<T>,
    seed: Option<u64>,
) -> Result<Dataset<T>, ImbalanceError> {
    let (majority, minority): (Vec<usize>, Vec<usize>) =
        (0..dataset.nrows()).partition(|&i| dataset.y()[i] == 0);

    if minority.is_empty() {
        return Err(ImbalanceError::NoMinoritySamples);
    }

    let mut rng = rng_from_seed(seed);
    let mut indices = majority.clone();
    indices.extend((0..majority.len()).map(|_| minority[rng.gen_range(0..minority.len())]));
    indices.shuffle(&mut rng);

    debug!(
        majority = majority.len(),
        minority = minority.len(),
        resampled = indices.len(),
        "oversampled minority class"
    );

    Ok(dataset.select(&indices))
}
