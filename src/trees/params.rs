use crate::error::ImbalanceError;

/// Per-class multiplier applied to sample weights before a tree is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassWeight {
    /// Factor 1 for both classes.
    #[default]
    Uniform,
    /// Inverse class frequency: `n_samples / (2 * count(class))`.
    Balanced,
}

impl ClassWeight {
    /// Resolves the `[negative, positive]` factors for the given class counts.
    ///
    /// An absent class gets factor 0 under `Balanced`; it has no samples to scale.
    pub fn factors(self, class_counts: [usize; 2]) -> [f64; 2] {
        match self {
            ClassWeight::Uniform => [1.0, 1.0],
            ClassWeight::Balanced => {
                let total = (class_counts[0] + class_counts[1]) as f64;
                class_counts.map(|count| {
                    if count == 0 {
                        0.0
                    } else {
                        total / (2.0 * count as f64)
                    }
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeParams {
    min_samples_split: u16,
    max_depth: Option<u16>,
    class_weight: ClassWeight,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            min_samples_split: 2,
            max_depth: None,
            class_weight: ClassWeight::Uniform,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<(), ImbalanceError> {
        check_min_samples_split(min_samples_split)?;
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    /// `None` lets the tree grow until every leaf is pure or unsplittable.
    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<(), ImbalanceError> {
        check_max_depth(max_depth)?;
        self.max_depth = max_depth;
        Ok(())
    }

    pub fn set_class_weight(&mut self, class_weight: ClassWeight) {
        self.class_weight = class_weight;
    }

    pub fn min_samples_split(&self) -> u16 {
        self.min_samples_split
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.max_depth
    }

    pub fn class_weight(&self) -> ClassWeight {
        self.class_weight
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ImbalanceError::InvalidConfiguration`] for a zero depth or zero split size.
    pub fn validate(&self) -> Result<(), ImbalanceError> {
        check_min_samples_split(self.min_samples_split)?;
        check_max_depth(self.max_depth)
    }
}

fn check_min_samples_split(min_samples_split: u16) -> Result<(), ImbalanceError> {
    if min_samples_split < 1 {
        return Err(ImbalanceError::InvalidConfiguration {
            parameter: "min_samples_split",
            value: min_samples_split.to_string(),
            reason: "must be at least 1",
        });
    }
    Ok(())
}

fn check_max_depth(max_depth: Option<u16>) -> Result<(), ImbalanceError> {
    if max_depth.is_some_and(|depth| depth < 1) {
        return Err(ImbalanceError::InvalidConfiguration {
            parameter: "max_depth",
            value: "0".to_string(),
            reason: "must be at least 1",
        });
    }
    Ok(())
}
