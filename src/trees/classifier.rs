//! Decision Tree Classifier
use super::{
    node::{Node, NodeIndex},
    params::{ClassWeight, TreeParams},
    split::{best_split, class_mass, gini},
};
use crate::{
    data::dataset::{Dataset, Label, RealNumber},
    error::ImbalanceError,
    metrics::confusion::ClassificationMetrics,
};
use nalgebra::{DMatrix, DVector};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument};

/// CART decision tree builder for binary, possibly weighted, data.
#[derive(Clone, Debug, Default)]
pub struct DecisionTreeClassifier {
    tree_params: TreeParams,
}

impl DecisionTreeClassifier {
    /// Creates a new builder with default parameters.
    pub fn new() -> Self {
        Self {
            tree_params: TreeParams::new(),
        }
    }

    /// Creates a new builder with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `min_samples_split` - The minimum number of samples required to split an internal node.
    /// * `max_depth` - The maximum depth of the tree. `None` is unbounded.
    /// * `class_weight` - Per-class weighting applied before building.
    ///
    /// # Errors
    ///
    /// Returns [`ImbalanceError::InvalidConfiguration`] if `min_samples_split` or `max_depth` is zero.
    pub fn with_params(
        min_samples_split: Option<u16>,
        max_depth: Option<u16>,
        class_weight: Option<ClassWeight>,
    ) -> Result<Self, ImbalanceError> {
        let mut tree = Self::new();
        tree.set_min_samples_split(min_samples_split.unwrap_or(2))?;
        tree.set_max_depth(max_depth)?;
        tree.set_class_weight(class_weight.unwrap_or_default());
        Ok(tree)
    }

    /// Creates a builder from an existing parameter set.
    pub fn from_params(tree_params: TreeParams) -> Self {
        Self { tree_params }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<(), ImbalanceError> {
        self.tree_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<(), ImbalanceError> {
        self.tree_params.set_max_depth(max_depth)
    }

    pub fn set_class_weight(&mut self, class_weight: ClassWeight) {
        self.tree_params.set_class_weight(class_weight)
    }

    pub fn params(&self) -> &TreeParams {
        &self.tree_params
    }

    /// Builds a tree from a dataset.
    ///
    /// Sample weights are first multiplied by the class factors of the configured
    /// [`ClassWeight`]; every partition keeps the weights assigned at the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or the dataset is empty.
    #[instrument(skip_all, fields(n_samples = dataset.nrows(), n_features = dataset.ncols()))]
    pub fn fit<T: RealNumber>(&self, dataset: &Dataset<T>) -> Result<TrainedTree<T>, ImbalanceError> {
        self.tree_params.validate()?;
        if !dataset.is_not_empty() {
            return Err(ImbalanceError::EmptyDataset);
        }

        let factors = self
            .tree_params
            .class_weight()
            .factors(dataset.class_counts());
        let weighted = dataset.scale_weights(factors);

        let indices: Vec<usize> = (0..weighted.nrows()).collect();
        let mut arena = Vec::new();
        let root = build_tree(&weighted, &indices, 0, &self.tree_params, &mut arena);

        debug!(
            n_nodes = arena.len(),
            negative_factor = factors[0],
            positive_factor = factors[1],
            "decision tree built"
        );

        Ok(TrainedTree {
            nodes: arena,
            root,
            n_features: dataset.ncols(),
            tree_params: self.tree_params.clone(),
            class_factors: factors,
        })
    }
}

/// Positive fraction of the weighted mass, falling back to raw counts when all weights are zero.
fn leaf_probability<T: RealNumber>(dataset: &Dataset<T>, indices: &[usize], mass: [f64; 2]) -> f64 {
    let total = mass[0] + mass[1];
    if total > 0.0 {
        return mass[1] / total;
    }
    let positives = indices.iter().filter(|&&i| dataset.y()[i] == 1).count();
    positives as f64 / indices.len() as f64
}

fn build_tree<T: RealNumber>(
    dataset: &Dataset<T>,
    indices: &[usize],
    depth: u16,
    params: &TreeParams,
    arena: &mut Vec<Node<T>>,
) -> NodeIndex {
    let mass = class_mass(dataset, indices);
    let make_leaf = |arena: &mut Vec<Node<T>>| {
        arena.push(Node::leaf(leaf_probability(dataset, indices, mass)));
        NodeIndex::new(arena.len() - 1)
    };

    let depth_reached = params.max_depth().is_some_and(|max_depth| depth >= max_depth);
    let too_few = indices.len() < usize::from(params.min_samples_split());
    if depth_reached || too_few || gini(mass) == 0.0 {
        return make_leaf(arena);
    }

    let Some(split) = best_split(dataset, indices) else {
        return make_leaf(arena);
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| dataset.x()[(i, split.feature_index)] <= split.threshold);

    // Reserve the slot so the parent precedes its children in the arena.
    let node_index = arena.len();
    arena.push(Node::leaf(0.0));

    let left = build_tree(dataset, &left, depth + 1, params, arena);
    let right = build_tree(dataset, &right, depth + 1, params, arena);
    arena[node_index] = Node::Internal {
        feature_index: split.feature_index,
        threshold: split.threshold,
        left,
        right,
    };
    NodeIndex::new(node_index)
}

/// A built decision tree. Immutable; used for any number of predictions.
#[derive(Clone, Debug)]
pub struct TrainedTree<T: RealNumber> {
    nodes: Vec<Node<T>>,
    root: NodeIndex,
    n_features: usize,
    tree_params: TreeParams,
    class_factors: [f64; 2],
}

impl<T: RealNumber> ClassificationMetrics for TrainedTree<T> {}

impl<T: RealNumber> TrainedTree<T> {
    /// Returns the positive-class probability stored in the leaf `features` falls into.
    ///
    /// # Errors
    ///
    /// Returns [`ImbalanceError::FeatureLengthMismatch`] if `features` does not have the
    /// training feature count.
    pub fn predict_proba(&self, features: &[T]) -> Result<f64, ImbalanceError> {
        self.leaf_for(features).map(|(probability, _)| probability)
    }

    /// Returns the hard label of the leaf `features` falls into.
    ///
    /// # Errors
    ///
    /// Returns [`ImbalanceError::FeatureLengthMismatch`] on a feature count mismatch.
    pub fn predict(&self, features: &[T]) -> Result<Label, ImbalanceError> {
        self.leaf_for(features).map(|(_, label)| label)
    }

    /// Predicts probabilities for every row of `features`, in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ImbalanceError::FeatureLengthMismatch`] if the column count differs from training.
    pub fn predict_proba_batch(&self, features: &DMatrix<T>) -> Result<DVector<f64>, ImbalanceError> {
        self.check_columns(features)?;
        let probabilities = (0..features.nrows())
            .into_par_iter()
            .map(|row| {
                let sample: Vec<T> = features.row(row).iter().copied().collect();
                self.predict_proba(&sample)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DVector::from_vec(probabilities))
    }

    /// Predicts hard labels for every row of `features`, in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ImbalanceError::FeatureLengthMismatch`] if the column count differs from training.
    pub fn predict_batch(&self, features: &DMatrix<T>) -> Result<DVector<Label>, ImbalanceError> {
        self.check_columns(features)?;
        let labels = (0..features.nrows())
            .into_par_iter()
            .map(|row| {
                let sample: Vec<T> = features.row(row).iter().copied().collect();
                self.predict(&sample)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DVector::from_vec(labels))
    }

    fn check_columns(&self, features: &DMatrix<T>) -> Result<(), ImbalanceError> {
        if features.ncols() != self.n_features {
            return Err(ImbalanceError::FeatureLengthMismatch {
                expected: self.n_features,
                got: features.ncols(),
            });
        }
        Ok(())
    }

    fn leaf_for(&self, features: &[T]) -> Result<(f64, Label), ImbalanceError> {
        if features.len() != self.n_features {
            return Err(ImbalanceError::FeatureLengthMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }
        let mut current = self.root;
        loop {
            match &self.nodes[current.index()] {
                Node::Leaf { probability, label } => return Ok((*probability, *label)),
                Node::Internal {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    current = if features[*feature_index] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node<T>> {
        self.nodes.get(index.index())
    }

    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn params(&self) -> &TreeParams {
        &self.tree_params
    }

    /// `[negative, positive]` weight multipliers applied to the training set before building.
    pub fn class_factors(&self) -> [f64; 2] {
        self.class_factors
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Internal { left, right, .. } = &self.nodes[index.index()] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }
}
