use crate::data::dataset::{Label, RealNumber};

/// Handle to a node inside a tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Decision tree node, stored in a `Vec<Node>` arena.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<T: RealNumber> {
    /// Samples with `features[feature_index] <= threshold` go left, the rest go right.
    Internal {
        feature_index: usize,
        threshold: T,
        left: NodeIndex,
        right: NodeIndex,
    },
    Leaf {
        /// Fraction of the positive weighted mass that reached this leaf.
        probability: f64,
        label: Label,
    },
}

impl<T: RealNumber> Node<T> {
    /// Creates a leaf, deriving the hard label from `probability >= 0.5`.
    pub fn leaf(probability: f64) -> Self {
        Node::Leaf {
            probability,
            label: u8::from(probability >= 0.5),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_label_threshold() {
        assert_eq!(
            Node::<f64>::leaf(0.5),
            Node::Leaf {
                probability: 0.5,
                label: 1
            }
        );
        assert_eq!(
            Node::<f64>::leaf(0.49),
            Node::Leaf {
                probability: 0.49,
                label: 0
            }
        );
    }

    #[test]
    fn test_is_leaf() {
        let internal: Node<f64> = Node::Internal {
            feature_index: 0,
            threshold: 1.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
        };
        assert!(!internal.is_leaf());
        assert!(Node::<f64>::leaf(0.0).is_leaf());
    }
}
