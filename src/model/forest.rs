//! Random Forest inference over pre-trained decision trees

use crate::error::{Result, ScreenError};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::Classifier;

/// What a leaf predicts.
///
/// Fully grown trees store the class itself. Pruned trees store the class
/// proportions (or raw counts) of the training samples that reached the leaf,
/// in class order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    Class(f64),
    Proportions(Vec<f64>),
}

impl LeafValue {
    /// Probability of the upper class at this leaf
    fn upper_probability(&self, classes: &[f64]) -> f64 {
        match self {
            LeafValue::Class(value) => {
                if *value == classes[1] {
                    1.0
                } else {
                    0.0
                }
            }
            LeafValue::Proportions(p) => p[1] / (p[0] + p[1]),
        }
    }

    fn validate(&self, classes: &[f64]) -> Result<()> {
        match self {
            LeafValue::Class(value) if classes.contains(value) => Ok(()),
            LeafValue::Class(value) => Err(ScreenError::InvalidArtifact(format!(
                "leaf value {} is not one of the classes {:?}",
                value, classes
            ))),
            LeafValue::Proportions(p) => {
                if p.len() != classes.len() {
                    return Err(ScreenError::InvalidArtifact(format!(
                        "leaf has {} class proportions but the model has {} classes",
                        p.len(),
                        classes.len()
                    )));
                }
                if p.iter().any(|v| !v.is_finite() || *v < 0.0) || p.iter().sum::<f64>() <= 0.0 {
                    return Err(ScreenError::InvalidArtifact(format!(
                        "leaf proportions {:?} must be non-negative with a positive sum",
                        p
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Decision tree node.
///
/// Serialized untagged: a split is recognised by its `feature_idx`, anything
/// else carrying a `value` is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal node; samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf { value: LeafValue },
}

impl TreeNode {
    fn leaf_for(&self, sample: &ArrayView1<f64>) -> &LeafValue {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split { feature_idx, threshold, left, right } => {
                    node = if sample[*feature_idx] <= *threshold { left } else { right };
                }
            }
        }
    }

    fn validate(&self, n_features: usize, classes: &[f64]) -> Result<()> {
        match self {
            TreeNode::Leaf { value } => value.validate(classes),
            TreeNode::Split { feature_idx, threshold, left, right } => {
                if *feature_idx >= n_features {
                    return Err(ScreenError::InvalidArtifact(format!(
                        "split on feature {} but the model has {} features",
                        feature_idx, n_features
                    )));
                }
                if threshold.is_nan() {
                    return Err(ScreenError::InvalidArtifact("split threshold is NaN".to_string()));
                }
                left.validate(n_features, classes)?;
                right.validate(n_features, classes)
            }
        }
    }

    /// Depth of the subtree rooted here (a lone leaf has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Random Forest classifier loaded from an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Number of features the trees were trained on
    pub n_features: usize,
    /// Class values, lower first
    pub classes: Vec<f64>,
    trees: Vec<TreeNode>,
}

impl RandomForest {
    pub fn new(n_features: usize, classes: Vec<f64>, trees: Vec<TreeNode>) -> Result<Self> {
        let forest = Self { n_features, classes, trees };
        forest.validate()?;
        Ok(forest)
    }

    /// Check structure after deserialization
    pub fn validate(&self) -> Result<()> {
        super::validate_classes(&self.classes)?;
        if self.n_features == 0 {
            return Err(ScreenError::InvalidArtifact("n_features must be at least 1".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ScreenError::InvalidArtifact("forest has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, &self.classes)?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Deepest tree in the forest
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.trees.iter().map(TreeNode::n_leaves).sum()
    }

    /// Upper-class probability per sample, averaged over the trees' leaves
    pub fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        let classes = &self.classes;
        let sum = self
            .trees
            .par_iter()
            .map(|root| {
                x.rows()
                    .into_iter()
                    .map(|row| root.leaf_for(&row).upper_probability(classes))
                    .collect::<Array1<f64>>()
            })
            .reduce(|| Array1::zeros(x.nrows()), |a, b| a + b);

        sum / self.trees.len() as f64
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    /// Argmax of the averaged probabilities; a tie goes to the lower class
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (lower, upper) = (self.classes[0], self.classes[1]);
        Ok(self
            .predict_proba(x)
            .mapv(|p| if p > 0.5 { upper } else { lower }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn leaf(value: f64) -> Box<TreeNode> {
        Box::new(TreeNode::Leaf { value: LeafValue::Class(value) })
    }

    fn proportions(p0: f64, p1: f64) -> Box<TreeNode> {
        Box::new(TreeNode::Leaf { value: LeafValue::Proportions(vec![p0, p1]) })
    }

    fn stump(feature_idx: usize, threshold: f64) -> TreeNode {
        TreeNode::Split { feature_idx, threshold, left: leaf(0.0), right: leaf(1.0) }
    }

    #[test]
    fn test_vote_of_class_leaves() {
        let forest = RandomForest::new(
            2,
            vec![0.0, 1.0],
            vec![stump(0, 0.0), stump(0, 1.0), stump(1, 0.0)],
        )
        .unwrap();

        let x = array![[0.5, 0.5], [-1.0, -1.0], [2.0, 2.0]];
        let proba = forest.predict_proba(&x);
        assert!((proba[0] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(forest.predict(&x).unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_soft_vote_overrules_tree_majority() {
        // Two trees lean weakly to class 1, one is confident about class 0.
        // Counting votes says 1; averaging probabilities says 0.
        let trees = vec![
            TreeNode::Split { feature_idx: 0, threshold: 0.0, left: proportions(0.4, 0.6), right: leaf(0.0) },
            TreeNode::Split { feature_idx: 0, threshold: 0.0, left: proportions(0.4, 0.6), right: leaf(0.0) },
            TreeNode::Split { feature_idx: 0, threshold: 0.0, left: proportions(1.0, 0.0), right: leaf(0.0) },
        ];
        let forest = RandomForest::new(1, vec![0.0, 1.0], trees).unwrap();

        let x = array![[-1.0]];
        assert!((forest.predict_proba(&x)[0] - 0.4).abs() < 1e-12);
        assert_eq!(forest.predict(&x).unwrap()[0], 0.0);
    }

    #[test]
    fn test_leaf_counts_are_normalized() {
        let tree = TreeNode::Split { feature_idx: 0, threshold: 0.0, left: proportions(3.0, 9.0), right: leaf(0.0) };
        let forest = RandomForest::new(1, vec![0.0, 1.0], vec![tree]).unwrap();
        assert!((forest.predict_proba(&array![[-1.0]])[0] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_lower_class() {
        let forest = RandomForest::new(1, vec![0.0, 1.0], vec![stump(0, 0.0), stump(0, 1.0)]).unwrap();
        assert_eq!(forest.predict(&array![[0.5]]).unwrap()[0], 0.0);

        let even = TreeNode::Split { feature_idx: 0, threshold: 0.0, left: proportions(0.5, 0.5), right: leaf(1.0) };
        let forest = RandomForest::new(1, vec![0.0, 1.0], vec![even]).unwrap();
        assert_eq!(forest.predict(&array![[-1.0]]).unwrap()[0], 0.0);
    }

    #[test]
    fn test_tree_stats() {
        let deep = TreeNode::Split {
            feature_idx: 0,
            threshold: 0.0,
            left: Box::new(stump(1, 0.0)),
            right: leaf(1.0),
        };
        let forest = RandomForest::new(2, vec![0.0, 1.0], vec![deep, stump(0, 1.0)]).unwrap();
        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.max_depth(), 3);
        assert_eq!(forest.n_leaves(), 5);
    }

    #[test]
    fn test_split_index_out_of_range() {
        let err = RandomForest::new(1, vec![0.0, 1.0], vec![stump(3, 0.0)]).unwrap_err();
        assert!(matches!(err, ScreenError::InvalidArtifact(_)));
    }

    #[test]
    fn test_invalid_leaves() {
        let outside = TreeNode::Leaf { value: LeafValue::Class(2.0) };
        assert!(RandomForest::new(1, vec![0.0, 1.0], vec![outside]).is_err());

        let short = TreeNode::Leaf { value: LeafValue::Proportions(vec![1.0]) };
        assert!(RandomForest::new(1, vec![0.0, 1.0], vec![short]).is_err());

        let empty = TreeNode::Leaf { value: LeafValue::Proportions(vec![0.0, 0.0]) };
        assert!(RandomForest::new(1, vec![0.0, 1.0], vec![empty]).is_err());
    }

    #[test]
    fn test_untagged_node_json() {
        let json = r#"{"feature_idx":0,"threshold":1.5,"left":{"value":0},"right":{"value":[0.2,0.8]}}"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert_eq!(
            node,
            TreeNode::Split { feature_idx: 0, threshold: 1.5, left: leaf(0.0), right: proportions(0.2, 0.8) }
        );
    }
}
