//! Oblique tree node types and the tree wrapper.

use serde::{Deserialize, Serialize};

use crate::vectorize::{FeatureVector, Normalization};

/// A node of the oblique tree.
///
/// Internal nodes route an item left when `dot(weights, values) <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Internal(InternalNode),
    Leaf(LeafNode),
}

/// A hyperplane (or axis-aligned) split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalNode {
    /// One weight per feature, aligned with [`ObliqueTree::feature_names`].
    pub weights: Vec<f64>,
    /// Projection threshold; ties route left.
    pub threshold: f64,
    /// Number of items that reached this node.
    pub sample_count: usize,
    /// Impurity reduction achieved by the split.
    pub gain: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// A terminal node holding the products that reached it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeafNode {
    pub products: Vec<FeatureVector>,
}

impl TreeNode {
    /// Create a leaf.
    pub fn leaf(products: Vec<FeatureVector>) -> Self {
        Self::Leaf(LeafNode { products })
    }

    /// Whether this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Variant name, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Internal(_) => "internal",
            Self::Leaf(_) => "leaf",
        }
    }

    /// Number of items that reached this node.
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Internal(node) => node.sample_count,
            Self::Leaf(leaf) => leaf.products.len(),
        }
    }

    /// Depth of the subtree in edges (a lone leaf has depth 0).
    pub fn depth(&self) -> usize {
        match self {
            Self::Internal(node) => 1 + node.left.depth().max(node.right.depth()),
            Self::Leaf(_) => 0,
        }
    }

    /// All leaves of the subtree, left to right.
    pub fn leaves(&self) -> Vec<&LeafNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a LeafNode>) {
        match self {
            Self::Internal(node) => {
                node.left.collect_leaves(out);
                node.right.collect_leaves(out);
            }
            Self::Leaf(leaf) => out.push(leaf),
        }
    }

    /// All products of the subtree, left to right.
    pub fn products(&self) -> Vec<&FeatureVector> {
        self.leaves()
            .into_iter()
            .flat_map(|leaf| leaf.products.iter())
            .collect()
    }

    /// Internal nodes of the subtree in pre-order, with their depth.
    pub fn internal_nodes(&self) -> Vec<(&InternalNode, usize)> {
        let mut out = Vec::new();
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if let Self::Internal(internal) = node {
                out.push((internal, depth));
                stack.push((&internal.right, depth + 1));
                stack.push((&internal.left, depth + 1));
            }
        }
        out
    }
}

/// A built oblique tree with the metadata shared by all of its nodes.
///
/// Feature names and normalization bounds are stored once here and threaded through
/// consumers instead of being copied onto every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObliqueTree {
    pub root: TreeNode,
    /// Feature ordering shared by every node's weights.
    pub feature_names: Vec<String>,
    /// Bounds used to normalize the vectors, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<Normalization>,
}

impl ObliqueTree {
    /// Wrap a root with its feature names and bounds.
    pub fn new(root: TreeNode, feature_names: Vec<String>, normalization: Option<Normalization>) -> Self {
        Self {
            root,
            feature_names,
            normalization,
        }
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Structural statistics.
    pub fn stats(&self) -> TreeStats {
        let sizes: Vec<usize> = self.root.leaves().iter().map(|l| l.products.len()).collect();
        TreeStats::from_leaf_sizes(self.root.depth(), &sizes)
    }
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub depth: usize,
    pub leaf_count: usize,
    pub avg_leaf_size: f64,
    pub max_leaf_size: usize,
    pub min_leaf_size: usize,
}

impl TreeStats {
    /// Summarize a tree from its depth and leaf sizes.
    pub fn from_leaf_sizes(depth: usize, sizes: &[usize]) -> Self {
        if sizes.is_empty() {
            return Self {
                depth,
                ..Default::default()
            };
        }
        Self {
            depth,
            leaf_count: sizes.len(),
            avg_leaf_size: sizes.iter().sum::<usize>() as f64 / sizes.len() as f64,
            max_leaf_size: sizes.iter().copied().max().unwrap_or(0),
            min_leaf_size: sizes.iter().copied().min().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> FeatureVector {
        FeatureVector {
            id: id.to_string(),
            values: vec![0.0],
            raw_values: vec![0.0],
            original_row: vec![],
        }
    }

    fn small_tree() -> TreeNode {
        TreeNode::Internal(InternalNode {
            weights: vec![1.0],
            threshold: 0.5,
            sample_count: 3,
            gain: 0.1,
            left: Box::new(TreeNode::leaf(vec![product("a")])),
            right: Box::new(TreeNode::Internal(InternalNode {
                weights: vec![1.0],
                threshold: 0.8,
                sample_count: 2,
                gain: 0.05,
                left: Box::new(TreeNode::leaf(vec![product("b")])),
                right: Box::new(TreeNode::leaf(vec![product("c")])),
            })),
        })
    }

    #[test]
    fn structure_queries() {
        let root = small_tree();
        assert_eq!(root.depth(), 2);
        assert_eq!(root.leaves().len(), 3);
        let ids: Vec<&str> = root.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let internals = root.internal_nodes();
        assert_eq!(internals.len(), 2);
        assert_eq!(internals[1].1, 1);
    }

    #[test]
    fn stats_summarize_leaves() {
        let tree = ObliqueTree::new(small_tree(), vec!["price".into()], None);
        let stats = tree.stats();
        assert_eq!(stats.depth, 2);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.max_leaf_size, 1);
        assert_eq!(stats.min_leaf_size, 1);
    }

    #[test]
    fn serializes_as_tagged_union() {
        let json = serde_json::to_value(small_tree()).unwrap();
        assert_eq!(json["type"], "internal");
        assert_eq!(json["left"]["type"], "leaf");
        let back: TreeNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, small_tree());
    }
}
