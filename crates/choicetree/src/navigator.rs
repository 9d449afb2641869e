//! Stateless navigation over built trees.
//!
//! Sessions are owned by the caller: the engine only answers "where does this answer
//! lead", and callers record each answered question as a [`NavigationStep`].

use serde::{Deserialize, Serialize};

use crate::data::Product;
use crate::error::{EngineError, Result};
use crate::oblique::{ObliqueTree, TreeNode};
use crate::question_tree::{QuestionTreeNode, NO, YES};
use crate::utils::dot;
use crate::vectorize::FeatureVector;

/// Branch of a binary split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// One answered question in a caller-owned session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationStep {
    pub node_id: String,
    pub question: String,
    pub answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub choice: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Child of an internal node.
///
/// # Errors
///
/// [`EngineError::InvalidOperation`] on a leaf.
pub fn navigate(node: &TreeNode, side: Side) -> Result<&TreeNode> {
    match node {
        TreeNode::Internal(internal) => Ok(match side {
            Side::Left => internal.left.as_ref(),
            Side::Right => internal.right.as_ref(),
        }),
        TreeNode::Leaf(_) => Err(EngineError::InvalidOperation(
            "cannot navigate from a leaf".to_string(),
        )),
    }
}

/// `dot(values, weights)`.
///
/// # Errors
///
/// [`EngineError::DimensionMismatch`] when the lengths differ.
pub fn projection(values: &[f64], weights: &[f64]) -> Result<f64> {
    if values.len() != weights.len() {
        return Err(EngineError::DimensionMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }
    Ok(dot(values, weights))
}

/// Side an item falls on: left iff its projection is at or below `threshold`.
pub fn side(values: &[f64], weights: &[f64], threshold: f64) -> Result<Side> {
    Ok(if projection(values, weights)? <= threshold {
        Side::Left
    } else {
        Side::Right
    })
}

/// Products stored in a leaf.
///
/// # Errors
///
/// [`EngineError::NotALeaf`] for an internal node.
pub fn leaf_products(node: &TreeNode) -> Result<&[FeatureVector]> {
    match node {
        TreeNode::Leaf(leaf) => Ok(&leaf.products),
        TreeNode::Internal(_) => Err(EngineError::NotALeaf),
    }
}

/// Every product below `node`, left to right.
pub fn subtree_products(node: &TreeNode) -> Vec<&FeatureVector> {
    node.products()
}

/// Route a normalized vector from the root to its leaf.
pub fn route_to_leaf<'a>(tree: &'a ObliqueTree, values: &[f64]) -> Result<&'a TreeNode> {
    let mut node = &tree.root;
    while let TreeNode::Internal(internal) = node {
        node = navigate(node, side(values, &internal.weights, internal.threshold)?)?;
    }
    Ok(node)
}

/// Follow a sequence of answers from `root`.
///
/// # Errors
///
/// [`EngineError::InvalidOperation`] if the path runs past a leaf.
pub fn follow_path<'a>(root: &'a TreeNode, sides: &[Side]) -> Result<&'a TreeNode> {
    sides.iter().try_fold(root, |node, &s| navigate(node, s))
}

/// Child of a question-tree node for an answer option.
///
/// Numeric questions accept "Yes" (left) and "No" (right), case-insensitively;
/// categorical questions accept any of their options.
///
/// # Errors
///
/// [`EngineError::InvalidOperation`] on a leaf or for an unknown option.
pub fn answer_question<'a>(node: &'a QuestionTreeNode, option: &str) -> Result<&'a QuestionTreeNode> {
    let option = option.trim();
    match node {
        QuestionTreeNode::Leaf(_) => Err(EngineError::InvalidOperation(
            "cannot answer a leaf".to_string(),
        )),
        QuestionTreeNode::NumericQuestion(q) => {
            if option.eq_ignore_ascii_case(YES) {
                Ok(q.left.as_ref())
            } else if option.eq_ignore_ascii_case(NO) {
                Ok(q.right.as_ref())
            } else {
                Err(unknown_option(option, &q.feature))
            }
        }
        QuestionTreeNode::CategoricalQuestion(q) => q
            .children
            .get(option)
            .ok_or_else(|| unknown_option(option, &q.feature)),
    }
}

/// Products stored in a question-tree leaf.
pub fn question_leaf_products(node: &QuestionTreeNode) -> Result<&[Product]> {
    match node {
        QuestionTreeNode::Leaf(leaf) => Ok(&leaf.products),
        _ => Err(EngineError::NotALeaf),
    }
}

fn unknown_option(option: &str, feature: &str) -> EngineError {
    EngineError::InvalidOperation(format!("unknown option {:?} for question on {}", option, feature))
}
