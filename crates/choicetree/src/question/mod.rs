//! Natural-language questions for oblique splits.
//!
//! [`QuestionGenerator::generate`] turns an internal [`crate::oblique::TreeNode`] into a
//! binary-choice question. Phrasing prefers, in order: observed branch differences from
//! the [`crate::analysis::SplitAnalyzer`], real cutoffs for single-feature splits,
//! one-hot membership, profile quantiles, and finally plain "less/more" wording.
//!
//! # Example
//!
//! ```
//! use choicetree::oblique::{InternalNode, ObliqueTree, TreeNode};
//! use choicetree::question::QuestionGenerator;
//!
//! let root = TreeNode::Internal(InternalNode {
//!     weights: vec![1.0],
//!     threshold: 0.5,
//!     sample_count: 0,
//!     gain: 0.0,
//!     left: Box::new(TreeNode::leaf(vec![])),
//!     right: Box::new(TreeNode::leaf(vec![])),
//! });
//! let tree = ObliqueTree::new(root, vec!["weight".into()], None);
//! let question = QuestionGenerator::default()
//!     .generate(&tree, &tree.root, None, &[], 0)
//!     .unwrap();
//! assert!(question.id.starts_with("q_"));
//! assert_eq!(question.left_label, "less weight");
//! ```

mod generator;
mod phrasing;
mod templates;

use serde::{Deserialize, Serialize};

pub use generator::QuestionGenerator;

/// A rendered question for one internal node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    /// Stable id derived from the split (`q_` + 16 hex characters).
    pub id: String,
    pub text: String,
    /// Label of the left (projection at or below threshold) answer.
    pub left_label: String,
    pub right_label: String,
    /// Feature names the question is about; callers append these to their asked list.
    pub focus_attributes: Vec<String>,
}
