//! Question tree node types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::Product;
use crate::oblique::TreeStats;

/// Option label that follows the left branch of a numeric question.
pub const YES: &str = "Yes";
/// Option label that follows the right branch of a numeric question.
pub const NO: &str = "No";

/// A node of the raw-attribute question tree.
///
/// Question text and answer options are rendered at build time so the tree can be
/// stored and replayed without the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionTreeNode {
    Leaf(QuestionLeaf),
    NumericQuestion(NumericQuestion),
    CategoricalQuestion(CategoricalQuestion),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionLeaf {
    /// Items that reached the leaf, before capping.
    pub sample_count: usize,
    /// Stored products, best preference score first.
    pub products: Vec<Product>,
    pub representative_products: Vec<Product>,
}

/// "At or below" question on a numeric attribute. Yes goes left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericQuestion {
    /// Source column.
    pub feature: String,
    pub question: String,
    pub threshold: f64,
    /// Always `["Yes", "No"]`.
    pub options: Vec<String>,
    pub left: Box<QuestionTreeNode>,
    pub right: Box<QuestionTreeNode>,
    pub sample_count: usize,
}

/// Multi-way question on a categorical attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalQuestion {
    /// Source column.
    pub feature: String,
    pub question: String,
    /// Branch labels in display order (most frequent first, "Other" last).
    pub options: Vec<String>,
    pub children: BTreeMap<String, QuestionTreeNode>,
    pub sample_count: usize,
}

impl QuestionTreeNode {
    /// Whether this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Variant name, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::NumericQuestion(_) => "numeric_question",
            Self::CategoricalQuestion(_) => "categorical_question",
        }
    }

    /// Number of items that reached this node.
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.sample_count,
            Self::NumericQuestion(q) => q.sample_count,
            Self::CategoricalQuestion(q) => q.sample_count,
        }
    }

    /// Question text, or `None` for a leaf.
    pub fn question(&self) -> Option<&str> {
        match self {
            Self::Leaf(_) => None,
            Self::NumericQuestion(q) => Some(&q.question),
            Self::CategoricalQuestion(q) => Some(&q.question),
        }
    }

    /// Answer options, empty for a leaf.
    pub fn options(&self) -> &[String] {
        match self {
            Self::Leaf(_) => &[],
            Self::NumericQuestion(q) => &q.options,
            Self::CategoricalQuestion(q) => &q.options,
        }
    }

    /// Children in option order.
    pub fn children(&self) -> Vec<&QuestionTreeNode> {
        match self {
            Self::Leaf(_) => Vec::new(),
            Self::NumericQuestion(q) => vec![q.left.as_ref(), q.right.as_ref()],
            Self::CategoricalQuestion(q) => q
                .options
                .iter()
                .filter_map(|option| q.children.get(option))
                .collect(),
        }
    }

    /// Depth in edges (a lone leaf has depth 0).
    pub fn depth(&self) -> usize {
        self.children()
            .into_iter()
            .map(|child| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }

    /// All leaves, in option order.
    pub fn leaves(&self) -> Vec<&QuestionLeaf> {
        match self {
            Self::Leaf(leaf) => vec![leaf],
            _ => self
                .children()
                .into_iter()
                .flat_map(|child| child.leaves())
                .collect(),
        }
    }
}

/// Shape summary of a question tree.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTreeStats {
    pub depth: usize,
    pub leaf_count: usize,
    pub question_count: usize,
    /// Leaf sizes count every item that reached the leaf, not the capped product list.
    pub avg_leaf_size: f64,
    pub max_leaf_size: usize,
    pub min_leaf_size: usize,
}

impl QuestionTreeStats {
    /// Summarize a tree.
    pub fn of(root: &QuestionTreeNode) -> Self {
        fn count_questions(node: &QuestionTreeNode) -> usize {
            if node.is_leaf() {
                return 0;
            }
            1 + node.children().into_iter().map(count_questions).sum::<usize>()
        }
        let sizes: Vec<usize> = root.leaves().iter().map(|leaf| leaf.sample_count).collect();
        let shape = TreeStats::from_leaf_sizes(root.depth(), &sizes);
        Self {
            depth: shape.depth,
            leaf_count: shape.leaf_count,
            question_count: count_questions(root),
            avg_leaf_size: shape.avg_leaf_size,
            max_leaf_size: shape.max_leaf_size,
            min_leaf_size: shape.min_leaf_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: usize) -> QuestionTreeNode {
        QuestionTreeNode::Leaf(QuestionLeaf {
            sample_count: n,
            ..Default::default()
        })
    }

    fn sample() -> QuestionTreeNode {
        let mut children = BTreeMap::new();
        children.insert("red".to_string(), leaf(2));
        children.insert("Other".to_string(), leaf(1));
        QuestionTreeNode::NumericQuestion(NumericQuestion {
            feature: "price".into(),
            question: "Are you looking for price at or below $20?".into(),
            threshold: 20.0,
            options: vec![YES.into(), NO.into()],
            left: Box::new(leaf(4)),
            right: Box::new(QuestionTreeNode::CategoricalQuestion(CategoricalQuestion {
                feature: "color".into(),
                question: "Which color do you prefer?".into(),
                options: vec!["red".into(), "Other".into()],
                children,
                sample_count: 3,
            })),
            sample_count: 7,
        })
    }

    #[test]
    fn stats_count_questions_and_leaves() {
        let stats = QuestionTreeStats::of(&sample());
        assert_eq!(stats.depth, 2);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.question_count, 2);
        assert_eq!(stats.max_leaf_size, 4);
        assert_eq!(stats.min_leaf_size, 1);
        assert!((stats.avg_leaf_size - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn children_follow_option_order() {
        let root = sample();
        let right = root.children()[1];
        let counts: Vec<usize> = right.children().iter().map(|c| c.sample_count()).collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "numeric_question");
        assert_eq!(json["right"]["type"], "categorical_question");
        assert_eq!(json["right"]["children"]["red"]["type"], "leaf");
    }
}
