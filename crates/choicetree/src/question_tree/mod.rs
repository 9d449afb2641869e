//! Axis-aligned question tree over raw catalog attributes.
//!
//! Unlike the oblique tree, this tree never leaves the catalog's own units: numeric
//! questions ask "at or below" a real value and categorical questions list the actual
//! categories. Question text is rendered while building.
//!
//! # Example
//!
//! ```
//! use choicetree::config::QuestionTreeParams;
//! use choicetree::data::RawTable;
//! use choicetree::profile::profile_table;
//! use choicetree::question_tree::{QuestionTreeBuilder, QuestionTreeNode};
//!
//! let table = RawTable::from_strs(
//!     &["price", "rating"],
//!     &[&["10", "4.8"], &["12", "4.6"], &["90", "2.0"], &["95", "2.2"]],
//! );
//! let params = QuestionTreeParams { min_leaf_size: 1, ..Default::default() };
//! let root = QuestionTreeBuilder::new(params).build(&table, &profile_table(&table));
//! assert!(matches!(root, QuestionTreeNode::NumericQuestion(_)));
//! ```

mod attributes;
mod builder;
mod node;

pub use builder::QuestionTreeBuilder;
pub use node::{
    CategoricalQuestion, NumericQuestion, QuestionLeaf, QuestionTreeNode, QuestionTreeStats, NO,
    YES,
};
