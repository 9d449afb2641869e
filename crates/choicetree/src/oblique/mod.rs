//! Oblique decision tree over encoded catalog vectors.
//!
//! Each internal node holds a hyperplane `(weights, threshold)`; an item goes left when
//! `dot(weights, values) <= threshold`. Axis-aligned splits are the special case of a
//! single non-zero weight.
//!
//! # Example
//!
//! ```
//! use choicetree::config::BuildOptions;
//! use choicetree::data::RawTable;
//! use choicetree::oblique::ObliqueTreeBuilder;
//! use choicetree::profile::profile_table;
//! use choicetree::vectorize::FeatureVectorizer;
//!
//! let table = RawTable::from_strs(
//!     &["price", "rating"],
//!     &[&["10", "4.5"], &["12", "4.4"], &["80", "3.0"], &["85", "3.1"]],
//! );
//! let catalog = FeatureVectorizer::default()
//!     .encode(&table, &profile_table(&table))
//!     .unwrap();
//! let options = BuildOptions::builder().min_leaf_size(1).build().unwrap();
//! let tree = ObliqueTreeBuilder::new(options).build(&catalog);
//! assert_eq!(tree.root.products().len(), 4);
//! ```

mod builder;
mod node;
mod split;

pub use builder::ObliqueTreeBuilder;
pub use node::{InternalNode, LeafNode, ObliqueTree, TreeNode, TreeStats};
