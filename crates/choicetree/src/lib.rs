//! choicetree: an adaptive preference-tree engine for product catalogs.
//!
//! Turns a tabular catalog into natural-language binary-choice questions that narrow the
//! catalog toward a small recommended set, without any labeled data.
//!
//! # Key Types
//!
//! - [`RawTable`] - Catalog input (headers plus string rows)
//! - [`BuildOptions`] - Build configuration builder
//! - [`ObliqueTree`] - Hyperplane tree over encoded, normalized features
//! - [`QuestionTreeNode`] - Axis-aligned question tree over raw attributes
//! - [`QuestionGenerator`] - Renders oblique splits as questions
//!
//! # Building
//!
//! ```
//! use choicetree::{build, BuildOptions, QuestionGenerator};
//! use choicetree::testing::synthetic_catalog;
//!
//! let table = synthetic_catalog(60, 42);
//! let output = build(&table, &BuildOptions::default()).unwrap();
//!
//! if !output.oblique_tree.root.is_leaf() {
//!     let question = QuestionGenerator::default()
//!         .generate(&output.oblique_tree, &output.oblique_tree.root, Some(&output.profiles[..]), &[], 0)
//!         .unwrap();
//!     assert!(question.id.starts_with("q_"));
//! }
//! ```
//!
//! # Navigating
//!
//! Sessions live with the caller. See the [`navigator`] module for routing answers
//! through either tree.

// Re-export approx for users comparing float outputs
pub use approx;

pub mod analysis;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod navigator;
pub mod oblique;
pub mod profile;
pub mod question;
pub mod question_tree;
pub mod testing;
pub mod utils;
pub mod vectorize;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Pipeline
pub use engine::{build, preview_questions, BuildMetrics, BuildOutput, PreviewQuestion};

// Configuration
pub use config::{BuildOptions, GeneratorOptions, QuestionTreeParams};

// Errors
pub use error::{ConfigError, EngineError, Result};

// Data model
pub use analysis::{SplitAnalysis, SplitAnalyzer};
pub use data::{Product, RawTable};
pub use navigator::{NavigationStep, Side};
pub use oblique::{ObliqueTree, ObliqueTreeBuilder, TreeNode, TreeStats};
pub use profile::{AttributeProfile, AttributeType};
pub use question::{GeneratedQuestion, QuestionGenerator};
pub use question_tree::{QuestionTreeBuilder, QuestionTreeNode};
pub use vectorize::{FeatureVector, FeatureVectorizer};
