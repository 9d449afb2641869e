//! Full build pipeline.
//!
//! [`build`] runs every stage over one catalog snapshot:
//!
//! 1. profile each column,
//! 2. vectorize and normalize,
//! 3. grow the oblique tree,
//! 4. grow the raw-attribute question tree.
//!
//! The result is plain data. [`preview_questions`] renders the oblique tree's questions
//! with the same [`QuestionGenerator::generate`] call a live session uses.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BuildOptions;
use crate::data::RawTable;
use crate::error::Result;
use crate::navigator::Side;
use crate::oblique::{ObliqueTree, ObliqueTreeBuilder, TreeNode, TreeStats};
use crate::profile::{profile_table, AttributeProfile};
use crate::question::{GeneratedQuestion, QuestionGenerator};
use crate::question_tree::{QuestionTreeBuilder, QuestionTreeNode, QuestionTreeStats};
use crate::vectorize::FeatureVectorizer;

/// Everything produced by one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    /// One profile per header, in header order.
    pub profiles: Vec<AttributeProfile>,
    pub oblique_tree: ObliqueTree,
    pub question_tree: QuestionTreeNode,
    pub metrics: BuildMetrics,
}

/// Shape and timing of a build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetrics {
    /// Oblique tree shape.
    #[serde(flatten)]
    pub tree: TreeStats,
    pub build_time_ms: u64,
    pub question_tree: QuestionTreeStats,
}

/// Build both trees from a catalog snapshot.
///
/// # Errors
///
/// - [`crate::EngineError::Config`] if `options` fail validation
/// - [`crate::EngineError::EmptyInput`] for a headerless or row-less table
/// - [`crate::EngineError::NoUsableColumns`] if vectorization keeps nothing
pub fn build(table: &RawTable, options: &BuildOptions) -> Result<BuildOutput> {
    let start = Instant::now();
    options.validate()?;
    table.validate()?;
    let table = RawTable::new(table.headers.clone(), table.rows.clone());

    let profiles = profile_table(&table);
    let catalog = FeatureVectorizer::default().encode(&table, &profiles)?;
    let oblique_tree = ObliqueTreeBuilder::new(options.clone()).build(&catalog);
    let question_tree = QuestionTreeBuilder::new(options.question_tree.clone()).build(&table, &profiles);

    let metrics = BuildMetrics {
        tree: oblique_tree.stats(),
        build_time_ms: start.elapsed().as_millis() as u64,
        question_tree: QuestionTreeStats::of(&question_tree),
    };
    info!(
        n_rows = table.n_rows(),
        n_features = catalog.n_features(),
        depth = metrics.tree.depth,
        leaves = metrics.tree.leaf_count,
        questions = metrics.question_tree.question_count,
        build_time_ms = metrics.build_time_ms,
        "build finished"
    );

    Ok(BuildOutput {
        profiles,
        oblique_tree,
        question_tree,
        metrics,
    })
}

/// A question rendered ahead of time for one internal node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewQuestion {
    /// Answers leading from the root to the node.
    pub path: Vec<Side>,
    pub depth: usize,
    pub question: GeneratedQuestion,
}

/// Render every internal node of the oblique tree, in pre-order.
///
/// Attributes asked on the path to a node are passed along exactly as a live session
/// accumulates them, so previews match replays.
pub fn preview_questions(output: &BuildOutput, generator: &QuestionGenerator) -> Result<Vec<PreviewQuestion>> {
    let mut out = Vec::new();
    let mut stack: Vec<(&TreeNode, Vec<Side>, Vec<String>)> =
        vec![(&output.oblique_tree.root, Vec::new(), Vec::new())];
    while let Some((node, path, asked)) = stack.pop() {
        let TreeNode::Internal(internal) = node else {
            continue;
        };
        let question = generator.generate(
            &output.oblique_tree,
            node,
            Some(output.profiles.as_slice()),
            &asked,
            path.len(),
        )?;
        let mut child_asked = asked;
        child_asked.extend(question.focus_attributes.iter().cloned());

        for (side, child) in [(Side::Right, &internal.right), (Side::Left, &internal.left)] {
            let mut child_path = path.clone();
            child_path.push(side);
            stack.push((child.as_ref(), child_path, child_asked.clone()));
        }
        out.push(PreviewQuestion {
            depth: path.len(),
            path,
            question,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::error::EngineError;
    use crate::navigator;

    fn table() -> RawTable {
        RawTable::from_strs(
            &["id", "price", "rating", "color"],
            &[
                &["p1", "10", "4.5", "red"],
                &["p2", "12", "4.4", "red"],
                &["p3", "15", "4.6", "red"],
                &["p4", "80", "3.1", "blue"],
                &["p5", "85", "3.0", "blue"],
                &["p6", "90", "3.3", "blue"],
            ],
        )
    }

    #[test]
    fn build_produces_both_trees() {
        let options = BuildOptions::builder().min_leaf_size(1).build().unwrap();
        let output = build(&table(), &options).unwrap();
        assert_eq!(output.profiles.len(), 4);
        assert!(!output.oblique_tree.root.is_leaf());
        assert_eq!(output.oblique_tree.root.sample_count(), 6);
        assert_eq!(output.metrics.tree.leaf_count, output.oblique_tree.root.leaves().len());
        assert_eq!(
            output.question_tree.leaves().iter().map(|l| l.sample_count).sum::<usize>(),
            6
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = RawTable::from_strs(&["price"], &[]);
        assert_eq!(
            build(&table, &BuildOptions::default()),
            Err(EngineError::EmptyInput { reason: "no rows" })
        );
        let table = RawTable::from_strs(&[], &[]);
        assert_eq!(
            build(&table, &BuildOptions::default()),
            Err(EngineError::EmptyInput { reason: "no headers" })
        );
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let table = RawTable {
            headers: vec!["price".into(), "weight".into()],
            rows: vec![
                vec!["10".into()],
                vec!["20".into(), "2".into(), "extra".into()],
                vec!["30".into(), "3".into()],
            ],
        };
        let output = build(&table, &BuildOptions::default()).unwrap();
        assert_eq!(output.oblique_tree.n_features(), 2);
    }

    #[test]
    fn preview_covers_every_internal_node_and_matches_replay() {
        let options = BuildOptions::builder().min_leaf_size(1).build().unwrap();
        let output = build(&table(), &options).unwrap();
        let generator = QuestionGenerator::default();
        let previews = preview_questions(&output, &generator).unwrap();
        assert_eq!(previews.len(), output.oblique_tree.root.internal_nodes().len());

        for preview in &previews {
            let node = navigator::follow_path(&output.oblique_tree.root, &preview.path).unwrap();
            let mut asked = Vec::new();
            for depth in 0..preview.path.len() {
                let ancestor =
                    navigator::follow_path(&output.oblique_tree.root, &preview.path[..depth]).unwrap();
                let q = generator
                    .generate(&output.oblique_tree, ancestor, Some(output.profiles.as_slice()), &asked, depth)
                    .unwrap();
                asked.extend(q.focus_attributes);
            }
            let replay = generator
                .generate(&output.oblique_tree, node, Some(output.profiles.as_slice()), &asked, preview.depth)
                .unwrap();
            assert_eq!(replay, preview.question);
        }
    }

    #[test]
    fn metrics_serialize_flat() {
        let output = build(&table(), &BuildOptions::default()).unwrap();
        let json = serde_json::to_value(output.metrics).unwrap();
        assert!(json.get("depth").is_some());
        assert!(json.get("buildTimeMs").is_some());
        assert!(json["questionTree"].get("leafCount").is_some());
        for field in ["avgLeafSize", "maxLeafSize", "minLeafSize"] {
            assert!(json["questionTree"].get(field).is_some(), "missing {field}");
        }
        let question_tree = output.metrics.question_tree;
        assert!(question_tree.min_leaf_size <= question_tree.max_leaf_size);
        let total: usize = output.question_tree.leaves().iter().map(|l| l.sample_count).sum();
        assert_abs_diff_eq!(
            question_tree.avg_leaf_size * question_tree.leaf_count as f64,
            total as f64,
            epsilon = 1e-9
        );
    }
}
