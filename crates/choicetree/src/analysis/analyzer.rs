use std::cmp::Ordering;

use tracing::debug;

use super::{AttributeRange, BranchStats, DistinguishingAttribute, SplitAnalysis};
use crate::oblique::{ObliqueTree, TreeNode};
use crate::utils;

/// Attributes whose branch averages differ by at most this many percent are not reported.
pub const DEFAULT_MIN_DIFFERENCE_PERCENT: f64 = 5.0;

/// Compares the two branches of oblique splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitAnalyzer {
    /// Relative difference (percent) an attribute must exceed. Default: 5.0.
    pub min_difference_percent: f64,
}

impl Default for SplitAnalyzer {
    fn default() -> Self {
        Self {
            min_difference_percent: DEFAULT_MIN_DIFFERENCE_PERCENT,
        }
    }
}

impl SplitAnalyzer {
    /// Analyze an internal node of `tree`.
    ///
    /// Products are collected from the full subtrees on each side. Values are mapped back
    /// to catalog units through the tree's normalization bounds, or taken from
    /// `raw_values` when the tree has none.
    ///
    /// Returns `None` for a leaf, an empty branch, or fewer than two products.
    pub fn analyze_split(&self, tree: &ObliqueTree, node: &TreeNode) -> Option<SplitAnalysis> {
        let TreeNode::Internal(internal) = node else {
            return None;
        };
        let to_rows = |branch: &TreeNode| -> Vec<Vec<f64>> {
            branch
                .products()
                .into_iter()
                .map(|p| match &tree.normalization {
                    Some(bounds) => p
                        .values
                        .iter()
                        .enumerate()
                        .map(|(f, &v)| {
                            if f < bounds.n_features() {
                                bounds.denormalize(f, v)
                            } else {
                                v
                            }
                        })
                        .collect(),
                    None => p.raw_values.clone(),
                })
                .collect()
        };
        let left = to_rows(&internal.left);
        let right = to_rows(&internal.right);
        self.compare_branches(&tree.feature_names, &left, &right)
    }

    /// Compare two groups of rows aligned with `feature_names`.
    ///
    /// Returns `None` if either side is empty or there are fewer than two rows.
    pub fn compare_branches(
        &self,
        feature_names: &[String],
        left_rows: &[Vec<f64>],
        right_rows: &[Vec<f64>],
    ) -> Option<SplitAnalysis> {
        if left_rows.is_empty() || right_rows.is_empty() || left_rows.len() + right_rows.len() < 2 {
            return None;
        }
        let left_stats = branch_stats(feature_names, left_rows);
        let right_stats = branch_stats(feature_names, right_rows);

        let mut distinguishing: Vec<DistinguishingAttribute> = feature_names
            .iter()
            .filter_map(|name| {
                let left_value = *left_stats.attribute_averages.get(name)?;
                let right_value = *right_stats.attribute_averages.get(name)?;
                let denominator = ((left_value + right_value) / 2.0).abs();
                if denominator == 0.0 {
                    return None;
                }
                let difference_percent = (right_value - left_value).abs() / denominator * 100.0;
                (difference_percent > self.min_difference_percent).then(|| DistinguishingAttribute {
                    name: name.clone(),
                    left_value,
                    right_value,
                    difference_percent,
                })
            })
            .collect();
        distinguishing.sort_by(|a, b| {
            b.difference_percent
                .partial_cmp(&a.difference_percent)
                .unwrap_or(Ordering::Equal)
        });

        debug!(
            left = left_rows.len(),
            right = right_rows.len(),
            distinguishing = distinguishing.len(),
            "compared branches"
        );
        Some(SplitAnalysis {
            left_stats,
            right_stats,
            distinguishing_attributes: distinguishing,
        })
    }
}

fn branch_stats(feature_names: &[String], rows: &[Vec<f64>]) -> BranchStats {
    let mut stats = BranchStats {
        product_count: rows.len(),
        ..Default::default()
    };
    for (f, name) in feature_names.iter().enumerate() {
        let column: Vec<f64> = rows
            .iter()
            .filter_map(|row| row.get(f).copied())
            .filter(|v| v.is_finite())
            .collect();
        if column.is_empty() {
            continue;
        }
        let sorted = utils::sorted(&column);
        stats.attribute_averages.insert(name.clone(), utils::mean(&column));
        stats.attribute_medians.insert(name.clone(), utils::median(&sorted));
        stats.attribute_ranges.insert(
            name.clone(),
            AttributeRange {
                min: sorted[0],
                max: sorted[sorted.len() - 1],
            },
        );
    }
    stats
}
