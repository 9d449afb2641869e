//! Branch comparison for oblique splits.
//!
//! [`SplitAnalyzer`] walks both subtrees of an internal node, summarizes each branch per
//! attribute in catalog units, and reports the attributes whose branch averages differ
//! noticeably. Question generation uses this to phrase questions from observed data.

mod analyzer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use analyzer::{SplitAnalyzer, DEFAULT_MIN_DIFFERENCE_PERCENT};

/// Observed bounds of an attribute within one branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeRange {
    pub min: f64,
    pub max: f64,
}

/// Per-attribute summary of one branch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStats {
    pub product_count: usize,
    pub attribute_averages: BTreeMap<String, f64>,
    pub attribute_medians: BTreeMap<String, f64>,
    pub attribute_ranges: BTreeMap<String, AttributeRange>,
}

/// An attribute whose branch averages differ by more than the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistinguishingAttribute {
    pub name: String,
    pub left_value: f64,
    pub right_value: f64,
    /// `|right - left| / mean(left, right) * 100`.
    pub difference_percent: f64,
}

impl DistinguishingAttribute {
    /// Whether the right branch has the larger average.
    pub fn right_is_higher(&self) -> bool {
        self.right_value > self.left_value
    }
}

/// Comparison of the two branches of a split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitAnalysis {
    pub left_stats: BranchStats,
    pub right_stats: BranchStats,
    /// Sorted by `difference_percent`, largest first.
    pub distinguishing_attributes: Vec<DistinguishingAttribute>,
}

impl SplitAnalysis {
    /// The most distinguishing attribute, if any.
    pub fn top(&self) -> Option<&DistinguishingAttribute> {
        self.distinguishing_attributes.first()
    }
}
