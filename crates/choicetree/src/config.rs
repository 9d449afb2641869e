//! Build configuration with builder pattern.
//!
//! [`BuildOptions`] controls the oblique tree and nests [`QuestionTreeParams`] for the
//! raw-attribute question tree. [`GeneratorOptions`] controls question rendering.
//!
//! # Example
//!
//! ```
//! use choicetree::config::{BuildOptions, QuestionTreeParams};
//!
//! // All defaults
//! let options = BuildOptions::builder().build().unwrap();
//! assert_eq!(options.max_depth, 6);
//!
//! // Shallower trees with tiny leaves
//! let options = BuildOptions::builder()
//!     .max_depth(4)
//!     .min_leaf_size(1)
//!     .question_tree(QuestionTreeParams { max_depth: 3, ..Default::default() })
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

use crate::error::ConfigError;

// =============================================================================
// BuildOptions
// =============================================================================

/// Options for a full engine build.
///
/// The first three fields are the documented external options; the rest tune the
/// split search and default to the values the engine has always used.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct BuildOptions {
    // === External options ===
    /// Maximum oblique tree depth (root = depth 0). Default: 6.
    #[builder(default = 6)]
    pub max_depth: usize,

    /// Nodes with at most this many items become leaves. Default: 3.
    #[builder(default = 3)]
    pub min_leaf_size: usize,

    /// Splits whose gain does not exceed this become leaves. Default: 1e-4.
    #[builder(default = 1e-4)]
    pub min_info_gain: f64,

    // === Split search ===
    /// Smallest fraction of parent items a branch may hold. Default: 0.05.
    #[builder(default = 0.05)]
    pub min_branch_fraction: f64,

    /// Axis-aligned thresholds kept per feature after downsampling. Default: 12.
    #[builder(default = 12)]
    pub max_axis_thresholds: usize,

    /// Number of farthest-pair rounds for oblique candidates. Default: 8.
    #[builder(default = 8)]
    pub oblique_rounds: usize,

    /// Item count up to which the farthest pair is found exactly. Default: 100.
    #[builder(default = 100)]
    pub exact_pair_limit: usize,

    /// Random pairs inspected per round above `exact_pair_limit`. Default: 50.
    #[builder(default = 50)]
    pub sampled_pairs: usize,

    /// Ranking multiplier applied to one-hot axis splits. Default: 6.0.
    #[builder(default = 6.0)]
    pub one_hot_gain_boost: f64,

    /// A categorical split replaces a non-categorical winner when its raw gain is at
    /// least this fraction of the winner's. Default: 0.35.
    ///
    /// Empirical; near-ties favor the more interpretable categorical question. The rule
    /// only changes the outcome when `one_hot_gain_boost` is below `1 / ratio`; at the
    /// default boost of 6 the boosted ranking already picks any one-hot split this close.
    #[builder(default = 0.35)]
    pub categorical_preference_ratio: f64,

    // === Question tree ===
    /// Parameters for the raw-attribute question tree.
    #[builder(default)]
    pub question_tree: QuestionTreeParams,

    // === Reproducibility ===
    /// Seed for farthest-pair sampling. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,
}

/// Custom finishing function that validates the options.
impl<S: build_options_builder::IsComplete> BuildOptionsBuilder<S> {
    /// Build and validate the options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a depth or count is zero, a ratio lies outside
    /// `[0, 1]`, or a gain is negative.
    pub fn build(self) -> Result<BuildOptions, ConfigError> {
        let options = self.__build_internal();
        options.validate()?;
        Ok(options)
    }
}

impl BuildOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidDepth {
                field: "max_depth",
                value: self.max_depth,
            });
        }
        if self.min_leaf_size == 0 {
            return Err(ConfigError::ZeroCount { field: "min_leaf_size" });
        }
        check_gain("min_info_gain", self.min_info_gain)?;
        check_ratio("min_branch_fraction", self.min_branch_fraction)?;
        check_ratio("categorical_preference_ratio", self.categorical_preference_ratio)?;
        if self.max_axis_thresholds == 0 {
            return Err(ConfigError::ZeroCount { field: "max_axis_thresholds" });
        }
        if self.sampled_pairs == 0 {
            return Err(ConfigError::ZeroCount { field: "sampled_pairs" });
        }
        check_gain("one_hot_gain_boost", self.one_hot_gain_boost)?;
        self.question_tree.validate()
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::builder().build().expect("default options are valid")
    }
}

// =============================================================================
// QuestionTreeParams
// =============================================================================

/// Parameters for the raw-attribute question tree.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionTreeParams {
    /// Maximum depth. Default: 4.
    pub max_depth: usize,
    /// Nodes with at most this many items become leaves. Default: 3.
    pub min_leaf_size: usize,
    /// Minimum score-variance reduction for a split. Default: 1e-3.
    pub min_gain: f64,
    /// Numeric thresholds evaluated per attribute. Default: 25.
    pub max_thresholds: usize,
    /// Named category branches before the "Other" bucket. Default: 6.
    pub max_categories: usize,
    /// Products stored per leaf. Default: 50.
    pub leaf_product_cap: usize,
    /// Representative products per leaf. Default: 3.
    pub representative_count: usize,
}

impl Default for QuestionTreeParams {
    fn default() -> Self {
        Self {
            max_depth: 4,
            min_leaf_size: 3,
            min_gain: 1e-3,
            max_thresholds: 25,
            max_categories: 6,
            leaf_product_cap: 50,
            representative_count: 3,
        }
    }
}

impl QuestionTreeParams {
    /// Validate parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidDepth {
                field: "question_tree.max_depth",
                value: self.max_depth,
            });
        }
        if self.min_leaf_size == 0 {
            return Err(ConfigError::ZeroCount { field: "question_tree.min_leaf_size" });
        }
        if self.max_thresholds == 0 {
            return Err(ConfigError::ZeroCount { field: "question_tree.max_thresholds" });
        }
        if self.max_categories == 0 {
            return Err(ConfigError::ZeroCount { field: "question_tree.max_categories" });
        }
        if self.leaf_product_cap == 0 {
            return Err(ConfigError::ZeroCount { field: "question_tree.leaf_product_cap" });
        }
        check_gain("question_tree.min_gain", self.min_gain)
    }
}

// =============================================================================
// GeneratorOptions
// =============================================================================

/// Options for [`crate::question::QuestionGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Seed mixed with the question id to pick a template. Default: 42.
    pub seed: u64,
    /// Prefer phrasing from observed branch statistics when available. Default: true.
    pub use_split_analysis: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            use_split_analysis: true,
        }
    }
}

fn check_ratio(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidRatio { field, value });
    }
    Ok(())
}

fn check_gain(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidGain { field, value });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        let options = BuildOptions::builder().build().unwrap();
        assert_eq!(options.max_depth, 6);
        assert_eq!(options.min_leaf_size, 3);
        assert!((options.min_info_gain - 1e-4).abs() < 1e-12);
        assert!((options.categorical_preference_ratio - 0.35).abs() < 1e-12);
        assert_eq!(options.question_tree, QuestionTreeParams::default());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let result = BuildOptions::builder().max_depth(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDepth { field: "max_depth", .. })
        ));
    }

    #[test]
    fn zero_leaf_size_is_rejected() {
        let result = BuildOptions::builder().min_leaf_size(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::ZeroCount { field: "min_leaf_size" })
        ));
    }

    #[test]
    fn negative_gain_is_rejected() {
        let result = BuildOptions::builder().min_info_gain(-1.0).build();
        assert!(matches!(result, Err(ConfigError::InvalidGain { .. })));
    }

    #[test]
    fn ratio_above_one_is_rejected() {
        let result = BuildOptions::builder()
            .categorical_preference_ratio(1.5)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRatio {
                field: "categorical_preference_ratio",
                ..
            })
        ));
    }

    #[test]
    fn nested_question_tree_params_are_validated() {
        let result = BuildOptions::builder()
            .question_tree(QuestionTreeParams {
                max_categories: 0,
                ..Default::default()
            })
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::ZeroCount {
                field: "question_tree.max_categories"
            })
        ));
    }
}
