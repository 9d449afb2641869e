//! Error types shared across the engine.
//!
//! Two families exist:
//! - [`EngineError`]: returned by builds, question generation and navigation.
//! - [`ConfigError`]: returned by the option builders in [`crate::config`].

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the preference-tree engine.
///
/// Data-quality variants (`EmptyInput`, `NoUsableColumns`) describe the input
/// snapshot; the remaining variants are caller mistakes and are never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The table has no headers or no rows.
    #[error("input table is empty: {reason}")]
    EmptyInput { reason: &'static str },

    /// Every column was filtered out during vectorization.
    #[error("no usable columns after filtering ({n_columns} columns inspected)")]
    NoUsableColumns { n_columns: usize },

    /// A question was requested for a node that cannot carry one.
    #[error("invalid node kind: expected {expected}, got {got}")]
    InvalidNodeKind {
        expected: &'static str,
        got: &'static str,
    },

    /// Navigation was attempted from a node without children.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A projection was attempted with vectors of different lengths.
    #[error("dimension mismatch: values have {values} entries, weights have {weights}")]
    DimensionMismatch { values: usize, weights: usize },

    /// Leaf products were requested from an internal node.
    #[error("node is not a leaf")]
    NotALeaf,

    /// Build options failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Option validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A depth limit must be at least 1.
    #[error("{field} must be at least 1, got {value}")]
    InvalidDepth { field: &'static str, value: usize },

    /// A size or count parameter must be at least 1.
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },

    /// A ratio parameter must be in [0, 1].
    #[error("{field} must be in [0, 1], got {value}")]
    InvalidRatio { field: &'static str, value: f64 },

    /// A gain parameter must be non-negative and finite.
    #[error("{field} must be finite and >= 0, got {value}")]
    InvalidGain { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_engine_error() {
        let err: EngineError = ConfigError::ZeroCount { field: "min_leaf_size" }.into();
        assert!(matches!(err, EngineError::Config(_)));
        assert_eq!(err.to_string(), "min_leaf_size must be at least 1");
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = EngineError::DimensionMismatch { values: 3, weights: 2 };
        assert_eq!(
            err.to_string(),
            "dimension mismatch: values have 3 entries, weights have 2"
        );
    }
}
