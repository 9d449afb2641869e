//! Feature vectorization.
//!
//! Turns raw catalog rows into numeric [`FeatureVector`]s:
//!
//! - numeric columns pass through (missing cells take the column mean),
//! - categorical columns are one-hot encoded over at most 16 supported categories plus a
//!   reserved "Other" slot,
//! - every feature is min–max normalized to `[0, 1]`, keeping the bounds in a
//!   [`Normalization`] for later denormalization.
//!
//! Identifier/coordinate columns, zero-variance columns and free text are dropped.

mod encoder;
mod normalization;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use encoder::{DropReason, FeatureKind};
pub use normalization::{Normalization, ZERO_RANGE_VALUE};

use encoder::{plan_column, CategoryRules, ColumnEncoding};

use crate::data::RawTable;
use crate::error::{EngineError, Result};
use crate::profile::{naming, AttributeProfile};

/// One encoded catalog row.
///
/// `values.len()` always equals the catalog's feature count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// Product id.
    pub id: String,
    /// Encoded, normalized values.
    pub values: Vec<f64>,
    /// Encoded values before normalization.
    pub raw_values: Vec<f64>,
    /// Display cells of the source row.
    pub original_row: Vec<String>,
}

/// Output of vectorization: aligned feature metadata, vectors and bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedCatalog {
    /// Feature names; one-hot slots are named `column=value`.
    pub feature_names: Vec<String>,
    /// What each feature represents.
    pub feature_kinds: Vec<FeatureKind>,
    /// One vector per table row, in row order.
    pub vectors: Vec<FeatureVector>,
    /// Bounds used for normalization.
    pub normalization: Normalization,
}

impl EncodedCatalog {
    /// Number of encoded features.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of vectors.
    pub fn n_vectors(&self) -> usize {
        self.vectors.len()
    }

    /// Whether a feature is a one-hot slot.
    pub fn is_one_hot(&self, feature: usize) -> bool {
        self.feature_kinds[feature].is_one_hot()
    }
}

/// Encodes and normalizes catalog rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVectorizer {
    /// Categories kept per categorical column. Default: 16.
    pub max_categories: usize,
    /// A category is supported with at least this many occurrences. Default: 2.
    pub min_category_count: usize,
    /// ...or at least this share of non-empty cells. Default: 0.02.
    pub min_category_fraction: f64,
}

impl Default for FeatureVectorizer {
    fn default() -> Self {
        Self {
            max_categories: 16,
            min_category_count: 2,
            min_category_fraction: 0.02,
        }
    }
}

impl FeatureVectorizer {
    /// Encode every row of `table`.
    ///
    /// `profiles` (one per header, as produced by [`crate::profile::profile_table`]) let
    /// the vectorizer drop columns the profiler recognized as identifiers or coordinates.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoUsableColumns`] if every column is dropped.
    pub fn encode(&self, table: &RawTable, profiles: &[AttributeProfile]) -> Result<EncodedCatalog> {
        table.validate()?;
        let rules = CategoryRules {
            max_categories: self.max_categories,
            min_count: self.min_category_count,
            min_fraction: self.min_category_fraction,
        };

        let mut plans = Vec::new();
        for column in 0..table.n_columns() {
            let profile = profiles.get(column).filter(|p| p.name == table.headers[column]);
            match plan_column(table, column, profile, rules) {
                Ok(plan) => plans.push(plan),
                Err(reason) => debug!(
                    column = table.headers[column].as_str(),
                    ?reason,
                    "dropped column"
                ),
            }
        }

        let feature_kinds: Vec<FeatureKind> = plans
            .iter()
            .flat_map(|plan| plan.feature_kinds(&table.headers))
            .collect();
        if feature_kinds.is_empty() {
            warn!(n_columns = table.n_columns(), "no usable columns");
            return Err(EngineError::NoUsableColumns {
                n_columns: table.n_columns(),
            });
        }
        let feature_names: Vec<String> = feature_kinds.iter().map(feature_name).collect();

        let raw = encode_rows(table, &plans, feature_names.len());
        let normalization = Normalization::fit(raw.view());
        let mut normalized = raw.clone();
        normalization.transform(&mut normalized);

        let vectors = (0..table.n_rows())
            .map(|row| FeatureVector {
                id: table.product_id(row),
                values: normalized.row(row).to_vec(),
                raw_values: raw.row(row).to_vec(),
                original_row: table.rows[row].clone(),
            })
            .collect();

        debug!(
            n_features = feature_names.len(),
            n_rows = table.n_rows(),
            "vectorized catalog"
        );
        Ok(EncodedCatalog {
            feature_names,
            feature_kinds,
            vectors,
            normalization,
        })
    }
}

fn feature_name(kind: &FeatureKind) -> String {
    match kind {
        FeatureKind::Numeric { column } => column.clone(),
        FeatureKind::OneHot { column, value, .. } => naming::one_hot_name(column, value),
    }
}

fn encode_rows(table: &RawTable, plans: &[ColumnEncoding], n_features: usize) -> Array2<f64> {
    let mut flat = Vec::with_capacity(table.n_rows() * n_features);
    for row in &table.rows {
        for plan in plans {
            plan.encode_into(row, &mut flat);
        }
    }
    Array2::from_shape_vec((table.n_rows(), n_features), flat)
        .unwrap_or_else(|_| Array2::zeros((table.n_rows(), n_features)))
}
