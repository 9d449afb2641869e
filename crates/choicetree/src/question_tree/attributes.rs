//! Raw attribute classification and the per-product preference score.

use std::collections::HashSet;

use crate::data::RawTable;
use crate::profile::{naming, NUMERIC_CELL_RATIO};
use crate::utils::parse_number;

/// Text columns with more distinct values than this are not asked about.
pub(crate) const MAX_CATEGORICAL_VALUES: usize = 30;

/// Neutral score used when nothing numeric describes a product.
pub(crate) const NEUTRAL_SCORE: f64 = 0.5;

/// How a raw column takes part in the question tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawAttribute {
    Numeric {
        column: usize,
        /// Parsed value per row; `None` for missing or unparsable cells.
        values: Vec<Option<f64>>,
    },
    Categorical {
        column: usize,
        /// Trimmed cell per row; empty for missing.
        values: Vec<String>,
    },
}

impl RawAttribute {
    pub(crate) fn column(&self) -> usize {
        match self {
            Self::Numeric { column, .. } | Self::Categorical { column, .. } => *column,
        }
    }
}

/// Classify every column of `table`; ignored columns are left out.
pub(crate) fn classify_columns(table: &RawTable) -> Vec<RawAttribute> {
    (0..table.n_columns())
        .filter_map(|column| classify_column(table, column))
        .collect()
}

fn classify_column(table: &RawTable, column: usize) -> Option<RawAttribute> {
    let name = &table.headers[column];
    if naming::is_identifier_name(name)
        || naming::is_coordinate_name(name)
        || naming::is_timestamp_name(name)
    {
        return None;
    }

    let cells: Vec<&str> = table.column(column).into_iter().map(str::trim).collect();
    let non_empty: Vec<&str> = cells.iter().copied().filter(|c| !c.is_empty()).collect();
    if non_empty.is_empty() {
        return None;
    }

    let parsed: Vec<Option<f64>> = cells.iter().map(|c| parse_number(c)).collect();
    let n_numeric = parsed.iter().flatten().count();
    if n_numeric as f64 >= NUMERIC_CELL_RATIO * non_empty.len() as f64 {
        let distinct: HashSet<u64> = parsed.iter().flatten().map(|v| v.to_bits()).collect();
        if distinct.len() < 2 {
            return None;
        }
        return Some(RawAttribute::Numeric {
            column,
            values: parsed,
        });
    }

    let distinct: HashSet<&str> = non_empty.iter().copied().collect();
    if (2..=MAX_CATEGORICAL_VALUES).contains(&distinct.len()) {
        return Some(RawAttribute::Categorical {
            column,
            values: cells.iter().map(|c| c.to_string()).collect(),
        });
    }
    None
}

/// Preference score in `[0, 1]` for every row.
///
/// A rating/score/popularity-named numeric attribute is used directly when present.
/// Otherwise the score is the mean of the row's min–max normalized numerics, with
/// lower-is-better names flipped. Rows with nothing to average score 0.5.
pub(crate) fn preference_scores(table: &RawTable, attributes: &[RawAttribute]) -> Vec<f64> {
    let numerics: Vec<(&str, &[Option<f64>])> = attributes
        .iter()
        .filter_map(|attr| match attr {
            RawAttribute::Numeric { column, values } => {
                Some((table.headers[*column].as_str(), values.as_slice()))
            }
            RawAttribute::Categorical { .. } => None,
        })
        .collect();

    if let Some((_, values)) = numerics.iter().find(|(name, _)| naming::is_score_name(name)) {
        let scaled = min_max(values);
        return scaled.into_iter().map(|v| v.unwrap_or(NEUTRAL_SCORE)).collect();
    }

    let scaled: Vec<Vec<Option<f64>>> = numerics
        .iter()
        .map(|(name, values)| {
            let flip = naming::is_lower_better_name(name);
            min_max(values)
                .into_iter()
                .map(|v| v.map(|x| if flip { 1.0 - x } else { x }))
                .collect()
        })
        .collect();

    (0..table.n_rows())
        .map(|row| {
            let present: Vec<f64> = scaled.iter().filter_map(|col| col[row]).collect();
            if present.is_empty() {
                NEUTRAL_SCORE
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            }
        })
        .collect()
}

fn min_max(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().flatten();
    let min = present.clone().copied().fold(f64::INFINITY, f64::min);
    let max = present.copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                if range > 0.0 {
                    (x - min) / range
                } else {
                    NEUTRAL_SCORE
                }
            })
        })
        .collect()
}
