//! Column planning: which raw columns become which encoded features.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::RawTable;
use crate::profile::{naming, AttributeProfile, AttributeType, NUMERIC_CELL_RATIO};
use crate::utils::{self, parse_number};

/// What an encoded feature represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureKind {
    /// A numeric column passed through.
    Numeric { column: String },
    /// One category slot of a categorical column.
    OneHot {
        column: String,
        value: String,
        /// The reserved overflow slot.
        other: bool,
    },
}

impl FeatureKind {
    /// Whether this is a one-hot slot.
    pub fn is_one_hot(&self) -> bool {
        matches!(self, Self::OneHot { .. })
    }

    /// Source column name.
    pub fn column(&self) -> &str {
        match self {
            Self::Numeric { column } | Self::OneHot { column, .. } => column,
        }
    }
}

/// Why a column produced no features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Empty,
    Identifier,
    Coordinate,
    ZeroVariance,
    FreeText,
}

/// Encoding plan for one kept column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColumnEncoding {
    Numeric {
        column: usize,
        /// Value used for missing or unparsable cells (the column mean).
        fill: f64,
    },
    Categorical {
        column: usize,
        kept: Vec<String>,
        has_other: bool,
    },
}

impl ColumnEncoding {
    /// Feature kinds contributed by this column, in slot order.
    pub(crate) fn feature_kinds(&self, headers: &[String]) -> Vec<FeatureKind> {
        match self {
            Self::Numeric { column, .. } => vec![FeatureKind::Numeric {
                column: headers[*column].clone(),
            }],
            Self::Categorical {
                column,
                kept,
                has_other,
            } => {
                let name = &headers[*column];
                let mut kinds: Vec<FeatureKind> = kept
                    .iter()
                    .map(|value| FeatureKind::OneHot {
                        column: name.clone(),
                        value: value.clone(),
                        other: false,
                    })
                    .collect();
                if *has_other {
                    kinds.push(FeatureKind::OneHot {
                        column: name.clone(),
                        value: naming::OTHER_CATEGORY.to_string(),
                        other: true,
                    });
                }
                kinds
            }
        }
    }

    /// Append this column's encoded values for one row.
    pub(crate) fn encode_into(&self, row: &[String], out: &mut Vec<f64>) {
        match self {
            Self::Numeric { column, fill } => {
                let value = row
                    .get(*column)
                    .and_then(|c| parse_number(c))
                    .unwrap_or(*fill);
                out.push(value);
            }
            Self::Categorical {
                column,
                kept,
                has_other,
            } => {
                let cell = row.get(*column).map(|c| c.trim()).unwrap_or("");
                let mut matched = false;
                for value in kept {
                    let hot = cell == value.as_str();
                    matched |= hot;
                    out.push(if hot { 1.0 } else { 0.0 });
                }
                if *has_other {
                    let other = !cell.is_empty() && !matched;
                    out.push(if other { 1.0 } else { 0.0 });
                }
            }
        }
    }
}

/// Category retention rules for categorical columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CategoryRules {
    pub max_categories: usize,
    pub min_count: usize,
    pub min_fraction: f64,
}

/// Decide how one column is encoded, or why it is dropped.
pub(crate) fn plan_column(
    table: &RawTable,
    column: usize,
    profile: Option<&AttributeProfile>,
    rules: CategoryRules,
) -> Result<ColumnEncoding, DropReason> {
    let name = &table.headers[column];
    let cells: Vec<&str> = table
        .column(column)
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if cells.is_empty() {
        return Err(DropReason::Empty);
    }
    if naming::is_identifier_name(name) {
        return Err(DropReason::Identifier);
    }
    if naming::is_coordinate_name(name) {
        return Err(DropReason::Coordinate);
    }
    match profile.map(|p| p.attribute_type) {
        Some(AttributeType::Identifier) => return Err(DropReason::Identifier),
        Some(AttributeType::Coordinate) => return Err(DropReason::Coordinate),
        _ => {}
    }

    let numeric: Vec<f64> = cells.iter().filter_map(|c| parse_number(c)).collect();
    if numeric.len() as f64 >= NUMERIC_CELL_RATIO * cells.len() as f64 {
        let min = numeric.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max <= min {
            return Err(DropReason::ZeroVariance);
        }
        return Ok(ColumnEncoding::Numeric {
            column,
            fill: utils::mean(&numeric),
        });
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &cell in &cells {
        *counts.entry(cell).or_default() += 1;
    }
    if counts.len() < 2 {
        return Err(DropReason::ZeroVariance);
    }
    if counts.len() == cells.len() && cells.len() >= 10 {
        return Err(DropReason::FreeText);
    }

    let kept = select_categories(&counts, cells.len(), rules);
    if kept.is_empty() {
        return Err(DropReason::FreeText);
    }
    let has_other = cells.iter().any(|c| !kept.iter().any(|k| k.as_str() == *c));
    debug!(
        column = name.as_str(),
        kept = kept.len(),
        has_other,
        "planned categorical column"
    );
    Ok(ColumnEncoding::Categorical {
        column,
        kept,
        has_other,
    })
}

/// Most frequent categories meeting the support rule, ties broken by value.
///
/// A literal "Other" value is never kept; it shares the reserved overflow slot.
fn select_categories(counts: &HashMap<&str, usize>, n: usize, rules: CategoryRules) -> Vec<String> {
    let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(v, c)| (*v, *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .filter(|(value, _)| *value != naming::OTHER_CATEGORY)
        .filter(|(_, count)| {
            *count >= rules.min_count || (*count as f64) / (n as f64) >= rules.min_fraction
        })
        .take(rules.max_categories)
        .map(|(value, _)| value.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: CategoryRules = CategoryRules {
        max_categories: 16,
        min_count: 2,
        min_fraction: 0.02,
    };

    fn table_with_column(values: &[&str]) -> RawTable {
        let rows: Vec<Vec<String>> = values.iter().map(|v| vec![v.to_string()]).collect();
        RawTable::new(vec!["color".to_string()], rows)
    }

    #[test]
    fn rare_categories_go_to_other() {
        // 100 rows: two frequent colors, one singleton below 2% support.
        let mut values = vec!["red"; 60];
        values.extend(vec!["blue"; 39]);
        values.push("teal");
        let table = table_with_column(&values);
        let plan = plan_column(&table, 0, None, RULES).unwrap();
        assert_eq!(
            plan,
            ColumnEncoding::Categorical {
                column: 0,
                kept: vec!["red".to_string(), "blue".to_string()],
                has_other: true,
            }
        );

        let mut out = Vec::new();
        plan.encode_into(&["teal".to_string()], &mut out);
        assert_eq!(out, vec![0.0, 0.0, 1.0]);
        out.clear();
        plan.encode_into(&[String::new()], &mut out);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn category_count_is_capped() {
        let mut values = Vec::new();
        let names: Vec<String> = (0..20).map(|i| format!("c{:02}", i)).collect();
        for name in &names {
            values.push(name.as_str());
            values.push(name.as_str());
        }
        let table = table_with_column(&values);
        match plan_column(&table, 0, None, RULES).unwrap() {
            ColumnEncoding::Categorical { kept, has_other, .. } => {
                assert_eq!(kept.len(), 16);
                assert_eq!(kept[0], "c00");
                assert!(has_other);
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn identifier_and_constant_columns_are_dropped() {
        let table = RawTable::from_strs(&["sku", "size"], &[&["a", "3"], &["b", "3"]]);
        assert_eq!(plan_column(&table, 0, None, RULES), Err(DropReason::Identifier));
        assert_eq!(plan_column(&table, 1, None, RULES), Err(DropReason::ZeroVariance));
    }

    #[test]
    fn unique_text_is_free_text() {
        let values: Vec<String> = (0..12).map(|i| format!("title {}", i)).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let table = table_with_column(&refs);
        assert_eq!(plan_column(&table, 0, None, RULES), Err(DropReason::FreeText));
    }

    #[test]
    fn numeric_missing_cells_use_mean() {
        let table = RawTable::from_strs(&["price"], &[&["10"], &["20"], &[""]]);
        let plan = plan_column(&table, 0, None, RULES).unwrap();
        let mut out = Vec::new();
        plan.encode_into(&table.rows[2], &mut out);
        assert_eq!(out, vec![15.0]);
    }
}
