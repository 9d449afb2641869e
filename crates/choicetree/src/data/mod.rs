//! Catalog input.
//!
//! The ingestion collaborator hands over a [`RawTable`]: headers plus string rows.
//! Tokenization and CSV validation happen upstream; this module only normalizes
//! shape (ragged rows) and answers column-oriented questions.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::profile::naming;

/// A product catalog as delivered by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names.
    pub headers: Vec<String>,
    /// Rows of raw cells.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table, padding short rows with empty cells and truncating long ones.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Convenience constructor from string slices.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Reject headerless or row-less input.
    pub fn validate(&self) -> Result<()> {
        if self.headers.is_empty() {
            return Err(EngineError::EmptyInput { reason: "no headers" });
        }
        if self.rows.is_empty() {
            return Err(EngineError::EmptyInput { reason: "no rows" });
        }
        Ok(())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Cells of one column, in row order.
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// Index of the column used for product ids: the first identifier-named column.
    pub fn id_column(&self) -> Option<usize> {
        self.headers.iter().position(|h| naming::is_identifier_name(h))
    }

    /// Product id for a row: the id column's cell, or `row-{index}`.
    pub fn product_id(&self, row: usize) -> String {
        self.id_column()
            .and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("row-{}", row))
    }

    /// Build the display product for a row.
    pub fn product(&self, row: usize) -> Product {
        Product {
            id: self.product_id(row),
            row,
            cells: self.rows.get(row).cloned().unwrap_or_default(),
        }
    }
}

/// A catalog row as stored in question-tree leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    pub id: String,
    /// Row index in the source table.
    pub row: usize,
    /// Display cells, aligned with the table headers.
    pub cells: Vec<String>,
}
