//! Attribute profile types.

use serde::{Deserialize, Serialize};

/// Semantic type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Price,
    Rating,
    Count,
    Percentage,
    Duration,
    Coordinate,
    Identifier,
    Dimension,
    Weight,
    #[default]
    Unknown,
}

impl AttributeType {
    /// Short lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Rating => "rating",
            Self::Count => "count",
            Self::Percentage => "percentage",
            Self::Duration => "duration",
            Self::Coordinate => "coordinate",
            Self::Identifier => "identifier",
            Self::Dimension => "dimension",
            Self::Weight => "weight",
            Self::Unknown => "unknown",
        }
    }
}

/// Magnitude bucket of an attribute's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// `max(|min|, |max|) < 10`
    #[default]
    Small,
    /// `< 1000`
    Medium,
    /// Everything else.
    Large,
}

impl Scale {
    /// Bucket a pair of bounds.
    pub fn from_bounds(min: f64, max: f64) -> Self {
        let magnitude = min.abs().max(max.abs());
        if magnitude < 10.0 {
            Self::Small
        } else if magnitude < 1000.0 {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// Which end of an attribute users usually prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
    #[default]
    Neutral,
}

/// Summary statistics of an attribute's valid values.
///
/// Invariant for non-degenerate profiles: `min <= q25 <= median <= q75 <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub q25: f64,
    pub q75: f64,
}

/// Semantic profile of one raw column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeProfile {
    /// Column (or one-hot feature) name.
    pub name: String,
    /// Inferred semantic type.
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Whether the attribute is worth asking users about.
    pub is_preference_relevant: bool,
    /// Statistics over valid numeric values.
    pub value_range: ValueRange,
    /// Magnitude bucket.
    pub scale: Scale,
    /// Preferred direction.
    pub direction: Direction,
    /// Human-readable description used in question text.
    pub description: String,
    /// Display unit, when one can be inferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Whether values behave like categories.
    pub categorical: bool,
    /// Number of distinct values.
    pub unique_values: usize,
    /// `unique_values / n_values`.
    pub unique_value_ratio: f64,
}

impl AttributeProfile {
    /// Whether this profile was computed from zero valid values.
    pub fn is_degenerate(&self) -> bool {
        self.unique_values == 0
    }
}
