//! Min–max feature normalization.

use approx::abs_diff_eq;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Value assigned to every entry of a zero-range feature.
pub const ZERO_RANGE_VALUE: f64 = 0.5;

/// Per-feature bounds used to map raw values into `[0, 1]` and back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Normalization {
    /// Per-feature minimum.
    pub mins: Vec<f64>,
    /// Per-feature maximum.
    pub maxs: Vec<f64>,
}

impl Normalization {
    /// Fit bounds to the columns of a `[n_samples, n_features]` matrix.
    pub fn fit(matrix: ArrayView2<'_, f64>) -> Self {
        let mins = matrix.fold_axis(Axis(0), f64::INFINITY, |acc, &x| acc.min(x));
        let maxs = matrix.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &x| acc.max(x));
        Self {
            mins: mins.to_vec(),
            maxs: maxs.to_vec(),
        }
    }

    /// Number of features covered.
    pub fn n_features(&self) -> usize {
        self.mins.len()
    }

    /// `max - min` for a feature.
    #[inline]
    pub fn range(&self, feature: usize) -> f64 {
        self.maxs[feature] - self.mins[feature]
    }

    /// Whether a feature has (numerically) zero range.
    #[inline]
    pub fn is_constant(&self, feature: usize) -> bool {
        abs_diff_eq!(self.range(feature), 0.0, epsilon = f64::EPSILON)
    }

    /// Map a raw value into `[0, 1]`.
    #[inline]
    pub fn normalize(&self, feature: usize, raw: f64) -> f64 {
        if self.is_constant(feature) {
            return ZERO_RANGE_VALUE;
        }
        ((raw - self.mins[feature]) / self.range(feature)).clamp(0.0, 1.0)
    }

    /// Map a normalized value back to the raw scale: `min + v * (max - min)`.
    #[inline]
    pub fn denormalize(&self, feature: usize, normalized: f64) -> f64 {
        self.mins[feature] + normalized * self.range(feature)
    }

    /// Normalize a matrix in place, column by column.
    pub fn transform(&self, matrix: &mut Array2<f64>) {
        for (feature, mut column) in matrix.axis_iter_mut(Axis(1)).enumerate() {
            column.mapv_inplace(|x| self.normalize(feature, x));
        }
    }
}
