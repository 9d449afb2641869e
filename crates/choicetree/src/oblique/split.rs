//! Split candidates, impurity and gain for the oblique tree.
//!
//! Impurity of a set is the mean per-feature variance of its normalized vectors. Gain is
//! the parent's impurity minus the size-weighted impurity of the children.

use std::collections::HashSet;

use rand::Rng;

use crate::utils::{self, dot};
use crate::vectorize::FeatureVector;

/// A proposed hyperplane.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitCandidate {
    pub weights: Vec<f64>,
    pub threshold: f64,
    /// Whether this is an axis split on a one-hot feature.
    pub one_hot: bool,
}

/// A candidate together with the partition it induces.
#[derive(Debug, Clone)]
pub(crate) struct EvaluatedSplit {
    pub candidate: SplitCandidate,
    /// Raw impurity reduction.
    pub gain: f64,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

/// Mean over features of the within-set variance.
pub(crate) fn impurity(vectors: &[FeatureVector], items: &[usize], n_features: usize) -> f64 {
    if items.is_empty() || n_features == 0 {
        return 0.0;
    }
    let n = items.len() as f64;
    let mut sum = vec![0.0; n_features];
    let mut sum_sq = vec![0.0; n_features];
    for &i in items {
        for (f, &v) in vectors[i].values.iter().enumerate().take(n_features) {
            sum[f] += v;
            sum_sq[f] += v * v;
        }
    }
    let total: f64 = sum
        .iter()
        .zip(&sum_sq)
        .map(|(s, sq)| {
            let mean = s / n;
            (sq / n - mean * mean).max(0.0)
        })
        .sum();
    total / n_features as f64
}

/// Route items by `dot(weights, values) <= threshold`.
pub(crate) fn partition(
    vectors: &[FeatureVector],
    items: &[usize],
    weights: &[f64],
    threshold: f64,
) -> (Vec<usize>, Vec<usize>) {
    items
        .iter()
        .partition(|&&i| dot(weights, &vectors[i].values) <= threshold)
}

/// Evaluate a candidate. Returns `None` when one side would be empty.
pub(crate) fn evaluate(
    vectors: &[FeatureVector],
    items: &[usize],
    n_features: usize,
    parent_impurity: f64,
    candidate: SplitCandidate,
) -> Option<EvaluatedSplit> {
    let (left, right) = partition(vectors, items, &candidate.weights, candidate.threshold);
    if left.is_empty() || right.is_empty() {
        return None;
    }
    let n = items.len() as f64;
    let weighted = (left.len() as f64 / n) * impurity(vectors, &left, n_features)
        + (right.len() as f64 / n) * impurity(vectors, &right, n_features);
    Some(EvaluatedSplit {
        candidate,
        gain: parent_impurity - weighted,
        left,
        right,
    })
}

/// Axis-aligned candidates: per feature, midpoints between sorted unique values,
/// downsampled evenly to `max_thresholds`.
pub(crate) fn axis_candidates(
    vectors: &[FeatureVector],
    items: &[usize],
    one_hot: &[bool],
    max_thresholds: usize,
) -> Vec<SplitCandidate> {
    let n_features = one_hot.len();
    let mut out = Vec::new();
    for feature in 0..n_features {
        let column: Vec<f64> = items.iter().map(|&i| vectors[i].values[feature]).collect();
        let thresholds = utils::midpoints(&utils::sorted(&column));
        for threshold in utils::downsample(&thresholds, max_thresholds) {
            let mut weights = vec![0.0; n_features];
            weights[feature] = 1.0;
            out.push(SplitCandidate {
                weights,
                threshold,
                one_hot: one_hot[feature],
            });
        }
    }
    out
}

/// Parameters of the farthest-pair search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairSearch {
    pub rounds: usize,
    pub exact_limit: usize,
    pub sampled_pairs: usize,
}

/// Oblique candidates from farthest item pairs.
///
/// Each round picks the farthest pair (exactly for small sets, else from random samples);
/// the difference vector becomes the weights and the midpoint's projection the threshold.
pub(crate) fn oblique_candidates<R: Rng>(
    vectors: &[FeatureVector],
    items: &[usize],
    search: PairSearch,
    rng: &mut R,
) -> Vec<SplitCandidate> {
    if items.len() < 2 {
        return Vec::new();
    }
    let mut pairs = Vec::new();
    if items.len() <= search.exact_limit {
        // Exhaustive search is deterministic: every round would find the same pair.
        if let Some(pair) = farthest_pair_exact(vectors, items) {
            pairs.push(pair);
        }
    } else {
        let mut seen = HashSet::new();
        for _ in 0..search.rounds {
            if let Some(pair) = farthest_pair_sampled(vectors, items, search.sampled_pairs, rng) {
                if seen.insert(pair) {
                    pairs.push(pair);
                }
            }
        }
    }

    pairs
        .into_iter()
        .filter_map(|(a, b)| hyperplane(&vectors[a].values, &vectors[b].values))
        .collect()
}

fn hyperplane(a: &[f64], b: &[f64]) -> Option<SplitCandidate> {
    let weights: Vec<f64> = b.iter().zip(a).map(|(y, x)| y - x).collect();
    if weights.iter().all(|w| *w == 0.0) {
        return None;
    }
    let midpoint: Vec<f64> = a.iter().zip(b).map(|(x, y)| (x + y) / 2.0).collect();
    let threshold = dot(&weights, &midpoint);
    Some(SplitCandidate {
        weights,
        threshold,
        one_hot: false,
    })
}

fn farthest_pair_exact(vectors: &[FeatureVector], items: &[usize]) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f64)> = None;
    for (pos, &a) in items.iter().enumerate() {
        for &b in &items[pos + 1..] {
            let d = utils::squared_distance(&vectors[a].values, &vectors[b].values);
            if best.map_or(true, |(_, bd)| d > bd) {
                best = Some(((a, b), d));
            }
        }
    }
    best.filter(|(_, d)| *d > 0.0).map(|(pair, _)| pair)
}

fn farthest_pair_sampled<R: Rng>(
    vectors: &[FeatureVector],
    items: &[usize],
    samples: usize,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f64)> = None;
    for _ in 0..samples {
        let i = rng.gen_range(0..items.len());
        let j = rng.gen_range(0..items.len());
        if i == j {
            continue;
        }
        let (a, b) = (items[i.min(j)], items[i.max(j)]);
        let d = utils::squared_distance(&vectors[a].values, &vectors[b].values);
        if best.map_or(true, |(_, bd)| d > bd) {
            best = Some(((a, b), d));
        }
    }
    best.filter(|(_, d)| *d > 0.0).map(|(pair, _)| pair)
}
