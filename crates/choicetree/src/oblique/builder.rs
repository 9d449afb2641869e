//! Recursive oblique tree construction.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info};

use super::node::{InternalNode, ObliqueTree, TreeNode};
use super::split::{self, EvaluatedSplit, PairSearch};
use crate::config::BuildOptions;
use crate::vectorize::{EncodedCatalog, FeatureVector};

/// Greedy top-down builder for [`ObliqueTree`]s.
///
/// At every node the builder evaluates axis-aligned thresholds on each feature plus a
/// handful of farthest-pair hyperplanes, and keeps the one with the best impurity
/// reduction. One-hot axis splits are boosted because they read as simple questions.
///
/// # Stopping
///
/// A node becomes a leaf when any of these hold:
/// - `depth >= max_depth`
/// - `items <= min_leaf_size`
/// - best gain `<= min_info_gain`
/// - a branch would hold less than `min_branch_fraction` of the items
#[derive(Debug, Clone)]
pub struct ObliqueTreeBuilder {
    options: BuildOptions,
}

struct BuildContext<'a> {
    vectors: &'a [FeatureVector],
    one_hot: Vec<bool>,
    n_features: usize,
}

impl ObliqueTreeBuilder {
    /// Create a builder.
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a tree with randomness seeded from [`BuildOptions::seed`].
    pub fn build(&self, catalog: &EncodedCatalog) -> ObliqueTree {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.options.seed);
        self.build_with_rng(catalog, &mut rng)
    }

    /// Build a tree with a caller-supplied random source.
    pub fn build_with_rng<R: Rng>(&self, catalog: &EncodedCatalog, rng: &mut R) -> ObliqueTree {
        let ctx = BuildContext {
            vectors: &catalog.vectors,
            one_hot: (0..catalog.n_features()).map(|f| catalog.is_one_hot(f)).collect(),
            n_features: catalog.n_features(),
        };
        let items: Vec<usize> = (0..catalog.n_vectors()).collect();
        let root = self.build_node(&ctx, items, 0, rng);

        let tree = ObliqueTree::new(
            root,
            catalog.feature_names.clone(),
            Some(catalog.normalization.clone()),
        );
        let stats = tree.stats();
        info!(
            depth = stats.depth,
            leaves = stats.leaf_count,
            n_items = catalog.n_vectors(),
            "built oblique tree"
        );
        tree
    }

    fn build_node<R: Rng>(
        &self,
        ctx: &BuildContext<'_>,
        items: Vec<usize>,
        depth: usize,
        rng: &mut R,
    ) -> TreeNode {
        if depth >= self.options.max_depth || items.len() <= self.options.min_leaf_size {
            return make_leaf(ctx, &items);
        }

        let Some(best) = self.find_best_split(ctx, &items, rng) else {
            return make_leaf(ctx, &items);
        };
        if best.gain <= self.options.min_info_gain {
            debug!(depth, n_items = items.len(), gain = best.gain, "gain too small");
            return make_leaf(ctx, &items);
        }

        let min_branch = self.options.min_branch_fraction * items.len() as f64;
        if (best.left.len() as f64) < min_branch || (best.right.len() as f64) < min_branch {
            debug!(
                depth,
                left = best.left.len(),
                right = best.right.len(),
                "degenerate partition"
            );
            return make_leaf(ctx, &items);
        }

        debug!(
            depth,
            n_items = items.len(),
            gain = best.gain,
            one_hot = best.candidate.one_hot,
            left = best.left.len(),
            right = best.right.len(),
            "split node"
        );

        let sample_count = items.len();
        let EvaluatedSplit {
            candidate,
            gain,
            left,
            right,
        } = best;
        let left = self.build_node(ctx, left, depth + 1, rng);
        let right = self.build_node(ctx, right, depth + 1, rng);
        TreeNode::Internal(InternalNode {
            weights: candidate.weights,
            threshold: candidate.threshold,
            sample_count,
            gain,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Evaluate every candidate and pick the winner.
    ///
    /// Ranking uses boosted gain for one-hot axis splits; afterwards the best categorical
    /// candidate still replaces a non-categorical winner when its raw gain reaches
    /// `categorical_preference_ratio` of the winner's.
    fn find_best_split<R: Rng>(
        &self,
        ctx: &BuildContext<'_>,
        items: &[usize],
        rng: &mut R,
    ) -> Option<EvaluatedSplit> {
        let parent = split::impurity(ctx.vectors, items, ctx.n_features);
        if parent <= 0.0 {
            return None;
        }

        let search = PairSearch {
            rounds: self.options.oblique_rounds,
            exact_limit: self.options.exact_pair_limit,
            sampled_pairs: self.options.sampled_pairs,
        };
        let mut candidates =
            split::axis_candidates(ctx.vectors, items, &ctx.one_hot, self.options.max_axis_thresholds);
        candidates.extend(split::oblique_candidates(ctx.vectors, items, search, rng));

        let evaluated = candidates
            .into_iter()
            .filter_map(|candidate| split::evaluate(ctx.vectors, items, ctx.n_features, parent, candidate));
        self.select(evaluated)
    }

    /// Rank evaluated splits and apply the categorical preference.
    ///
    /// Ties keep the earliest split.
    fn select(&self, evaluated: impl IntoIterator<Item = EvaluatedSplit>) -> Option<EvaluatedSplit> {
        let mut winner: Option<(f64, EvaluatedSplit)> = None;
        let mut best_categorical: Option<EvaluatedSplit> = None;
        for evaluated in evaluated {
            let ranked = if evaluated.candidate.one_hot {
                evaluated.gain * self.options.one_hot_gain_boost
            } else {
                evaluated.gain
            };
            if evaluated.candidate.one_hot
                && best_categorical.as_ref().map_or(true, |b| evaluated.gain > b.gain)
            {
                best_categorical = Some(evaluated.clone());
            }
            if winner.as_ref().map_or(true, |(score, _)| ranked > *score) {
                winner = Some((ranked, evaluated));
            }
        }

        let (_, winner) = winner?;
        match best_categorical {
            Some(categorical)
                if !winner.candidate.one_hot
                    && categorical.gain >= self.options.categorical_preference_ratio * winner.gain =>
            {
                Some(categorical)
            }
            _ => Some(winner),
        }
    }
}

fn make_leaf(ctx: &BuildContext<'_>, items: &[usize]) -> TreeNode {
    TreeNode::leaf(items.iter().map(|&i| ctx.vectors[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::split::SplitCandidate;
    use crate::data::RawTable;
    use rstest::rstest;
    use crate::profile::profile_table;
    use crate::vectorize::FeatureVectorizer;

    fn catalog(table: &RawTable) -> EncodedCatalog {
        FeatureVectorizer::default()
            .encode(table, &profile_table(table))
            .unwrap()
    }

    fn options(max_depth: usize, min_leaf_size: usize) -> BuildOptions {
        BuildOptions::builder()
            .max_depth(max_depth)
            .min_leaf_size(min_leaf_size)
            .build()
            .unwrap()
    }

    fn assert_partitions(node: &TreeNode) {
        if let TreeNode::Internal(inner) = node {
            assert_eq!(
                inner.sample_count,
                inner.left.sample_count() + inner.right.sample_count()
            );
            assert_partitions(&inner.left);
            assert_partitions(&inner.right);
        }
    }

    #[test]
    fn separates_two_clusters() {
        let table = RawTable::from_strs(
            &["price", "rating"],
            &[
                &["10", "4.0"],
                &["11", "4.1"],
                &["12", "4.0"],
                &["90", "2.0"],
                &["95", "2.1"],
                &["99", "2.2"],
            ],
        );
        let tree = ObliqueTreeBuilder::new(options(3, 2)).build(&catalog(&table));
        let TreeNode::Internal(root) = &tree.root else {
            panic!("expected a split");
        };
        assert_eq!(root.sample_count, 6);
        let mut left: Vec<&str> = root.left.products().iter().map(|p| p.id.as_str()).collect();
        left.sort();
        assert_eq!(left, vec!["row-0", "row-1", "row-2"]);
        assert_partitions(&tree.root);
        assert!(tree.normalization.is_some());
    }

    #[test]
    fn small_input_is_a_single_leaf() {
        let table = RawTable::from_strs(&["price"], &[&["1"], &["2"], &["3"]]);
        let tree = ObliqueTreeBuilder::new(options(6, 3)).build(&catalog(&table));
        assert!(tree.root.is_leaf());
        assert_eq!(tree.root.sample_count(), 3);
    }

    #[test]
    fn depth_limit_is_respected() {
        let rows: Vec<Vec<String>> = (0..64)
            .map(|i| vec![format!("{}", i), format!("{}", (i * 7) % 13)])
            .collect();
        let table = RawTable::new(vec!["price".into(), "weight".into()], rows);
        let tree = ObliqueTreeBuilder::new(options(2, 1)).build(&catalog(&table));
        assert!(tree.root.depth() <= 2);
        assert_eq!(tree.root.products().len(), 64);
        assert_partitions(&tree.root);
    }

    #[test]
    fn categorical_split_is_preferred_on_near_ties() {
        // Color fully separates the two price groups: the one-hot split should win.
        let table = RawTable::from_strs(
            &["price", "color"],
            &[
                &["10", "red"],
                &["12", "red"],
                &["14", "red"],
                &["40", "blue"],
                &["42", "blue"],
                &["44", "blue"],
            ],
        );
        let catalog = catalog(&table);
        let tree = ObliqueTreeBuilder::new(options(1, 1)).build(&catalog);
        let TreeNode::Internal(root) = &tree.root else {
            panic!("expected a split");
        };
        let nonzero: Vec<usize> = root
            .weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(nonzero.len(), 1);
        assert!(catalog.is_one_hot(nonzero[0]));
    }

    fn evaluated(gain: f64, one_hot: bool) -> EvaluatedSplit {
        EvaluatedSplit {
            candidate: SplitCandidate {
                weights: vec![if one_hot { 0.0 } else { 1.0 }, if one_hot { 1.0 } else { 0.5 }],
                threshold: 0.5,
                one_hot,
            },
            gain,
            left: vec![0],
            right: vec![1],
        }
    }

    fn selector(boost: f64, ratio: f64) -> ObliqueTreeBuilder {
        ObliqueTreeBuilder::new(
            BuildOptions::builder()
                .one_hot_gain_boost(boost)
                .categorical_preference_ratio(ratio)
                .build()
                .unwrap(),
        )
    }

    #[rstest]
    #[case::substituted_at_default_ratio(0.35, true)]
    #[case::kept_when_ratio_is_strict(1.0, false)]
    fn categorical_preference_without_boost(#[case] ratio: f64, #[case] expect_one_hot: bool) {
        // Oblique split wins on raw gain; the one-hot split reaches 70% of it.
        let splits = vec![evaluated(0.15, false), evaluated(0.105, true), evaluated(0.04, true)];
        let chosen = selector(1.0, ratio).select(splits).unwrap();
        assert_eq!(chosen.candidate.one_hot, expect_one_hot);
        let expected_gain = if expect_one_hot { 0.105 } else { 0.15 };
        assert_eq!(chosen.gain, expected_gain);
    }

    #[test]
    fn categorical_below_ratio_is_not_substituted() {
        let splits = vec![evaluated(0.15, false), evaluated(0.05, true)];
        let chosen = selector(1.0, 0.35).select(splits).unwrap();
        assert!(!chosen.candidate.one_hot);
    }

    #[test]
    fn boost_alone_decides_above_inverse_ratio() {
        // 0.105 * 6 outranks 0.15 before the ratio is consulted.
        let splits = vec![evaluated(0.15, false), evaluated(0.105, true)];
        for ratio in [0.35, 1.0] {
            let chosen = selector(6.0, ratio).select(splits.clone()).unwrap();
            assert!(chosen.candidate.one_hot);
        }
    }

    #[test]
    fn nothing_to_select() {
        assert!(selector(1.0, 0.35).select(Vec::new()).is_none());
    }

    #[test]
    fn same_seed_same_tree() {
        let rows: Vec<Vec<String>> = (0..150)
            .map(|i| {
                vec![
                    format!("{}", (i * 37) % 101),
                    format!("{}", (i * 11) % 17),
                    format!("{}", (i * 5) % 7),
                ]
            })
            .collect();
        let table = RawTable::new(vec!["price".into(), "weight".into(), "width".into()], rows);
        let catalog = catalog(&table);
        let a = ObliqueTreeBuilder::new(options(4, 3)).build(&catalog);
        let b = ObliqueTreeBuilder::new(options(4, 3)).build(&catalog);
        assert_eq!(a, b);
    }
}
