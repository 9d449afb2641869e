//! Property tests for normalization, profiling and tree partitioning.

use choicetree::navigator;
use choicetree::oblique::TreeNode;
use choicetree::profile::profile_attribute;
use choicetree::vectorize::Normalization;
use choicetree::{build, BuildOptions, RawTable};
use ndarray::Array2;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn matrix_strategy() -> impl Strategy<Value = Array2<f64>> {
    (1usize..20, 1usize..5).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(-1e6f64..1e6, rows * cols)
            .prop_map(move |data| Array2::from_shape_vec((rows, cols), data).unwrap())
    })
}

fn catalog_strategy() -> impl Strategy<Value = RawTable> {
    prop::collection::vec((0.0f64..500.0, 1.0f64..5.0, 0usize..3), 2..40).prop_map(|rows| {
        let data = rows
            .iter()
            .enumerate()
            .map(|(i, (price, rating, color))| {
                vec![
                    format!("r{i}"),
                    format!("{price:.2}"),
                    format!("{rating:.1}"),
                    ["red", "green", "blue"][*color].to_string(),
                ]
            })
            .collect();
        RawTable::new(
            ["id", "price", "rating", "color"].iter().map(|h| h.to_string()).collect(),
            data,
        )
    })
}

fn check_partition(node: &TreeNode, depth: usize, max_depth: usize) -> Result<(), TestCaseError> {
    if let TreeNode::Internal(inner) = node {
        prop_assert!(depth < max_depth);
        prop_assert_eq!(inner.sample_count, inner.left.sample_count() + inner.right.sample_count());
        for product in inner.left.products() {
            prop_assert!(navigator::projection(&product.values, &inner.weights)? <= inner.threshold);
        }
        for product in inner.right.products() {
            prop_assert!(navigator::projection(&product.values, &inner.weights)? > inner.threshold);
        }
        check_partition(&inner.left, depth + 1, max_depth)?;
        check_partition(&inner.right, depth + 1, max_depth)?;
    }
    Ok(())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn normalization_stays_in_unit_range(matrix in matrix_strategy()) {
        let norm = Normalization::fit(matrix.view());
        for ((_, feature), &raw) in matrix.indexed_iter() {
            let v = norm.normalize(feature, raw);
            prop_assert!((0.0..=1.0).contains(&v));
            let tolerance = 1e-9 * (1.0 + norm.mins[feature].abs() + norm.maxs[feature].abs());
            prop_assert!((norm.denormalize(feature, v) - raw).abs() <= tolerance);
        }
    }

    #[test]
    fn profile_quantiles_are_ordered(values in prop::collection::vec(-1e4f64..1e4, 1..60)) {
        let range = profile_attribute("value", &values).value_range;
        prop_assert!(range.min <= range.q25);
        prop_assert!(range.q25 <= range.median);
        prop_assert!(range.median <= range.q75);
        prop_assert!(range.q75 <= range.max);
    }

    #[test]
    fn splits_partition_their_items(table in catalog_strategy(), max_depth in 1usize..5) {
        let options = BuildOptions::builder()
            .max_depth(max_depth)
            .min_leaf_size(1)
            .build()
            .unwrap();
        // Degenerate draws can leave no usable column.
        let Ok(output) = build(&table, &options) else {
            return Ok(());
        };
        check_partition(&output.oblique_tree.root, 0, max_depth)?;

        let mut ids: Vec<String> = output
            .oblique_tree
            .root
            .products()
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), table.n_rows());
    }
}
